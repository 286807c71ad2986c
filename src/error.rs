use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the host form model and of validator configuration.
///
/// Validation outcomes themselves are never errors; they are reported
/// through validity flags and messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("html parse error: {0}")]
    HtmlParse(String),
    #[error("selector not found: {0}")]
    SelectorNotFound(String),
    #[error("unsupported selector: {0}")]
    UnsupportedSelector(String),
    #[error("type mismatch for {selector}: expected {expected}, actual {actual}")]
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    #[error(
        "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {field_snippet}"
    )]
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        field_snippet: String,
    },
    #[error("invalid validation rule {rule}: {message}")]
    InvalidRule { rule: String, message: String },
    #[error("invalid validator config: {0}")]
    Config(String),
}
