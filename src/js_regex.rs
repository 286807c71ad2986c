use std::fmt;

#[derive(Debug, Clone)]
pub(crate) struct Regex {
    backend: fancy_regex::Regex,
}

impl Regex {
    pub(crate) fn new(pattern: &str) -> Result<Self, RegexError> {
        let backend = fancy_regex::Regex::new(pattern).map_err(RegexError::from)?;
        Ok(Self { backend })
    }

    /// Compiles `pattern` so that it has to match the whole input, the way
    /// the `pattern` attribute of a form control is applied.
    pub(crate) fn new_anchored(pattern: &str) -> Result<Self, RegexError> {
        Self::new(&format!("^(?:{pattern})$"))
    }

    pub(crate) fn is_match(&self, input: &str) -> Result<bool, RegexError> {
        self.backend.is_match(input).map_err(RegexError::from)
    }

    pub(crate) fn as_str(&self) -> &str {
        self.backend.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RegexError {
    message: String,
}

impl fmt::Display for RegexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RegexError {}

impl From<fancy_regex::Error> for RegexError {
    fn from(value: fancy_regex::Error) -> Self {
        Self {
            message: value.to_string(),
        }
    }
}
