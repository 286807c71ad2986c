use serde::Serialize;

/// Why a field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    ValueMissing,
    RangeUnderflow,
    RangeOverflow,
    PatternMismatch,
    TooShort,
    FileTooLarge,
    Custom,
}

impl FailureKind {
    /// Built-in English wording used when the field has no `title`.
    pub fn default_message(self) -> &'static str {
        match self {
            Self::ValueMissing => "This field is required",
            Self::RangeUnderflow => "Value is too low",
            Self::RangeOverflow => "Value is too high",
            Self::PatternMismatch => "Incorrect format",
            Self::TooShort => "Value is too short",
            Self::FileTooLarge => "File is too large",
            Self::Custom => "Invalid value",
        }
    }
}

/// Picks the message for `kind`: a non-empty custom title wins verbatim.
pub(crate) fn resolve_message(title: Option<&str>, kind: FailureKind) -> String {
    match title {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => kind.default_message().to_string(),
    }
}

/// Validity flags of a field, mirroring the host's `ValidityState`.
///
/// Native fields derive it from the constraint engine; legacy fields carry a
/// shadow copy written by the legacy checker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidityState {
    pub value_missing: bool,
    pub type_mismatch: bool,
    pub pattern_mismatch: bool,
    pub too_long: bool,
    pub too_short: bool,
    pub range_underflow: bool,
    pub range_overflow: bool,
    pub step_mismatch: bool,
    pub bad_input: bool,
    pub file_too_large: bool,
    pub custom_error: bool,
    pub valid: bool,
}

impl ValidityState {
    pub fn valid() -> Self {
        Self {
            valid: true,
            ..Self::default()
        }
    }

    pub(crate) fn failed(kind: FailureKind) -> Self {
        let mut validity = Self::default();
        match kind {
            FailureKind::ValueMissing => validity.value_missing = true,
            FailureKind::RangeUnderflow => validity.range_underflow = true,
            FailureKind::RangeOverflow => validity.range_overflow = true,
            FailureKind::PatternMismatch => validity.pattern_mismatch = true,
            FailureKind::TooShort => validity.too_short = true,
            FailureKind::FileTooLarge => validity.file_too_large = true,
            FailureKind::Custom => validity.custom_error = true,
        }
        validity
    }

    pub(crate) fn recompute_valid(&mut self) {
        self.valid = !(self.value_missing
            || self.type_mismatch
            || self.pattern_mismatch
            || self.too_long
            || self.too_short
            || self.range_underflow
            || self.range_overflow
            || self.step_mismatch
            || self.bad_input
            || self.file_too_large
            || self.custom_error);
    }
}

/// Outcome of validating one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub message: String,
}
