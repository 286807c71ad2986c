//! The two validation strategies and the rule pipeline they share.

use crate::form::{FieldId, Form};
use crate::js_number::{parse_leading_float, parse_leading_int};
use crate::rules::RuleRegistry;
use crate::validity::{FailureKind, ValidityState, resolve_message};

pub const ATTR_RULE: &str = "data-validation-rule";
pub const ATTR_MAX_FILESIZE: &str = "data-validation-max-filesize";
pub const ATTR_TITLE: &str = "title";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Required,
    Range,
    Pattern,
    MinLength,
    FileSize,
}

/// Order of the legacy pipeline.
pub(crate) const ALL_STAGES: [Stage; 5] = [
    Stage::Required,
    Stage::Range,
    Stage::Pattern,
    Stage::MinLength,
    Stage::FileSize,
];

/// Stages the native engine does not cover.
pub(crate) const EXTRA_STAGES: [Stage; 3] = [Stage::Pattern, Stage::MinLength, Stage::FileSize];

/// Computes and stores the validity of one field.
///
/// Implementations write their result into the form (custom validity on
/// native fields, the shadow record on legacy ones) and return the final
/// validity flag.
pub trait ValidityChecker {
    fn name(&self) -> &'static str;

    fn check(&self, form: &mut Form, field: FieldId, rules: &RuleRegistry) -> bool;
}

/// Uses the host's constraint validation and adds the rules it lacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeChecker;

/// Runs every rule itself against the field's shadow validity record.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyChecker;

/// Picks the strategy from the field's capability flag.
pub fn checker_for(form: &Form, field: FieldId) -> &'static dyn ValidityChecker {
    if form.supports_native_validation(field) {
        &NativeChecker
    } else {
        &LegacyChecker
    }
}

impl ValidityChecker for NativeChecker {
    fn name(&self) -> &'static str {
        "native"
    }

    fn check(&self, form: &mut Form, field: FieldId, rules: &RuleRegistry) -> bool {
        form.set_custom_validity(field, "");
        let native_valid = form.check_validity(field);
        let title = form.attr(field, ATTR_TITLE).unwrap_or_default().to_string();

        if !native_valid {
            if !title.is_empty() {
                form.set_custom_validity(field, &title);
            }
        } else if let Some(kind) = first_failure(form, field, rules, &EXTRA_STAGES) {
            tracing::trace!(field = form.name(field), ?kind, "extra validation failed");
            form.set_custom_validity(field, &resolve_message(Some(title.as_str()), kind));
        }

        form.check_validity(field)
    }
}

impl ValidityChecker for LegacyChecker {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn check(&self, form: &mut Form, field: FieldId, rules: &RuleRegistry) -> bool {
        match first_failure(form, field, rules, &ALL_STAGES) {
            Some(kind) => {
                tracing::trace!(field = form.name(field), ?kind, "legacy rule failed");
                let message = resolve_message(form.attr(field, ATTR_TITLE), kind);
                form.set_legacy_result(field, ValidityState::failed(kind), message);
                false
            }
            None => {
                form.set_legacy_result(field, ValidityState::valid(), String::new());
                true
            }
        }
    }
}

/// Runs `stages` in order and reports the first failing one.
pub(crate) fn first_failure(
    form: &Form,
    field: FieldId,
    rules: &RuleRegistry,
    stages: &[Stage],
) -> Option<FailureKind> {
    stages.iter().find_map(|stage| match stage {
        Stage::Required => check_required(form, field),
        Stage::Range => check_range(form, field),
        Stage::Pattern => check_pattern(form, field, rules),
        Stage::MinLength => check_min_length(form, field),
        Stage::FileSize => check_file_size(form, field),
    })
}

fn check_required(form: &Form, field: FieldId) -> Option<FailureKind> {
    if !form.is_required(field) {
        return None;
    }
    let missing = form.value(field).is_empty() || (form.is_checkable(field) && !form.checked(field));
    missing.then_some(FailureKind::ValueMissing)
}

fn check_range(form: &Form, field: FieldId) -> Option<FailureKind> {
    // A bound or value that is not a number never fails.
    let value = parse_leading_float(form.value(field));
    let bound = |name: &str| form.attr(field, name).and_then(parse_leading_float);

    if let (Some(value), Some(min)) = (value, bound("min")) {
        if value < min {
            return Some(FailureKind::RangeUnderflow);
        }
    }
    if let (Some(value), Some(max)) = (value, bound("max")) {
        if value > max {
            return Some(FailureKind::RangeOverflow);
        }
    }
    None
}

fn check_pattern(form: &Form, field: FieldId, rules: &RuleRegistry) -> Option<FailureKind> {
    let rule = form.attr(field, ATTR_RULE)?;
    let value = form.value(field);
    if value.is_empty() {
        return None;
    }
    (!rules.matches(rule, value)).then_some(FailureKind::PatternMismatch)
}

fn check_min_length(form: &Form, field: FieldId) -> Option<FailureKind> {
    let min_len = form.attr(field, "minlength").and_then(parse_leading_int)?;
    if min_len <= 0 {
        return None;
    }
    let value_len = form.value(field).chars().count() as i64;
    (value_len < min_len).then_some(FailureKind::TooShort)
}

fn check_file_size(form: &Form, field: FieldId) -> Option<FailureKind> {
    if form.input_type(field) != "file" {
        return None;
    }
    let max_size = form
        .attr(field, ATTR_MAX_FILESIZE)
        .and_then(parse_leading_int)?;
    form.files(field)
        .iter()
        .any(|file| i128::from(file.size) > i128::from(max_size))
        .then_some(FailureKind::FileTooLarge)
}
