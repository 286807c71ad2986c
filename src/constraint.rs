//! Native constraint validation of the host form.
//!
//! Fields with the native capability compute their validity here from their
//! attributes, the way a browser does for `checkValidity()`. Fields without
//! it expose the shadow record written by the legacy checker instead.

use crate::form::{ControlKind, FieldId, Form};
use crate::js_number::parse_number_value;
use crate::js_regex::Regex;
use crate::validity::{ValidationResult, ValidityState};

impl Form {
    /// `checkValidity()`: `true` when the field satisfies its constraints.
    pub fn check_validity(&self, field: FieldId) -> bool {
        self.validity(field).valid
    }

    pub fn validity(&self, field: FieldId) -> ValidityState {
        if self.supports_native_validation(field) {
            self.compute_native_validity(field)
        } else {
            self.element(field).legacy_validity
        }
    }

    /// The message a consumer shows for the field; empty when valid.
    pub fn validation_message(&self, field: FieldId) -> String {
        if !self.supports_native_validation(field) {
            return self.element(field).legacy_message.clone();
        }
        let validity = self.compute_native_validity(field);
        if validity.valid {
            return String::new();
        }
        if validity.custom_error {
            return self.element(field).custom_validity_message.clone();
        }
        self.native_message(field, &validity)
    }

    /// Current validity flag and message of the field, as last computed.
    pub fn validation_result(&self, field: FieldId) -> ValidationResult {
        ValidationResult {
            valid: self.check_validity(field),
            message: self.validation_message(field),
        }
    }

    /// `setCustomValidity()`: a non-empty message marks the field invalid.
    pub fn set_custom_validity(&mut self, field: FieldId, message: &str) {
        self.element_mut(field).custom_validity_message = message.to_string();
    }

    pub fn custom_validity_message(&self, field: FieldId) -> &str {
        &self.element(field).custom_validity_message
    }

    /// `willValidate`: whether the field is a candidate for constraint
    /// validation at all.
    pub fn will_validate(&self, field: FieldId) -> bool {
        if self.is_disabled(field) {
            return false;
        }
        match self.kind(field) {
            ControlKind::Input => {
                input_participates_in_constraint_validation(&self.input_type(field))
                    && !self.is_readonly(field)
            }
            ControlKind::Textarea => !self.is_readonly(field),
            ControlKind::Select => true,
        }
    }

    pub(crate) fn compute_native_validity(&self, field: FieldId) -> ValidityState {
        let mut validity = ValidityState::valid();

        if !self.will_validate(field) {
            return validity;
        }

        let value = self.value(field);
        let required = self.is_required(field);

        match self.kind(field) {
            ControlKind::Textarea => {
                if required && value.is_empty() {
                    validity.value_missing = true;
                }
                if !value.is_empty() {
                    self.check_max_length(field, value, &mut validity);
                }
            }
            ControlKind::Select => {
                if required && value.is_empty() {
                    validity.value_missing = true;
                }
            }
            ControlKind::Input => {
                let input_type = self.input_type(field);
                if required && input_supports_required(&input_type) {
                    validity.value_missing = match input_type.as_str() {
                        "checkbox" => !self.checked(field),
                        "radio" => !self.is_radio_group_checked(field),
                        "file" => self.files(field).is_empty(),
                        _ => value.is_empty(),
                    };
                }

                if !value.is_empty() && input_type != "file" {
                    match input_type.as_str() {
                        "email" => validity.type_mismatch = !is_simple_email(value),
                        "url" => validity.type_mismatch = !is_url_like(value),
                        _ => {}
                    }

                    if matches!(
                        input_type.as_str(),
                        "text" | "search" | "url" | "tel" | "email" | "password"
                    ) {
                        self.check_max_length(field, value, &mut validity);
                        if let Some(pattern) = self.attr(field, "pattern") {
                            if !pattern.is_empty() {
                                if let Ok(regex) = Regex::new_anchored(pattern) {
                                    if let Ok(false) = regex.is_match(value) {
                                        validity.pattern_mismatch = true;
                                    }
                                }
                            }
                        }
                    }

                    if matches!(input_type.as_str(), "number" | "range") {
                        self.check_numeric_range(field, value, &mut validity);
                    }
                }
            }
        }

        validity.custom_error = !self.element(field).custom_validity_message.is_empty();
        validity.recompute_valid();
        validity
    }

    // Only `maxlength`: `minlength` belongs to the validator's extra rules,
    // which apply it the same way to empty and non-empty values.
    fn check_max_length(&self, field: FieldId, value: &str, validity: &mut ValidityState) {
        let value_len = value.chars().count() as i64;
        if let Some(max_len) = self.parse_attr_i64(field, "maxlength") {
            if max_len >= 0 && value_len > max_len {
                validity.too_long = true;
            }
        }
    }

    fn check_numeric_range(&self, field: FieldId, value: &str, validity: &mut ValidityState) {
        let Some(numeric) = parse_number_value(value) else {
            validity.bad_input = true;
            return;
        };
        if let Some(min) = self.parse_attr_f64(field, "min") {
            if numeric < min {
                validity.range_underflow = true;
            }
        }
        if let Some(max) = self.parse_attr_f64(field, "max") {
            if numeric > max {
                validity.range_overflow = true;
            }
        }

        let step_attr = self.attr(field, "step").unwrap_or_default();
        if !step_attr.eq_ignore_ascii_case("any") {
            let step = step_attr
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite() && *value > 0.0)
                .unwrap_or(1.0);
            let base = self
                .parse_attr_f64(field, "min")
                .or_else(|| self.parse_attr_f64(field, "value"))
                .unwrap_or(0.0);
            let ratio = (numeric - base) / step;
            let nearest = ratio.round();
            if (ratio - nearest).abs() > 1e-7 {
                validity.step_mismatch = true;
            }
        }
    }

    /// Wording of the host's own validation messages.
    fn native_message(&self, field: FieldId, validity: &ValidityState) -> String {
        let input_type = self.input_type(field);
        if validity.value_missing {
            return match input_type.as_str() {
                "checkbox" => "Please check this box if you want to proceed.",
                "radio" => "Please select one of these options.",
                "file" => "Please select a file.",
                "select-one" | "select-multiple" => "Please select an item in the list.",
                _ => "Please fill out this field.",
            }
            .to_string();
        }
        if validity.bad_input {
            return "Please enter a number.".to_string();
        }
        if validity.type_mismatch {
            return if input_type == "url" {
                "Please enter a URL.".to_string()
            } else {
                "Please enter an email address.".to_string()
            };
        }
        if validity.pattern_mismatch {
            return "Please match the requested format.".to_string();
        }
        if validity.too_long {
            let value_len = self.value(field).chars().count();
            let max_len = self.attr(field, "maxlength").unwrap_or_default().trim();
            return format!(
                "Please shorten this text to {max_len} characters or less (you are currently using {value_len} characters)."
            );
        }
        if validity.range_underflow {
            let min = self.attr(field, "min").unwrap_or_default().trim();
            return format!("Value must be greater than or equal to {min}.");
        }
        if validity.range_overflow {
            let max = self.attr(field, "max").unwrap_or_default().trim();
            return format!("Value must be less than or equal to {max}.");
        }
        "Please enter a valid value.".to_string()
    }

    pub(crate) fn parse_attr_f64(&self, field: FieldId, name: &str) -> Option<f64> {
        self.attr(field, name).and_then(parse_number_value)
    }

    pub(crate) fn parse_attr_i64(&self, field: FieldId, name: &str) -> Option<i64> {
        self.attr(field, name).and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() {
                None
            } else {
                raw.parse::<i64>().ok()
            }
        })
    }

    pub(crate) fn is_radio_group_checked(&self, field: FieldId) -> bool {
        let name = self.name(field);
        if name.is_empty() {
            return self.checked(field);
        }
        self.radio_group(name)
            .into_iter()
            .any(|candidate| self.checked(candidate))
    }
}

pub(crate) fn input_participates_in_constraint_validation(kind: &str) -> bool {
    !matches!(kind, "button" | "submit" | "reset" | "hidden" | "image")
}

pub(crate) fn input_supports_required(kind: &str) -> bool {
    !matches!(
        kind,
        "hidden" | "range" | "color" | "button" | "submit" | "reset" | "image"
    )
}

pub(crate) fn is_simple_email(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return false;
    }
    let Some((local, domain)) = trimmed.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    if !local.chars().all(is_ascii_email_local_char) {
        return false;
    }
    is_valid_email_domain(domain)
}

fn is_ascii_email_local_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || matches!(
            ch,
            '.' | '!'
                | '#'
                | '$'
                | '%'
                | '&'
                | '\''
                | '*'
                | '+'
                | '/'
                | '='
                | '?'
                | '^'
                | '_'
                | '`'
                | '{'
                | '|'
                | '}'
                | '~'
                | '-'
        )
}

fn is_valid_email_domain_label(label: &str) -> bool {
    if label.is_empty() || label.len() > 63 {
        return false;
    }

    let mut chars = label.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphanumeric() {
        return false;
    }

    let mut last = first;
    for ch in chars {
        if !(ch.is_ascii_alphanumeric() || ch == '-') {
            return false;
        }
        last = ch;
    }

    last.is_ascii_alphanumeric()
}

fn is_valid_email_domain(domain: &str) -> bool {
    !domain.is_empty() && domain.split('.').all(is_valid_email_domain_label)
}

/// `scheme:rest` with an RFC 3986 scheme and a non-empty remainder.
pub(crate) fn is_url_like(value: &str) -> bool {
    let value = value.trim();
    let Some((scheme, rest)) = value.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_alphabetic()
        && chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'))
        && !rest.is_empty()
}
