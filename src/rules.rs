use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::js_regex::Regex;

pub const RULE_EMAIL: &str = "email";
pub const RULE_PHONE: &str = "phone";

const EMAIL_PATTERN: &str = concat!(
    r"^[-!#$%&'*+./0-9=?A-Z^_`a-z{|}~]+",
    r"@[-!#$%&'*+/0-9=?A-Z^_`a-z{|}~]+",
    r"\.[-!#$%&'*+./0-9=?A-Z^_`a-z{|}~]+$",
);
const PHONE_PATTERN: &str = r"^[0-9 ]{9,15}$";

/// Format rules addressed by the `data-validation-rule` attribute.
///
/// Identifiers with no registered pattern are not errors: they resolve to
/// no rule and never fail.
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    rules: HashMap<String, Regex>,
}

impl RuleRegistry {
    /// A registry holding only the built-in `email` and `phone` rules.
    pub fn with_builtin_rules() -> Self {
        let mut rules = HashMap::new();
        for (id, pattern) in [(RULE_EMAIL, EMAIL_PATTERN), (RULE_PHONE, PHONE_PATTERN)] {
            match Regex::new(pattern) {
                Ok(regex) => {
                    rules.insert(id.to_string(), regex);
                }
                Err(err) => {
                    tracing::error!(rule = id, error = %err, "built-in rule failed to compile");
                }
            }
        }
        Self { rules }
    }

    /// Adds or replaces the rule `id`. The pattern is used as written, so it
    /// should carry its own anchors.
    pub fn register(&mut self, id: &str, pattern: &str) -> Result<()> {
        let regex = Regex::new(pattern).map_err(|err| Error::InvalidRule {
            rule: id.to_string(),
            message: err.to_string(),
        })?;
        tracing::debug!(rule = id, pattern, "registered validation rule");
        self.rules.insert(id.to_string(), regex);
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rules.contains_key(id)
    }

    pub fn pattern(&self, id: &str) -> Option<&str> {
        self.rules.get(id).map(Regex::as_str)
    }

    pub(crate) fn resolve(&self, id: &str) -> Option<&Regex> {
        self.rules.get(id)
    }

    /// `false` only when `id` names a known rule and `value` does not match
    /// it. A regex engine failure (backtrack limit) counts as a match.
    pub fn matches(&self, id: &str, value: &str) -> bool {
        match self.resolve(id) {
            Some(regex) => regex.is_match(value).unwrap_or(true),
            None => true,
        }
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_builtin_rules()
    }
}
