use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::rules::RuleRegistry;

/// Validator settings.
///
/// ```json
/// { "validate_on_change": true, "rules": { "zip": "^[0-9]{5}$" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Validate each field on `input`, `blur` and `change`.
    pub validate_on_change: bool,
    /// Extra rule identifiers and their patterns; a built-in name replaces
    /// the built-in rule.
    pub rules: BTreeMap<String, String>,
}

impl ValidatorConfig {
    pub fn new(validate_on_change: bool) -> Self {
        Self {
            validate_on_change,
            rules: BTreeMap::new(),
        }
    }

    pub fn from_json(src: &str) -> Result<Self> {
        serde_json::from_str(src).map_err(|err| Error::Config(err.to_string()))
    }

    pub fn with_rule(mut self, id: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.rules.insert(id.into(), pattern.into());
        self
    }

    pub(crate) fn build_rules(&self) -> Result<RuleRegistry> {
        let mut registry = RuleRegistry::with_builtin_rules();
        for (id, pattern) in &self.rules {
            registry.register(id, pattern)?;
        }
        Ok(registry)
    }
}
