use super::*;
use crate::js_number::{parse_leading_float, parse_leading_int, parse_number_value};
use crate::js_regex::Regex;

#[test]
fn leading_float_reads_the_numeric_prefix() {
    assert_eq!(parse_leading_float("12px"), Some(12.0));
    assert_eq!(parse_leading_float("  -3.25 apples"), Some(-3.25));
    assert_eq!(parse_leading_float(".5"), Some(0.5));
    assert_eq!(parse_leading_float("-.5"), Some(-0.5));
    assert_eq!(parse_leading_float("1."), Some(1.0));
    assert_eq!(parse_leading_float("3e2x"), Some(300.0));
    assert_eq!(parse_leading_float("1e"), Some(1.0));
    assert_eq!(parse_leading_float("Infinity"), Some(f64::INFINITY));
    assert_eq!(parse_leading_float("-Infinity"), Some(f64::NEG_INFINITY));
    assert_eq!(parse_leading_float("abc"), None);
    assert_eq!(parse_leading_float(""), None);
    assert_eq!(parse_leading_float("."), None);
}

#[test]
fn leading_int_truncates_and_saturates() {
    assert_eq!(parse_leading_int("42.9"), Some(42));
    assert_eq!(parse_leading_int("-7abc"), Some(-7));
    assert_eq!(parse_leading_int(" +8"), Some(8));
    assert_eq!(parse_leading_int("99999999999999999999999"), Some(i64::MAX));
    assert_eq!(parse_leading_int("x1"), None);
    assert_eq!(parse_leading_int("-"), None);
}

#[test]
fn number_value_requires_the_whole_text() {
    assert_eq!(parse_number_value(" 1e3 "), Some(1000.0));
    assert_eq!(parse_number_value("12px"), None);
    assert_eq!(parse_number_value("inf"), None);
    assert_eq!(parse_number_value(""), None);
}

#[test]
fn anchored_regex_must_match_the_whole_input() -> Result<()> {
    let regex = Regex::new_anchored("a|b").map_err(|err| Error::InvalidRule {
        rule: "test".into(),
        message: err.to_string(),
    })?;
    assert_eq!(regex.as_str(), "^(?:a|b)$");
    assert_eq!(regex.is_match("a"), Ok(true));
    assert_eq!(regex.is_match("ab"), Ok(false));
    Ok(())
}

#[test]
fn invalid_rule_patterns_are_rejected() {
    let mut rules = RuleRegistry::with_builtin_rules();
    match rules.register("broken", "(") {
        Err(Error::InvalidRule { rule, .. }) => assert_eq!(rule, "broken"),
        other => panic!("expected invalid rule, got: {other:?}"),
    }
    assert!(!rules.contains("broken"));
    assert!(rules.contains(RULE_EMAIL));
    assert!(rules.contains(RULE_PHONE));
    assert!(rules.matches("unknown", "anything"));
}

#[test]
fn config_is_read_from_json() -> Result<()> {
    let config = ValidatorConfig::from_json(
        r#"{ "validate_on_change": true, "rules": { "zip": "^[0-9]{5}$" } }"#,
    )?;
    assert_eq!(
        config,
        ValidatorConfig::new(true).with_rule("zip", "^[0-9]{5}$")
    );

    assert_eq!(ValidatorConfig::from_json("{}")?, ValidatorConfig::default());
    assert!(matches!(
        ValidatorConfig::from_json(r#"{ "validate_on_blur": true }"#),
        Err(Error::Config(_))
    ));
    Ok(())
}
