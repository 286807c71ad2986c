//! Lenient numeric parsing for attribute and field values.
//!
//! Constraint attributes are free-form text, so these parsers accept the
//! longest numeric prefix (`"12px"` reads as `12`) and report `None` where
//! nothing numeric is present. A `None` operand makes the rule that needed it
//! not applicable.

/// Parses the leading decimal number of `src`, the way `parseFloat` does.
pub(crate) fn parse_leading_float(src: &str) -> Option<f64> {
    let src = src.trim_start();
    if src.is_empty() {
        return None;
    }

    let bytes = src.as_bytes();
    let mut i = 0usize;

    if matches!(bytes.get(i), Some(b'+') | Some(b'-')) {
        i += 1;
    }

    if src[i..].starts_with("Infinity") {
        return Some(if matches!(bytes.first(), Some(b'-')) {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let mut int_digits = 0usize;
    while matches!(bytes.get(i), Some(b) if b.is_ascii_digit()) {
        int_digits += 1;
        i += 1;
    }

    let mut frac_digits = 0usize;
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        while matches!(bytes.get(i), Some(b) if b.is_ascii_digit()) {
            frac_digits += 1;
            i += 1;
        }
    }

    if int_digits + frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(i), Some(b'e') | Some(b'E')) {
        let exp_start = i;
        i += 1;
        if matches!(bytes.get(i), Some(b'+') | Some(b'-')) {
            i += 1;
        }

        let mut exp_digits = 0usize;
        while matches!(bytes.get(i), Some(b) if b.is_ascii_digit()) {
            exp_digits += 1;
            i += 1;
        }

        if exp_digits == 0 {
            i = exp_start;
        }
    }

    // "1." and ".5" are not accepted by str::parse, pad them.
    let mut literal = src[..i].to_string();
    if literal.ends_with('.') {
        literal.push('0');
    }
    if let Some(rest) = literal.strip_prefix('.') {
        literal = format!("0.{rest}");
    } else if let Some(rest) = literal.strip_prefix("-.") {
        literal = format!("-0.{rest}");
    } else if let Some(rest) = literal.strip_prefix("+.") {
        literal = format!("0.{rest}");
    }
    literal.parse::<f64>().ok()
}

/// Parses the leading base-10 integer of `src`, the way `parseInt` does.
pub(crate) fn parse_leading_int(src: &str) -> Option<i64> {
    let src = src.trim_start();
    if src.is_empty() {
        return None;
    }

    let bytes = src.as_bytes();
    let mut i = 0usize;
    let negative = if matches!(bytes.get(i), Some(b'+') | Some(b'-')) {
        let is_negative = bytes[i] == b'-';
        i += 1;
        is_negative
    } else {
        false
    };

    let mut parsed_any = false;
    let mut value = 0i64;
    for ch in src[i..].chars() {
        let Some(digit) = ch.to_digit(10) else {
            break;
        };
        parsed_any = true;
        value = value.saturating_mul(10).saturating_add(i64::from(digit));
    }

    if !parsed_any {
        return None;
    }

    Some(if negative { -value } else { value })
}

/// Strict parse used by the native constraint engine: the whole trimmed
/// text has to be a finite number.
pub(crate) fn parse_number_value(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|value| value.is_finite())
}
