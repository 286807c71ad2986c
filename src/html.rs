use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::form::ControlKind;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedOption {
    pub(crate) value: Option<String>,
    pub(crate) text: String,
    pub(crate) selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedControl {
    pub(crate) kind: ControlKind,
    pub(crate) attrs: HashMap<String, String>,
    pub(crate) text: String,
    pub(crate) options: Vec<ParsedOption>,
    pub(crate) fieldset_disabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ParseOutput {
    pub(crate) form_attrs: Option<HashMap<String, String>>,
    pub(crate) controls: Vec<ParsedControl>,
}

#[derive(Debug, Clone, Copy, Default)]
struct FieldsetFrame {
    disabled: bool,
    legends: usize,
    in_first_legend: bool,
}

fn fieldset_disables(stack: &[FieldsetFrame]) -> bool {
    stack
        .iter()
        .any(|frame| frame.disabled && !frame.in_first_legend)
}

/// Collects the form controls of `html` in document order.
///
/// Only the elements that matter for validation are modelled: `form`,
/// `fieldset`, `legend`, `input`, `textarea`, `select`, `option`. Everything
/// else is stepped over while its content is still scanned.
pub(crate) fn parse_form_html(html: &str) -> Result<ParseOutput> {
    let mut out = ParseOutput::default();
    let mut fieldsets: Vec<FieldsetFrame> = Vec::new();
    let mut select: Option<ParsedControl> = None;
    let mut option_open = false;

    let bytes = html.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        if starts_with_at(bytes, i, b"<!--") {
            if let Some(end) = find_subslice(bytes, i + 4, b"-->") {
                i = end + 3;
            } else {
                return Err(Error::HtmlParse("unclosed HTML comment".into()));
            }
            continue;
        }

        if bytes[i] == b'<' {
            if starts_with_at(bytes, i, b"</") {
                let (tag, next) = parse_end_tag(html, i)?;
                i = next;
                match tag.as_str() {
                    "fieldset" => {
                        fieldsets.pop();
                    }
                    "legend" => {
                        if let Some(frame) = fieldsets.last_mut() {
                            frame.in_first_legend = false;
                        }
                    }
                    "option" => option_open = false,
                    "select" => {
                        option_open = false;
                        if let Some(control) = select.take() {
                            out.controls.push(control);
                        }
                    }
                    _ => {}
                }
                continue;
            }

            if starts_with_at(bytes, i, b"<!") {
                i = parse_declaration_tag(html, i)?;
                continue;
            }

            let (tag, attrs, self_closing, next) = parse_start_tag(html, i)?;
            i = next;

            if let Some(control) = select.as_mut() {
                if tag == "option" {
                    control.options.push(ParsedOption {
                        value: attrs.get("value").cloned(),
                        text: String::new(),
                        selected: attrs.contains_key("selected"),
                    });
                    option_open = !self_closing;
                }
                continue;
            }

            match tag.as_str() {
                "form" => {
                    if out.form_attrs.is_none() {
                        out.form_attrs = Some(attrs);
                    }
                }
                "fieldset" if !self_closing => fieldsets.push(FieldsetFrame {
                    disabled: attrs.contains_key("disabled"),
                    ..FieldsetFrame::default()
                }),
                "legend" => {
                    if let Some(frame) = fieldsets.last_mut() {
                        frame.legends += 1;
                        frame.in_first_legend = frame.legends == 1 && !self_closing;
                    }
                }
                "input" => out.controls.push(ParsedControl {
                    kind: ControlKind::Input,
                    attrs,
                    text: String::new(),
                    options: Vec::new(),
                    fieldset_disabled: fieldset_disables(&fieldsets),
                }),
                "textarea" => {
                    let mut text = String::new();
                    if !self_closing {
                        let close = find_case_insensitive_raw_end_tag(bytes, i, b"textarea")
                            .ok_or_else(|| Error::HtmlParse("unclosed <textarea>".into()))?;
                        if let Some(body) = html.get(i..close) {
                            text = strip_initial_newline(&decode_html_character_references(
                                body,
                            ));
                        }
                        let (_, after_end) = parse_end_tag(html, close)?;
                        i = after_end;
                    }
                    out.controls.push(ParsedControl {
                        kind: ControlKind::Textarea,
                        attrs,
                        text,
                        options: Vec::new(),
                        fieldset_disabled: fieldset_disables(&fieldsets),
                    });
                }
                "select" => {
                    let control = ParsedControl {
                        kind: ControlKind::Select,
                        attrs,
                        text: String::new(),
                        options: Vec::new(),
                        fieldset_disabled: fieldset_disables(&fieldsets),
                    };
                    if self_closing {
                        out.controls.push(control);
                    } else {
                        select = Some(control);
                    }
                }
                _ => {}
            }
            continue;
        }

        let text_start = i;
        while i < bytes.len() && bytes[i] != b'<' {
            i += 1;
        }

        if option_open {
            if let (Some(control), Some(text)) = (select.as_mut(), html.get(text_start..i)) {
                if let Some(option) = control.options.last_mut() {
                    option.text.push_str(&decode_html_character_references(text));
                }
            }
        }
    }

    if select.is_some() {
        return Err(Error::HtmlParse("unclosed <select>".into()));
    }

    Ok(out)
}

fn strip_initial_newline(text: &str) -> String {
    if let Some(rest) = text.strip_prefix("\r\n") {
        return rest.to_string();
    }
    if let Some(rest) = text.strip_prefix('\n') {
        return rest.to_string();
    }
    text.to_string()
}

pub(crate) fn decode_html_character_references(src: &str) -> String {
    if !src.contains('&') {
        return src.to_string();
    }

    fn decode_numeric(value: &str) -> Option<char> {
        let codepoint =
            if let Some(hex) = value.strip_prefix("x").or_else(|| value.strip_prefix("X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                value.parse::<u32>().ok()?
            };
        char::from_u32(codepoint)
    }

    fn decode_named(value: &str) -> Option<char> {
        match value {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{00A0}'),
            _ => None,
        }
    }

    let mut out = String::with_capacity(src.len());
    let mut rest = src;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let decoded = tail.find(';').and_then(|semicolon| {
            let raw = &tail[..semicolon];
            let ch = match raw.strip_prefix('#') {
                Some(numeric) => decode_numeric(numeric),
                None => decode_named(raw),
            }?;
            Some((ch, semicolon + 1))
        });
        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

fn parse_start_tag(
    html: &str,
    at: usize,
) -> Result<(String, HashMap<String, String>, bool, usize)> {
    let bytes = html.as_bytes();
    let mut i = at;
    if bytes.get(i) != Some(&b'<') {
        return Err(Error::HtmlParse("expected '<'".into()));
    }
    i += 1;

    skip_ws(bytes, &mut i);
    let tag_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }

    let tag = html
        .get(tag_start..i)
        .ok_or_else(|| Error::HtmlParse("invalid tag name".into()))?
        .to_ascii_lowercase();

    if tag.is_empty() {
        return Err(Error::HtmlParse("empty tag name".into()));
    }

    let mut attrs = HashMap::new();
    let mut self_closing = false;

    loop {
        skip_ws(bytes, &mut i);
        if i >= bytes.len() {
            return Err(Error::HtmlParse("unclosed start tag".into()));
        }

        if bytes[i] == b'>' {
            i += 1;
            break;
        }

        if bytes[i] == b'/' && i + 1 < bytes.len() && bytes[i + 1] == b'>' {
            self_closing = true;
            i += 2;
            break;
        }

        if !is_attr_name_char(bytes[i]) {
            // Skip malformed attribute fragments the way browsers recover.
            while i < bytes.len()
                && !bytes[i].is_ascii_whitespace()
                && bytes[i] != b'>'
                && !(bytes[i] == b'/' && i + 1 < bytes.len() && bytes[i + 1] == b'>')
            {
                i += 1;
            }
            continue;
        }

        let name_start = i;
        while i < bytes.len() && is_attr_name_char(bytes[i]) {
            i += 1;
        }

        let name = html
            .get(name_start..i)
            .ok_or_else(|| Error::HtmlParse("invalid attribute name".into()))?
            .to_ascii_lowercase();

        skip_ws(bytes, &mut i);

        let value = if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            skip_ws(bytes, &mut i);
            parse_attr_value(html, bytes, &mut i)?
        } else {
            String::new()
        };

        // First occurrence wins, as in the HTML tokenizer.
        attrs.entry(name).or_insert(value);
    }

    Ok((tag, attrs, self_closing, i))
}

fn parse_declaration_tag(html: &str, at: usize) -> Result<usize> {
    let bytes = html.as_bytes();
    let mut i = at;

    if !(bytes.get(i) == Some(&b'<') && bytes.get(i + 1) == Some(&b'!')) {
        return Err(Error::HtmlParse("expected declaration tag".into()));
    }
    i += 2;

    let mut quote: Option<u8> = None;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'\'' | b'"' => quote = Some(b),
                b'>' => return Ok(i + 1),
                _ => {}
            },
        }
        i += 1;
    }

    Err(Error::HtmlParse("unclosed declaration tag".into()))
}

fn parse_end_tag(html: &str, at: usize) -> Result<(String, usize)> {
    let bytes = html.as_bytes();
    let mut i = at;

    if !(bytes.get(i) == Some(&b'<') && bytes.get(i + 1) == Some(&b'/')) {
        return Err(Error::HtmlParse("expected end tag".into()));
    }
    i += 2;
    skip_ws(bytes, &mut i);

    let tag_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }

    let tag = html
        .get(tag_start..i)
        .ok_or_else(|| Error::HtmlParse("invalid end tag".into()))?
        .to_ascii_lowercase();

    while i < bytes.len() && bytes[i] != b'>' {
        i += 1;
    }
    if i >= bytes.len() {
        return Err(Error::HtmlParse("unclosed end tag".into()));
    }

    Ok((tag, i + 1))
}

fn parse_attr_value(html: &str, bytes: &[u8], i: &mut usize) -> Result<String> {
    if *i >= bytes.len() {
        return Err(Error::HtmlParse("missing attribute value".into()));
    }

    if bytes[*i] == b'\'' || bytes[*i] == b'"' {
        let quote = bytes[*i];
        *i += 1;
        let start = *i;
        while *i < bytes.len() && bytes[*i] != quote {
            *i += 1;
        }
        if *i >= bytes.len() {
            return Err(Error::HtmlParse("unclosed quoted attribute value".into()));
        }
        let value = html
            .get(start..*i)
            .ok_or_else(|| Error::HtmlParse("invalid attribute value".into()))?;
        *i += 1;
        return Ok(decode_html_character_references(value));
    }

    let start = *i;
    while *i < bytes.len()
        && !bytes[*i].is_ascii_whitespace()
        && bytes[*i] != b'>'
        && !(bytes[*i] == b'/' && *i + 1 < bytes.len() && bytes[*i + 1] == b'>')
    {
        *i += 1;
    }

    let value = html
        .get(start..*i)
        .ok_or_else(|| Error::HtmlParse("invalid attribute value".into()))?;
    Ok(decode_html_character_references(value))
}

fn skip_ws(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && bytes[*i].is_ascii_whitespace() {
        *i += 1;
    }
}

fn is_tag_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

fn is_attr_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

fn starts_with_at(bytes: &[u8], at: usize, needle: &[u8]) -> bool {
    if at + needle.len() > bytes.len() {
        return false;
    }
    &bytes[at..at + needle.len()] == needle
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || from > bytes.len() {
        return None;
    }

    let mut i = from;
    while i + needle.len() <= bytes.len() {
        if &bytes[i..i + needle.len()] == needle {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn find_case_insensitive_raw_end_tag(bytes: &[u8], from: usize, tag: &[u8]) -> Option<usize> {
    let mut i = from;
    while i + tag.len() + 2 <= bytes.len() {
        if bytes[i] == b'<'
            && bytes[i + 1] == b'/'
            && bytes[i + 2..i + 2 + tag.len()].eq_ignore_ascii_case(tag)
        {
            let after = bytes.get(i + 2 + tag.len()).copied();
            if matches!(after, None | Some(b'>')) || after.is_some_and(|b| b.is_ascii_whitespace())
            {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}
