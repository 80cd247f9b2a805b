//! Scalar quoting helpers shared by the parser and the emitter

/// Byte index just past the closing quote of a quoted scalar starting at
/// the beginning of `text`
pub(crate) fn quoted_end(text: &str) -> Option<usize> {
    let mut chars = text.char_indices().peekable();
    let (_, quote) = chars.next()?;

    while let Some((i, c)) = chars.next() {
        if quote == '"' && c == '\\' {
            chars.next();
            continue;
        }
        if c == quote {
            if quote == '\'' && chars.peek().map(|&(_, n)| n) == Some('\'') {
                chars.next();
                continue;
            }
            return Some(i + c.len_utf8());
        }
    }

    None
}

pub(crate) fn decode_single_quoted(inner: &str) -> String {
    inner.replace("''", "'")
}

pub(crate) fn decode_double_quoted(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') | Some('\t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('a') => out.push('\x07'),
            Some('b') => out.push('\x08'),
            Some('e') => out.push('\x1b'),
            Some('f') => out.push('\x0c'),
            Some('v') => out.push('\x0b'),
            Some('N') => out.push('\u{85}'),
            Some('_') => out.push('\u{a0}'),
            Some('L') => out.push('\u{2028}'),
            Some('P') => out.push('\u{2029}'),
            Some(k @ ('x' | 'u' | 'U')) => {
                let len = match k {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let hex: String = chars.by_ref().take(len).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push('\\');
                        out.push(k);
                        out.push_str(&hex);
                    }
                }
            }
            Some(other @ (' ' | '/' | '"' | '\\')) => out.push(other),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

pub(crate) fn encode_double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

pub(crate) fn encode_single_quoted(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

const FLOW_INDICATORS: &str = ",[]{}";

/// Whether `value` reads back as the same string when written unquoted
pub(crate) fn is_plain_safe(value: &str, flow: bool) -> bool {
    let Some(first) = value.chars().next() else {
        return false;
    };

    if value != value.trim() || value.chars().any(char::is_control) {
        return false;
    }

    let second_is_space = value.chars().nth(1).is_none_or(char::is_whitespace);
    let bad_start = match first {
        '-' | '?' | ':' => second_is_space,
        '[' | ']' | '{' | '}' | ',' | '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%'
        | '@' | '`' => true,
        _ => false,
    };
    if bad_start {
        return false;
    }

    if value.contains(": ") || value.contains(" #") || value.ends_with(':') {
        return false;
    }
    if value.starts_with("---") || value.starts_with("...") {
        return false;
    }
    if flow && value.chars().any(|c| FLOW_INDICATORS.contains(c)) {
        return false;
    }

    true
}

/// Boolean spellings that YAML 1.1 loaders (the Go ones Argo CD uses)
/// still resolve
const YAML11_BOOLS: [&str; 16] = [
    "y", "Y", "yes", "Yes", "YES", "n", "N", "no", "No", "NO", "on", "On", "ON", "off", "Off",
    "OFF",
];

/// True when `value`, written as a plain scalar, would load as something
/// other than that same string (null, bool, int, float, collection)
pub(crate) fn is_implicitly_typed(value: &str) -> bool {
    if YAML11_BOOLS.contains(&value) {
        return true;
    }
    !matches!(
        serde_yaml::from_str::<serde_yaml::Value>(value),
        Ok(serde_yaml::Value::String(ref loaded)) if loaded == value
    )
}
