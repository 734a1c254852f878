//! Directive Lines
//!
//! Parses `::name{key=value key="quoted value"}` directive heads. Attribute
//! values keep their written order; interpretation (kinds, booleans, ints)
//! happens at schema-build time.

use crate::error::{CoreResult, DocumentError};

/// A parsed directive head line.
#[derive(Debug, Clone)]
pub(crate) struct Directive {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub line: usize,
}

impl Directive {
    /// Attribute value by key
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute that must be present
    pub fn require_attr(&self, key: &str) -> CoreResult<&str> {
        self.attr(key).ok_or_else(|| {
            DocumentError::invalid_directive(
                self.line,
                format!("`::{}` requires a `{}` attribute", self.name, key),
            )
        })
    }

    /// Boolean attribute, absent means false
    pub fn bool_attr(&self, key: &str) -> CoreResult<bool> {
        match self.attr(key) {
            None => Ok(false),
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            Some(other) => Err(DocumentError::invalid_directive(
                self.line,
                format!("`{}` must be true or false, got `{}`", key, other),
            )),
        }
    }

    /// Integer attribute
    pub fn int_attr(&self, key: &str) -> CoreResult<Option<i64>> {
        match self.attr(key) {
            None => Ok(None),
            Some(raw) => raw.parse::<i64>().map(Some).map_err(|_| {
                DocumentError::invalid_directive(
                    self.line,
                    format!("`{}` must be an integer, got `{}`", key, raw),
                )
            }),
        }
    }

    /// Non-negative count attribute
    pub fn count_attr(&self, key: &str) -> CoreResult<Option<usize>> {
        match self.attr(key) {
            None => Ok(None),
            Some(raw) => raw.parse::<usize>().map(Some).map_err(|_| {
                DocumentError::invalid_directive(
                    self.line,
                    format!("`{}` must be a non-negative integer, got `{}`", key, raw),
                )
            }),
        }
    }
}

/// Whether a line is a directive head
pub(crate) fn is_directive(line: &str) -> bool {
    line.trim_start().starts_with("::")
}

/// Parse a directive head line.
///
/// Grammar: `::name` or `::name{attrs}`, attrs being space-separated
/// `key=value` pairs; values are bare tokens or double-quoted strings with
/// `\"` escapes.
pub(crate) fn parse_directive(line: &str, line_no: usize) -> CoreResult<Directive> {
    let trimmed = line.trim();
    let rest = &trimmed[2..];

    let name_end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .unwrap_or(rest.len());
    let name = &rest[..name_end];
    if name.is_empty() {
        return Err(DocumentError::unknown_directive(trimmed, line_no));
    }

    let tail = rest[name_end..].trim();
    let attrs = if tail.is_empty() {
        Vec::new()
    } else {
        if !(tail.starts_with('{') && tail.ends_with('}')) {
            return Err(DocumentError::invalid_directive(
                line_no,
                format!("attributes of `::{}` must be wrapped in {{ }}", name),
            ));
        }
        parse_attrs(&tail[1..tail.len() - 1], name, line_no)?
    };

    Ok(Directive {
        name: name.to_string(),
        attrs,
        line: line_no,
    })
}

fn parse_attrs(text: &str, name: &str, line_no: usize) -> CoreResult<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        if i >= chars.len() {
            break;
        }

        let key_start = i;
        while i < chars.len() && chars[i] != '=' && !chars[i].is_whitespace() {
            i += 1;
        }
        let key: String = chars[key_start..i].iter().collect();
        if i >= chars.len() || chars[i] != '=' {
            return Err(DocumentError::invalid_directive(
                line_no,
                format!("attribute `{}` of `::{}` is missing a value", key, name),
            ));
        }
        i += 1; // consume '='

        let value = if i < chars.len() && chars[i] == '"' {
            i += 1;
            let mut value = String::new();
            let mut closed = false;
            while i < chars.len() {
                match chars[i] {
                    '\\' if i + 1 < chars.len() => {
                        value.push(chars[i + 1]);
                        i += 2;
                    }
                    '"' => {
                        i += 1;
                        closed = true;
                        break;
                    }
                    c => {
                        value.push(c);
                        i += 1;
                    }
                }
            }
            if !closed {
                return Err(DocumentError::invalid_directive(
                    line_no,
                    format!("unterminated quoted value for `{}`", key),
                ));
            }
            value
        } else {
            let value_start = i;
            while i < chars.len() && !chars[i].is_whitespace() {
                i += 1;
            }
            chars[value_start..i].iter().collect()
        };

        attrs.push((key, value));
    }

    Ok(attrs)
}
