//! Frontmatter
//!
//! Parses the optional `---`-delimited metadata block at the top of a form
//! document. Only flat `key: value` scalars are accepted; recognized keys
//! are typed, unknown keys are preserved verbatim so they survive a
//! canonical re-serialization.

use crate::error::{CoreResult, DocumentError};
use crate::models::document::{DocumentMeta, RunMode};
use crate::parser::RawLine;

/// Parse frontmatter from the head of the document.
///
/// Returns the metadata and the number of leading lines consumed (zero when
/// there is no frontmatter block).
pub(crate) fn parse_frontmatter(lines: &[RawLine]) -> CoreResult<(DocumentMeta, usize)> {
    let mut meta = DocumentMeta::default();

    let open = match lines.iter().position(|l| !l.text.trim().is_empty()) {
        Some(idx) if lines[idx].text.trim() == "---" => idx,
        _ => return Ok((meta, 0)),
    };

    let mut close = None;
    for (idx, line) in lines.iter().enumerate().skip(open + 1) {
        if line.text.trim() == "---" {
            close = Some(idx);
            break;
        }
    }
    let close = close.ok_or_else(|| {
        DocumentError::frontmatter(lines[open].number, "unterminated frontmatter block")
    })?;

    for line in &lines[open + 1..close] {
        let trimmed = line.text.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if line.text.starts_with(' ') || line.text.starts_with('\t') {
            return Err(DocumentError::frontmatter(
                line.number,
                "frontmatter only accepts flat key: value scalars",
            ));
        }
        let (key, value) = match trimmed.split_once(':') {
            Some((k, v)) => (k.trim(), unquote(v.trim())),
            None => {
                return Err(DocumentError::frontmatter(
                    line.number,
                    format!("expected `key: value`, got `{}`", trimmed),
                ))
            }
        };

        match key {
            "run-mode" => {
                meta.run_mode = RunMode::parse(&value).ok_or_else(|| {
                    DocumentError::frontmatter(
                        line.number,
                        format!("unknown run-mode `{}`", value),
                    )
                })?;
            }
            "max-turns" => meta.limits.max_turns = Some(parse_limit(&value, key, line.number)?),
            "max-patches-per-turn" => {
                meta.limits.max_patches_per_turn = Some(parse_limit(&value, key, line.number)?)
            }
            "max-issues-per-turn" => {
                meta.limits.max_issues_per_turn = Some(parse_limit(&value, key, line.number)?)
            }
            _ => meta.extra.push((key.to_string(), value)),
        }
    }

    Ok((meta, close + 1))
}

fn parse_limit(value: &str, key: &str, line: usize) -> CoreResult<u32> {
    value.parse::<u32>().map_err(|_| {
        DocumentError::frontmatter(
            line,
            format!("`{}` must be a non-negative integer, got `{}`", key, value),
        )
    })
}

/// Remove surrounding quotes from a scalar value
fn unquote(s: &str) -> String {
    if (s.starts_with('"') && s.ends_with('"') && s.len() >= 2)
        || (s.starts_with('\'') && s.ends_with('\'') && s.len() >= 2)
    {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}
