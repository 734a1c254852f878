//! Value Literals
//!
//! The value pass of the parser: interprets a response block's body as the
//! kind-specific literal of its field, producing a typed `FieldValue` or a
//! type-mismatch error pointing at the offending line.

use crate::error::{CoreResult, DocumentError};
use crate::models::schema::{CheckboxMode, ColumnKind, Field, FieldKind};
use crate::models::value::{
    validate_date, validate_url, validate_year, CellValue, CheckboxEntry, CheckboxMark,
    FieldValue, TableCell, TableRow,
};
use crate::parser::RawLine;

/// Parse the body of an `answered` response block as `field`'s kind.
pub(crate) fn parse_value_literal(
    field: &Field,
    body: &[RawLine],
    block_line: usize,
) -> CoreResult<FieldValue> {
    let kind = field.kind;
    let content: Vec<&RawLine> = body.iter().filter(|l| !l.text.trim().is_empty()).collect();
    let mismatch = |line: usize, message: String| {
        DocumentError::type_mismatch(&field.id, kind.as_str(), line, message)
    };

    match kind {
        FieldKind::Text => {
            let text = body
                .iter()
                .map(|l| l.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            Ok(FieldValue::Text(text.trim().to_string()))
        }
        FieldKind::Number => {
            let line = single_line(&content, block_line, &mismatch)?;
            let n: f64 = line
                .text
                .trim()
                .parse()
                .map_err(|_| mismatch(line.number, format!("`{}` is not a number", line.text.trim())))?;
            if !n.is_finite() {
                return Err(mismatch(line.number, "number must be finite".to_string()));
            }
            Ok(FieldValue::Number(n))
        }
        FieldKind::Url => {
            let line = single_line(&content, block_line, &mismatch)?;
            let s = line.text.trim().to_string();
            validate_url(&s).map_err(|e| mismatch(line.number, e))?;
            Ok(FieldValue::Url(s))
        }
        FieldKind::Date => {
            let line = single_line(&content, block_line, &mismatch)?;
            let s = line.text.trim().to_string();
            validate_date(&s).map_err(|e| mismatch(line.number, e))?;
            Ok(FieldValue::Date(s))
        }
        FieldKind::Year => {
            let line = single_line(&content, block_line, &mismatch)?;
            let y: i64 = line.text.trim().parse().map_err(|_| {
                mismatch(line.number, format!("`{}` is not a year", line.text.trim()))
            })?;
            validate_year(y).map_err(|e| mismatch(line.number, e))?;
            Ok(FieldValue::Year(y as i32))
        }
        FieldKind::TextList => Ok(FieldValue::TextList(list_items(&content, &mismatch)?)),
        FieldKind::UrlList => {
            let items = list_items(&content, &mismatch)?;
            for (item, line) in items.iter().zip(&content) {
                validate_url(item).map_err(|e| mismatch(line.number, e))?;
            }
            Ok(FieldValue::UrlList(items))
        }
        FieldKind::SingleChoice => match content.as_slice() {
            [] => Ok(FieldValue::SingleChoice(None)),
            [line] => {
                let id = line.text.trim();
                if field.option(id).is_none() {
                    return Err(mismatch(line.number, format!("unknown option `{}`", id)));
                }
                Ok(FieldValue::SingleChoice(Some(id.to_string())))
            }
            [_, second, ..] => Err(mismatch(
                second.number,
                "single-choice takes at most one option id".to_string(),
            )),
        },
        FieldKind::MultiChoice => {
            let ids = list_items(&content, &mismatch)?;
            for (id, line) in ids.iter().zip(&content) {
                if field.option(id).is_none() {
                    return Err(mismatch(line.number, format!("unknown option `{}`", id)));
                }
            }
            Ok(FieldValue::MultiChoice(ids))
        }
        FieldKind::CheckboxSet => {
            let mut entries = Vec::new();
            for line in &content {
                let entry = parse_checkbox_line(field, line, &mismatch)?;
                entries.push(entry);
            }
            Ok(FieldValue::CheckboxSet(entries))
        }
        FieldKind::Table => {
            let mut rows = Vec::new();
            for line in &content {
                rows.push(parse_table_row(field, line, &mismatch)?);
            }
            Ok(FieldValue::Table(rows))
        }
    }
}

fn single_line<'a>(
    content: &[&'a RawLine],
    block_line: usize,
    mismatch: &impl Fn(usize, String) -> DocumentError,
) -> CoreResult<&'a RawLine> {
    match content {
        [line] => Ok(*line),
        [] => Err(mismatch(block_line, "missing value literal".to_string())),
        [_, second, ..] => Err(mismatch(
            second.number,
            "expected a single-line literal".to_string(),
        )),
    }
}

fn list_items(
    content: &[&RawLine],
    mismatch: &impl Fn(usize, String) -> DocumentError,
) -> CoreResult<Vec<String>> {
    content
        .iter()
        .map(|line| {
            line.text
                .trim()
                .strip_prefix("- ")
                .map(|rest| rest.trim().to_string())
                .ok_or_else(|| {
                    mismatch(
                        line.number,
                        format!("list items start with `- `, got `{}`", line.text.trim()),
                    )
                })
        })
        .collect()
}

fn parse_checkbox_line(
    field: &Field,
    line: &RawLine,
    mismatch: &impl Fn(usize, String) -> DocumentError,
) -> CoreResult<CheckboxEntry> {
    let item = line.text.trim().strip_prefix("- ").ok_or_else(|| {
        mismatch(
            line.number,
            format!("checkbox entries start with `- `, got `{}`", line.text.trim()),
        )
    })?;

    let (option, mark) = match field.checkbox_mode {
        CheckboxMode::Simple => {
            // `[x] id` or `[ ] id`
            let (boxed, id) = if let Some(rest) = item.strip_prefix("[x] ").or_else(|| item.strip_prefix("[X] ")) {
                (true, rest)
            } else if let Some(rest) = item.strip_prefix("[ ] ") {
                (false, rest)
            } else {
                return Err(mismatch(
                    line.number,
                    format!("expected `[x] option` or `[ ] option`, got `{}`", item),
                ));
            };
            (id.trim().to_string(), CheckboxMark::Checked(boxed))
        }
        CheckboxMode::Status => {
            // `id: status`
            let (id, status) = item.split_once(':').ok_or_else(|| {
                mismatch(
                    line.number,
                    format!("expected `option: status`, got `{}`", item),
                )
            })?;
            (
                id.trim().to_string(),
                CheckboxMark::Status(status.trim().to_string()),
            )
        }
    };

    if field.option(&option).is_none() {
        return Err(mismatch(line.number, format!("unknown option `{}`", option)));
    }
    Ok(CheckboxEntry { option, mark })
}

fn parse_table_row(
    field: &Field,
    line: &RawLine,
    mismatch: &impl Fn(usize, String) -> DocumentError,
) -> CoreResult<TableRow> {
    let cells = split_row(line.text.trim())
        .ok_or_else(|| mismatch(line.number, "table rows are `| cell | cell |` lines".to_string()))?;
    if cells.len() != field.columns.len() {
        return Err(mismatch(
            line.number,
            format!(
                "row has {} cells, table declares {} columns",
                cells.len(),
                field.columns.len()
            ),
        ));
    }

    let mut row = TableRow::default();
    for (column, text) in field.columns.iter().zip(&cells) {
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let value = cell_from_text(column.kind, text)
            .map_err(|e| mismatch(line.number, format!("column `{}`: {}", column.id, e)))?;
        row.cells.push(TableCell {
            column: column.id.clone(),
            value,
        });
    }
    Ok(row)
}

/// Split a `| a | b |` row into cell texts, honoring `\|` escapes.
/// Returns `None` when the line is not pipe-delimited.
pub(crate) fn split_row(line: &str) -> Option<Vec<String>> {
    if !line.starts_with('|') || !line.ends_with('|') || line.len() < 2 {
        return None;
    }
    let inner = &line[1..line.len() - 1];
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('|') => current.push('|'),
                Some('\\') => current.push('\\'),
                Some(other) => {
                    current.push('\\');
                    current.push(other);
                }
                None => current.push('\\'),
            },
            '|' => {
                cells.push(current.clone());
                current.clear();
            }
            c => current.push(c),
        }
    }
    cells.push(current);
    Some(cells)
}

/// Parse one table cell text as a column kind
pub(crate) fn cell_from_text(kind: ColumnKind, text: &str) -> Result<CellValue, String> {
    match kind {
        ColumnKind::Text => Ok(CellValue::Text(text.to_string())),
        ColumnKind::Number => {
            let n: f64 = text
                .parse()
                .map_err(|_| format!("`{}` is not a number", text))?;
            if n.is_finite() {
                Ok(CellValue::Number(n))
            } else {
                Err("number must be finite".to_string())
            }
        }
        ColumnKind::Url => {
            validate_url(text)?;
            Ok(CellValue::Url(text.to_string()))
        }
        ColumnKind::Date => {
            validate_date(text)?;
            Ok(CellValue::Date(text.to_string()))
        }
        ColumnKind::Year => {
            let y: i64 = text.parse().map_err(|_| format!("`{}` is not a year", text))?;
            validate_year(y)?;
            Ok(CellValue::Year(y as i32))
        }
    }
}
