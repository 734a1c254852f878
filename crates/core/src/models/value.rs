//! Field Values
//!
//! The tagged union of answer values, mirroring `FieldKind` exactly. A
//! value's tag must always match its field's kind; every construction site
//! (parser literal pass, patch coercion) enforces this, so downstream code
//! can match exhaustively without a runtime "unhandled kind" escape hatch.

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::models::schema::{CheckboxMode, ColumnKind, Field, FieldKind};

/// Mark carried per option of a checkbox-set value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CheckboxMark {
    /// Simple mode: checked or not
    Checked(bool),
    /// Status mode: free-text status string
    Status(String),
}

/// One option's entry in a checkbox-set value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckboxEntry {
    pub option: String,
    pub mark: CheckboxMark,
}

/// A typed table cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Url(String),
    Date(String),
    Year(i32),
}

/// One table cell together with its column id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCell {
    pub column: String,
    pub value: CellValue,
}

/// An ordered table row; absent optional cells are simply not present.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Look up a cell by column id
    pub fn cell(&self, column: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|c| c.column == column)
            .map(|c| &c.value)
    }
}

/// The answer value of a field, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Url(String),
    Date(String),
    Year(i32),
    TextList(Vec<String>),
    UrlList(Vec<String>),
    /// One option id, or no selection
    SingleChoice(Option<String>),
    /// Ordered set of option ids
    MultiChoice(Vec<String>),
    CheckboxSet(Vec<CheckboxEntry>),
    Table(Vec<TableRow>),
}

impl FieldValue {
    /// The kind this value's tag corresponds to.
    ///
    /// Text/Url/Date and Number/Year share representations, so the mapping is
    /// exact by variant, not by content.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Number(_) => FieldKind::Number,
            FieldValue::Url(_) => FieldKind::Url,
            FieldValue::Date(_) => FieldKind::Date,
            FieldValue::Year(_) => FieldKind::Year,
            FieldValue::TextList(_) => FieldKind::TextList,
            FieldValue::UrlList(_) => FieldKind::UrlList,
            FieldValue::SingleChoice(_) => FieldKind::SingleChoice,
            FieldValue::MultiChoice(_) => FieldKind::MultiChoice,
            FieldValue::CheckboxSet(_) => FieldKind::CheckboxSet,
            FieldValue::Table(_) => FieldKind::Table,
        }
    }

    /// Whether the value is present but carries no content
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) | FieldValue::Url(s) | FieldValue::Date(s) => s.trim().is_empty(),
            FieldValue::Number(_) | FieldValue::Year(_) => false,
            FieldValue::TextList(items) | FieldValue::UrlList(items) => items.is_empty(),
            FieldValue::SingleChoice(sel) => sel.is_none(),
            FieldValue::MultiChoice(sel) => sel.is_empty(),
            FieldValue::CheckboxSet(entries) => entries.is_empty(),
            FieldValue::Table(rows) => rows.is_empty(),
        }
    }

    /// Coerce a JSON patch payload into a typed value for `field`.
    ///
    /// This is the structural type-check of patch application: shape, literal
    /// formats, option-id membership, and column typing are all enforced
    /// here. Returns a human-readable message on mismatch.
    pub fn from_json(field: &Field, payload: &JsonValue) -> Result<FieldValue, String> {
        match field.kind {
            FieldKind::Text => as_string(payload).map(FieldValue::Text),
            FieldKind::Number => as_number(payload).map(FieldValue::Number),
            FieldKind::Url => {
                let s = as_string(payload)?;
                validate_url(&s)?;
                Ok(FieldValue::Url(s))
            }
            FieldKind::Date => {
                let s = as_string(payload)?;
                validate_date(&s)?;
                Ok(FieldValue::Date(s))
            }
            FieldKind::Year => as_year(payload).map(FieldValue::Year),
            FieldKind::TextList => as_string_list(payload).map(FieldValue::TextList),
            FieldKind::UrlList => {
                let items = as_string_list(payload)?;
                for item in &items {
                    validate_url(item)?;
                }
                Ok(FieldValue::UrlList(items))
            }
            FieldKind::SingleChoice => match payload {
                JsonValue::Null => Ok(FieldValue::SingleChoice(None)),
                JsonValue::String(id) => {
                    check_option(field, id)?;
                    Ok(FieldValue::SingleChoice(Some(id.clone())))
                }
                other => Err(format!("expected an option id or null, got {}", type_name(other))),
            },
            FieldKind::MultiChoice => {
                let ids = as_string_list(payload)?;
                for id in &ids {
                    check_option(field, id)?;
                }
                Ok(FieldValue::MultiChoice(ids))
            }
            FieldKind::CheckboxSet => {
                let map = payload
                    .as_object()
                    .ok_or_else(|| format!("expected an object, got {}", type_name(payload)))?;
                let mut entries = Vec::new();
                // Entries follow option declaration order, not JSON key order,
                // so the resulting value is deterministic.
                for option in &field.options {
                    if let Some(raw) = map.get(&option.id) {
                        let mark = match (field.checkbox_mode, raw) {
                            (CheckboxMode::Simple, JsonValue::Bool(b)) => CheckboxMark::Checked(*b),
                            (CheckboxMode::Status, JsonValue::String(s)) => {
                                CheckboxMark::Status(s.clone())
                            }
                            (CheckboxMode::Simple, other) => {
                                return Err(format!(
                                    "option `{}` expects a boolean, got {}",
                                    option.id,
                                    type_name(other)
                                ))
                            }
                            (CheckboxMode::Status, other) => {
                                return Err(format!(
                                    "option `{}` expects a status string, got {}",
                                    option.id,
                                    type_name(other)
                                ))
                            }
                        };
                        entries.push(CheckboxEntry {
                            option: option.id.clone(),
                            mark,
                        });
                    }
                }
                for key in map.keys() {
                    if field.option(key).is_none() {
                        return Err(format!("unknown option `{}`", key));
                    }
                }
                Ok(FieldValue::CheckboxSet(entries))
            }
            FieldKind::Table => {
                let raw_rows = payload
                    .as_array()
                    .ok_or_else(|| format!("expected an array of rows, got {}", type_name(payload)))?;
                let mut rows = Vec::new();
                for (idx, raw_row) in raw_rows.iter().enumerate() {
                    let obj = raw_row.as_object().ok_or_else(|| {
                        format!("row {} must be an object, got {}", idx + 1, type_name(raw_row))
                    })?;
                    let mut row = TableRow::default();
                    for column in &field.columns {
                        if let Some(raw_cell) = obj.get(&column.id) {
                            if raw_cell.is_null() {
                                continue;
                            }
                            let value = cell_from_json(column.kind, raw_cell).map_err(|e| {
                                format!("row {}, column `{}`: {}", idx + 1, column.id, e)
                            })?;
                            row.cells.push(TableCell {
                                column: column.id.clone(),
                                value,
                            });
                        }
                    }
                    for key in obj.keys() {
                        if field.column(key).is_none() {
                            return Err(format!("row {}: unknown column `{}`", idx + 1, key));
                        }
                    }
                    rows.push(row);
                }
                Ok(FieldValue::Table(rows))
            }
        }
    }

    /// Render the value as plain JSON, the inverse of the patch payload shape
    pub fn to_json(&self) -> JsonValue {
        match self {
            FieldValue::Text(s) | FieldValue::Url(s) | FieldValue::Date(s) => {
                JsonValue::String(s.clone())
            }
            FieldValue::Number(n) => serde_json::json!(n),
            FieldValue::Year(y) => serde_json::json!(y),
            FieldValue::TextList(items) | FieldValue::UrlList(items) => serde_json::json!(items),
            FieldValue::SingleChoice(sel) => match sel {
                Some(id) => JsonValue::String(id.clone()),
                None => JsonValue::Null,
            },
            FieldValue::MultiChoice(ids) => serde_json::json!(ids),
            FieldValue::CheckboxSet(entries) => {
                let mut map = serde_json::Map::new();
                for entry in entries {
                    let value = match &entry.mark {
                        CheckboxMark::Checked(b) => JsonValue::Bool(*b),
                        CheckboxMark::Status(s) => JsonValue::String(s.clone()),
                    };
                    map.insert(entry.option.clone(), value);
                }
                JsonValue::Object(map)
            }
            FieldValue::Table(rows) => {
                let json_rows: Vec<JsonValue> = rows
                    .iter()
                    .map(|row| {
                        let mut map = serde_json::Map::new();
                        for cell in &row.cells {
                            map.insert(cell.column.clone(), cell_to_json(&cell.value));
                        }
                        JsonValue::Object(map)
                    })
                    .collect();
                JsonValue::Array(json_rows)
            }
        }
    }
}

fn cell_to_json(value: &CellValue) -> JsonValue {
    match value {
        CellValue::Text(s) | CellValue::Url(s) | CellValue::Date(s) => JsonValue::String(s.clone()),
        CellValue::Number(n) => serde_json::json!(n),
        CellValue::Year(y) => serde_json::json!(y),
    }
}

/// Coerce a JSON scalar into a typed cell for a column kind
pub(crate) fn cell_from_json(kind: ColumnKind, payload: &JsonValue) -> Result<CellValue, String> {
    match kind {
        ColumnKind::Text => as_string(payload).map(CellValue::Text),
        ColumnKind::Number => as_number(payload).map(CellValue::Number),
        ColumnKind::Url => {
            let s = as_string(payload)?;
            validate_url(&s)?;
            Ok(CellValue::Url(s))
        }
        ColumnKind::Date => {
            let s = as_string(payload)?;
            validate_date(&s)?;
            Ok(CellValue::Date(s))
        }
        ColumnKind::Year => as_year(payload).map(CellValue::Year),
    }
}

fn as_string(payload: &JsonValue) -> Result<String, String> {
    payload
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| format!("expected a string, got {}", type_name(payload)))
}

fn as_number(payload: &JsonValue) -> Result<f64, String> {
    let n = payload
        .as_f64()
        .ok_or_else(|| format!("expected a number, got {}", type_name(payload)))?;
    if n.is_finite() {
        Ok(n)
    } else {
        Err("number must be finite".to_string())
    }
}

fn as_year(payload: &JsonValue) -> Result<i32, String> {
    let y = payload
        .as_i64()
        .ok_or_else(|| format!("expected a year integer, got {}", type_name(payload)))?;
    validate_year(y)?;
    Ok(y as i32)
}

fn as_string_list(payload: &JsonValue) -> Result<Vec<String>, String> {
    let arr = payload
        .as_array()
        .ok_or_else(|| format!("expected an array of strings, got {}", type_name(payload)))?;
    arr.iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| format!("expected a string item, got {}", type_name(item)))
        })
        .collect()
}

fn check_option(field: &Field, id: &str) -> Result<(), String> {
    if field.option(id).is_some() {
        Ok(())
    } else {
        Err(format!("unknown option `{}`", id))
    }
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// Validate a `YYYY-MM-DD` date literal
pub(crate) fn validate_date(s: &str) -> Result<(), String> {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| format!("`{}` is not a YYYY-MM-DD date", s))
}

/// Validate an absolute URL literal
pub(crate) fn validate_url(s: &str) -> Result<(), String> {
    url::Url::parse(s)
        .map(|_| ())
        .map_err(|_| format!("`{}` is not an absolute URL", s))
}

/// Validate a 4-digit year
pub(crate) fn validate_year(y: i64) -> Result<(), String> {
    if (1000..=9999).contains(&y) {
        Ok(())
    } else {
        Err(format!("year {} is outside 1000..=9999", y))
    }
}
