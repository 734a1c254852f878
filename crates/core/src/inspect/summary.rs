//! Summaries and Form State
//!
//! Count summaries over the document plus the semantic validity check shared
//! by issue generation and the progress accounting.

use serde::Serialize;
use std::fmt;

use crate::models::schema::{CheckboxMode, Field};
use crate::models::value::{CellValue, CheckboxMark, FieldValue};

/// Structural counts of the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureSummary {
    pub groups: usize,
    pub fields: usize,
    pub options: usize,
}

/// Counts of fields by response state, value presence, and validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub answered: usize,
    pub skipped: usize,
    pub aborted: usize,
    pub unanswered: usize,
    /// Fields carrying a non-empty value
    pub filled: usize,
    /// Fields without a non-empty value
    pub empty: usize,
    /// Answered fields whose value passes kind-specific constraints
    pub valid: usize,
    /// Answered fields whose value violates kind-specific constraints
    pub invalid: usize,
}

/// Overall state of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormState {
    Empty,
    Incomplete,
    Complete,
    Invalid,
}

impl FormState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormState::Empty => "empty",
            FormState::Incomplete => "incomplete",
            FormState::Complete => "complete",
            FormState::Invalid => "invalid",
        }
    }
}

impl fmt::Display for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind-specific constraints an answered value can violate.
///
/// Structural shape is guaranteed by the construction sites; this checks the
/// semantic layer: option membership, checkbox mode agreement, table row
/// bounds, required columns, and column typing.
pub(crate) fn semantic_violations(field: &Field, value: &FieldValue) -> Vec<String> {
    let mut violations = Vec::new();

    if value.kind() != field.kind {
        violations.push(format!(
            "value is tagged {}, field is {}",
            value.kind(),
            field.kind
        ));
        return violations;
    }

    match value {
        FieldValue::SingleChoice(Some(id)) if field.option(id).is_none() => {
            violations.push(format!("unknown option `{}`", id));
        }
        FieldValue::MultiChoice(ids) => {
            for id in ids {
                if field.option(id).is_none() {
                    violations.push(format!("unknown option `{}`", id));
                }
            }
        }
        FieldValue::CheckboxSet(entries) => {
            for entry in entries {
                if field.option(&entry.option).is_none() {
                    violations.push(format!("unknown option `{}`", entry.option));
                }
                match (&entry.mark, field.checkbox_mode) {
                    (CheckboxMark::Checked(_), CheckboxMode::Simple) => {}
                    (CheckboxMark::Status(_), CheckboxMode::Status) => {}
                    (CheckboxMark::Checked(_), CheckboxMode::Status) => violations.push(format!(
                        "option `{}` needs a status string, not a checkmark",
                        entry.option
                    )),
                    (CheckboxMark::Status(_), CheckboxMode::Simple) => violations.push(format!(
                        "option `{}` needs a checkmark, not a status string",
                        entry.option
                    )),
                }
            }
        }
        FieldValue::Table(rows) => {
            if let Some(min) = field.min_rows {
                if rows.len() < min {
                    violations.push(format!("table has {} rows, needs at least {}", rows.len(), min));
                }
            }
            if let Some(max) = field.max_rows {
                if rows.len() > max {
                    violations.push(format!("table has {} rows, allows at most {}", rows.len(), max));
                }
            }
            for (idx, row) in rows.iter().enumerate() {
                for cell in &row.cells {
                    match field.column(&cell.column) {
                        None => violations.push(format!(
                            "row {}: unknown column `{}`",
                            idx + 1,
                            cell.column
                        )),
                        Some(column) => {
                            if !cell_matches(&cell.value, column.kind) {
                                violations.push(format!(
                                    "row {}: column `{}` holds the wrong cell kind",
                                    idx + 1,
                                    cell.column
                                ));
                            }
                        }
                    }
                }
                for column in &field.columns {
                    if column.required && row.cell(&column.id).is_none() {
                        violations.push(format!(
                            "row {}: required column `{}` is missing",
                            idx + 1,
                            column.id
                        ));
                    }
                }
            }
        }
        _ => {}
    }

    violations
}

fn cell_matches(cell: &CellValue, kind: crate::models::schema::ColumnKind) -> bool {
    use crate::models::schema::ColumnKind as K;
    matches!(
        (cell, kind),
        (CellValue::Text(_), K::Text)
            | (CellValue::Number(_), K::Number)
            | (CellValue::Url(_), K::Url)
            | (CellValue::Date(_), K::Date)
            | (CellValue::Year(_), K::Year)
    )
}
