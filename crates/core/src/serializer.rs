//! Document Serializer
//!
//! Renders a `Document` back to directive text. Preserve mode reproduces the
//! original bytes for untouched content and splices canonical re-renderings
//! over the spans of fields whose responses changed; canonical mode
//! regenerates the whole document from the model alone.

use tracing::debug;

use crate::models::document::{Document, SourceSpan};
use crate::models::note::Note;
use crate::models::response::FieldResponse;
use crate::models::schema::{CheckboxMode, Field, Group, Role};
use crate::models::value::{CellValue, CheckboxMark, FieldValue};

/// Serialization options.
#[derive(Debug, Clone, Copy)]
pub struct SerializeOptions {
    /// Keep the original source formatting for unchanged fields
    pub preserve_original_formatting: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            preserve_original_formatting: true,
        }
    }
}

/// Render the document to text.
pub fn serialize(doc: &Document, opts: &SerializeOptions) -> String {
    if opts.preserve_original_formatting {
        preserve(doc)
    } else {
        canonical(doc)
    }
}

fn preserve(doc: &Document) -> String {
    let source = match doc.source() {
        Some(source) => source,
        None => return canonical(doc),
    };
    if doc.dirty.is_empty() {
        return source.raw.clone();
    }

    let mut edits: Vec<(SourceSpan, String)> = Vec::new();
    for field_id in &doc.dirty {
        let span = match source.field_spans.get(field_id) {
            Some(span) => *span,
            // A dirty field the source never saw; fall back to a full render.
            None => return canonical(doc),
        };
        let (_, field) = match doc.schema.field(field_id) {
            Some(found) => found,
            None => return canonical(doc),
        };
        let mut block = field_block(field, doc.response(field_id));
        block.push(String::new());
        edits.push((span, block.join("\n") + "\n"));
    }

    debug!(edits = edits.len(), "splicing changed fields into original text");
    edits.sort_by_key(|(span, _)| span.start);

    let mut out = source.raw.clone();
    for (span, replacement) in edits.into_iter().rev() {
        out.replace_range(span.start..span.end, &replacement);
    }
    out
}

fn canonical(doc: &Document) -> String {
    let mut lines: Vec<String> = Vec::new();

    if !doc.meta.is_default() {
        lines.push("---".to_string());
        if doc.meta.run_mode != Default::default() {
            lines.push(format!("run-mode: {}", doc.meta.run_mode));
        }
        if let Some(n) = doc.meta.limits.max_turns {
            lines.push(format!("max-turns: {}", n));
        }
        if let Some(n) = doc.meta.limits.max_patches_per_turn {
            lines.push(format!("max-patches-per-turn: {}", n));
        }
        if let Some(n) = doc.meta.limits.max_issues_per_turn {
            lines.push(format!("max-issues-per-turn: {}", n));
        }
        for (key, value) in &doc.meta.extra {
            lines.push(format!("{}: {}", key, value));
        }
        lines.push("---".to_string());
        lines.push(String::new());
    }

    if !doc.preamble.is_empty() {
        lines.push(doc.preamble.clone());
        lines.push(String::new());
    }

    let known_refs: Vec<&str> = doc
        .schema
        .groups
        .iter()
        .flat_map(|g| {
            std::iter::once(g.id.as_str()).chain(g.fields.iter().map(|f| f.id.as_str()))
        })
        .collect();

    for group in &doc.schema.groups {
        lines.push(group_directive(group));
        lines.push(String::new());
        if !group.description.is_empty() {
            lines.push(group.description.clone());
            lines.push(String::new());
        }
        for field in &group.fields {
            lines.extend(field_block(field, doc.response(&field.id)));
            lines.push(String::new());
            for note in doc.notes_for(&field.id) {
                lines.extend(note_block(note));
                lines.push(String::new());
            }
        }
        for note in doc.notes_for(&group.id) {
            lines.extend(note_block(note));
            lines.push(String::new());
        }
    }

    // Notes whose reference no longer matches anything still survive.
    for note in &doc.notes {
        if !known_refs.contains(&note.reference.as_str()) {
            lines.extend(note_block(note));
            lines.push(String::new());
        }
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n") + "\n"
}

fn group_directive(group: &Group) -> String {
    let mut attrs = vec![format!("id={}", group.id)];
    if group.label != group.id {
        attrs.push(format!("label=\"{}\"", attr_escape(&group.label)));
    }
    if let Some(order) = group.order {
        attrs.push(format!("order={}", order));
    }
    format!("::group{{{}}}", attrs.join(" "))
}

fn field_block(field: &Field, response: &FieldResponse) -> Vec<String> {
    let mut lines = vec![field_directive(field)];

    if !field.prompt.is_empty() {
        lines.push(String::new());
        lines.push(field.prompt.clone());
    }

    if !field.options.is_empty() {
        lines.push(String::new());
        lines.push("::options".to_string());
        for option in &field.options {
            if option.label == option.id {
                lines.push(format!("- {}", option.id));
            } else {
                lines.push(format!("- {} | {}", option.id, option.label));
            }
        }
        lines.push("::end".to_string());
    }

    if !field.columns.is_empty() {
        lines.push(String::new());
        lines.push("::columns".to_string());
        for column in &field.columns {
            let mut parts = vec![
                column.id.clone(),
                column.label.clone(),
                column.kind.to_string(),
            ];
            if column.required {
                parts.push("required".to_string());
            }
            lines.push(format!("- {}", parts.join(" | ")));
        }
        lines.push("::end".to_string());
    }

    if let Some(block) = response_block(field, response) {
        lines.push(String::new());
        lines.extend(block);
    }

    lines
}

fn field_directive(field: &Field) -> String {
    let mut attrs = vec![
        format!("id={}", field.id),
        format!("kind={}", field.kind),
    ];
    if field.label != field.id {
        attrs.push(format!("label=\"{}\"", attr_escape(&field.label)));
    }
    if field.required {
        attrs.push("required=true".to_string());
    }
    if field.role != Role::default() {
        attrs.push(format!("role={}", field.role));
    }
    if field.checkbox_mode == CheckboxMode::Status {
        attrs.push("mode=status".to_string());
    }
    if let Some(order) = field.order {
        attrs.push(format!("order={}", order));
    }
    if let Some(dep) = &field.depends_on {
        attrs.push(format!("depends-on={}", dep));
    }
    if let Some(tag) = &field.parallel_group {
        attrs.push(format!("parallel={}", tag));
    }
    if field.serial {
        attrs.push("serial=true".to_string());
    }
    if let Some(n) = field.min_rows {
        attrs.push(format!("min-rows={}", n));
    }
    if let Some(n) = field.max_rows {
        attrs.push(format!("max-rows={}", n));
    }
    format!("::field{{{}}}", attrs.join(" "))
}

fn response_block(field: &Field, response: &FieldResponse) -> Option<Vec<String>> {
    let mut lines = Vec::new();
    match response {
        FieldResponse::Unanswered => return None,
        FieldResponse::Answered { value } => {
            lines.push("::response{state=answered}".to_string());
            lines.extend(value_literal(field, value));
        }
        FieldResponse::Skipped { reason } | FieldResponse::Aborted { reason } => {
            let state = response.state_name();
            match reason {
                Some(reason) => lines.push(format!(
                    "::response{{state={} reason=\"{}\"}}",
                    state,
                    attr_escape(reason)
                )),
                None => lines.push(format!("::response{{state={}}}", state)),
            }
        }
    }
    lines.push("::end".to_string());
    Some(lines)
}

/// Render a value as its kind-specific literal lines
fn value_literal(field: &Field, value: &FieldValue) -> Vec<String> {
    match value {
        FieldValue::Text(s) => {
            if s.is_empty() {
                Vec::new()
            } else {
                s.split('\n').map(str::to_string).collect()
            }
        }
        FieldValue::Number(n) => vec![format_number(*n)],
        FieldValue::Url(s) | FieldValue::Date(s) => vec![s.clone()],
        FieldValue::Year(y) => vec![y.to_string()],
        FieldValue::TextList(items) | FieldValue::UrlList(items) => {
            items.iter().map(|item| format!("- {}", item)).collect()
        }
        FieldValue::SingleChoice(sel) => match sel {
            Some(id) => vec![id.clone()],
            None => Vec::new(),
        },
        FieldValue::MultiChoice(ids) => ids.iter().map(|id| format!("- {}", id)).collect(),
        FieldValue::CheckboxSet(entries) => entries
            .iter()
            .map(|entry| match &entry.mark {
                CheckboxMark::Checked(true) => format!("- [x] {}", entry.option),
                CheckboxMark::Checked(false) => format!("- [ ] {}", entry.option),
                CheckboxMark::Status(status) => format!("- {}: {}", entry.option, status),
            })
            .collect(),
        FieldValue::Table(rows) => rows
            .iter()
            .map(|row| {
                let cells: Vec<String> = field
                    .columns
                    .iter()
                    .map(|column| match row.cell(&column.id) {
                        Some(cell) => cell_text(cell),
                        None => String::new(),
                    })
                    .collect();
                format!("| {} |", cells.join(" | "))
            })
            .collect(),
    }
}

fn cell_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Text(s) => s.replace('\\', "\\\\").replace('|', "\\|"),
        CellValue::Number(n) => format_number(*n),
        CellValue::Url(s) | CellValue::Date(s) => s.clone(),
        CellValue::Year(y) => y.to_string(),
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn note_block(note: &Note) -> Vec<String> {
    let mut lines = vec![format!(
        "::note{{id={} role={} ref={}}}",
        note.id, note.role, note.reference
    )];
    if !note.text.is_empty() {
        lines.push(note.text.clone());
    }
    lines.push("::end".to_string());
    lines
}

fn attr_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
