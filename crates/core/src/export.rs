//! Export Projections
//!
//! Read-only renderings of a document for external consumption: a narrative
//! markdown view, a JSON-Schema-shaped structural description, and a plain
//! JSON dump of current values. These are projections, not part of the
//! round-trip path; the structural export keeps everything needed to
//! reconstruct the schema under `x-intake-*` extension keys, while response
//! state may be lost.

use serde_json::{json, Map, Value as JsonValue};

use crate::models::document::Document;
use crate::models::response::FieldResponse;
use crate::models::schema::{CheckboxMode, ColumnKind, Field, FieldKind};
use crate::models::value::{CellValue, CheckboxMark, FieldValue};

/// Render the document as narrative markdown.
pub fn to_markdown(doc: &Document) -> String {
    let mut md: Vec<String> = Vec::new();

    md.push("# Form".to_string());
    md.push(String::new());
    if !doc.preamble.is_empty() {
        md.push(doc.preamble.clone());
        md.push(String::new());
    }
    md.push(format!("**Run mode:** `{}`", doc.meta.run_mode));
    md.push(String::new());

    for group in &doc.schema.groups {
        md.push(format!("## {}", group.label));
        md.push(String::new());
        if !group.description.is_empty() {
            md.push(group.description.clone());
            md.push(String::new());
        }

        for field in &group.fields {
            md.push(format!("### {}", field.label));
            md.push(String::new());
            let requiredness = if field.required { "required" } else { "optional" };
            md.push(format!(
                "`{}` -- {}, {}, answered by {}",
                field.id, field.kind, requiredness, field.role
            ));
            md.push(String::new());
            if !field.prompt.is_empty() {
                md.push(field.prompt.clone());
                md.push(String::new());
            }

            match doc.response(&field.id) {
                FieldResponse::Unanswered => md.push("_Unanswered._".to_string()),
                FieldResponse::Skipped { reason } => md.push(match reason {
                    Some(reason) => format!("_Skipped: {}_", reason),
                    None => "_Skipped._".to_string(),
                }),
                FieldResponse::Aborted { reason } => md.push(match reason {
                    Some(reason) => format!("_Aborted: {}_", reason),
                    None => "_Aborted._".to_string(),
                }),
                FieldResponse::Answered { value } => {
                    md.push("**Answer:**".to_string());
                    md.push(String::new());
                    render_answer(&mut md, field, value);
                }
            }
            md.push(String::new());

            for note in doc.notes_for(&field.id) {
                md.push(format!("> **Note ({}):** {}", note.role, note.text));
                md.push(String::new());
            }
        }

        for note in doc.notes_for(&group.id) {
            md.push(format!("> **Note ({}):** {}", note.role, note.text));
            md.push(String::new());
        }
    }

    while md.last().is_some_and(|l| l.is_empty()) {
        md.pop();
    }
    md.join("\n") + "\n"
}

fn render_answer(md: &mut Vec<String>, field: &Field, value: &FieldValue) {
    match value {
        FieldValue::Text(s) | FieldValue::Url(s) | FieldValue::Date(s) => md.push(s.clone()),
        FieldValue::Number(n) => md.push(n.to_string()),
        FieldValue::Year(y) => md.push(y.to_string()),
        FieldValue::TextList(items) | FieldValue::UrlList(items) => {
            for item in items {
                md.push(format!("- {}", item));
            }
        }
        FieldValue::SingleChoice(sel) => match sel {
            Some(id) => md.push(option_label(field, id)),
            None => md.push("_(no selection)_".to_string()),
        },
        FieldValue::MultiChoice(ids) => {
            for id in ids {
                md.push(format!("- {}", option_label(field, id)));
            }
        }
        FieldValue::CheckboxSet(entries) => {
            for entry in entries {
                let label = option_label(field, &entry.option);
                match &entry.mark {
                    CheckboxMark::Checked(true) => md.push(format!("- [x] {}", label)),
                    CheckboxMark::Checked(false) => md.push(format!("- [ ] {}", label)),
                    CheckboxMark::Status(status) => md.push(format!("- {}: {}", label, status)),
                }
            }
        }
        FieldValue::Table(rows) => {
            let header: Vec<&str> = field.columns.iter().map(|c| c.label.as_str()).collect();
            md.push(format!("| {} |", header.join(" | ")));
            md.push(format!(
                "| {} |",
                field.columns.iter().map(|_| "---").collect::<Vec<_>>().join(" | ")
            ));
            for row in rows {
                let cells: Vec<String> = field
                    .columns
                    .iter()
                    .map(|column| match row.cell(&column.id) {
                        Some(CellValue::Text(s))
                        | Some(CellValue::Url(s))
                        | Some(CellValue::Date(s)) => s.clone(),
                        Some(CellValue::Number(n)) => n.to_string(),
                        Some(CellValue::Year(y)) => y.to_string(),
                        None => String::new(),
                    })
                    .collect();
                md.push(format!("| {} |", cells.join(" | ")));
            }
        }
    }
}

fn option_label(field: &Field, id: &str) -> String {
    field
        .option(id)
        .map(|o| o.label.clone())
        .unwrap_or_else(|| id.to_string())
}

/// Render the schema as a JSON-Schema-shaped structural description.
pub fn to_schema_json(doc: &Document) -> JsonValue {
    let mut group_props = Map::new();
    let mut group_ids = Vec::new();

    for group in &doc.schema.groups {
        let mut field_props = Map::new();
        let mut required_fields = Vec::new();
        for field in &group.fields {
            field_props.insert(field.id.clone(), field_schema(field));
            if field.required {
                required_fields.push(json!(field.id));
            }
        }

        let mut group_schema = json!({
            "type": "object",
            "title": group.label,
            "properties": JsonValue::Object(field_props),
            "required": required_fields,
        });
        let obj = group_schema.as_object_mut().expect("object literal");
        if !group.description.is_empty() {
            obj.insert("description".to_string(), json!(group.description));
        }
        if let Some(order) = group.order {
            obj.insert("x-intake-order".to_string(), json!(order));
        }

        group_props.insert(group.id.clone(), group_schema);
        group_ids.push(json!(group.id));
    }

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "x-intake-run-mode": doc.meta.run_mode,
        "properties": JsonValue::Object(group_props),
        "required": group_ids,
    })
}

fn field_schema(field: &Field) -> JsonValue {
    let option_ids: Vec<&str> = field.options.iter().map(|o| o.id.as_str()).collect();

    let mut schema = match field.kind {
        FieldKind::Text => json!({"type": "string"}),
        FieldKind::Number => json!({"type": "number"}),
        FieldKind::Url => json!({"type": "string", "format": "uri"}),
        FieldKind::Date => json!({"type": "string", "format": "date"}),
        FieldKind::Year => json!({"type": "integer", "minimum": 1000, "maximum": 9999}),
        FieldKind::TextList => json!({"type": "array", "items": {"type": "string"}}),
        FieldKind::UrlList => {
            json!({"type": "array", "items": {"type": "string", "format": "uri"}})
        }
        FieldKind::SingleChoice => json!({"type": "string", "enum": option_ids}),
        FieldKind::MultiChoice => {
            json!({"type": "array", "items": {"type": "string", "enum": option_ids}})
        }
        FieldKind::CheckboxSet => {
            let cell = match field.checkbox_mode {
                CheckboxMode::Simple => json!({"type": "boolean"}),
                CheckboxMode::Status => json!({"type": "string"}),
            };
            let mut props = Map::new();
            for option in &field.options {
                props.insert(option.id.clone(), cell.clone());
            }
            json!({
                "type": "object",
                "properties": JsonValue::Object(props),
                "additionalProperties": false,
            })
        }
        FieldKind::Table => {
            let mut props = Map::new();
            let mut required = Vec::new();
            for column in &field.columns {
                props.insert(column.id.clone(), column_schema(column.kind, &column.label));
                if column.required {
                    required.push(json!(column.id));
                }
            }
            let mut table = json!({
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": JsonValue::Object(props),
                    "required": required,
                    "additionalProperties": false,
                },
            });
            let obj = table.as_object_mut().expect("object literal");
            if let Some(min) = field.min_rows {
                obj.insert("minItems".to_string(), json!(min));
            }
            if let Some(max) = field.max_rows {
                obj.insert("maxItems".to_string(), json!(max));
            }
            table
        }
    };

    let obj = schema.as_object_mut().expect("object literal");
    obj.insert("title".to_string(), json!(field.label));
    if !field.prompt.is_empty() {
        obj.insert("description".to_string(), json!(field.prompt));
    }
    obj.insert("x-intake-kind".to_string(), json!(field.kind));
    obj.insert("x-intake-role".to_string(), json!(field.role));
    if !field.options.is_empty() {
        obj.insert("x-intake-options".to_string(), json!(field.options));
    }
    if field.kind == FieldKind::CheckboxSet {
        obj.insert("x-intake-mode".to_string(), json!(field.checkbox_mode));
    }
    if let Some(order) = field.order {
        obj.insert("x-intake-order".to_string(), json!(order));
    }
    if let Some(dep) = &field.depends_on {
        obj.insert("x-intake-depends-on".to_string(), json!(dep));
    }
    if let Some(tag) = &field.parallel_group {
        obj.insert("x-intake-parallel".to_string(), json!(tag));
    }
    if field.serial {
        obj.insert("x-intake-serial".to_string(), json!(true));
    }
    schema
}

fn column_schema(kind: ColumnKind, label: &str) -> JsonValue {
    let mut schema = match kind {
        ColumnKind::Text => json!({"type": "string"}),
        ColumnKind::Number => json!({"type": "number"}),
        ColumnKind::Url => json!({"type": "string", "format": "uri"}),
        ColumnKind::Date => json!({"type": "string", "format": "date"}),
        ColumnKind::Year => json!({"type": "integer", "minimum": 1000, "maximum": 9999}),
    };
    schema
        .as_object_mut()
        .expect("object literal")
        .insert("title".to_string(), json!(label));
    schema
}

/// Dump current responses as plain JSON, keyed by field id.
pub fn to_values_json(doc: &Document) -> JsonValue {
    let mut fields = Map::new();
    for (_, field) in doc.schema.fields() {
        let response = doc.response(&field.id);
        let mut entry = Map::new();
        entry.insert("state".to_string(), json!(response.state_name()));
        if let Some(value) = response.value() {
            entry.insert("value".to_string(), value.to_json());
        }
        if let Some(reason) = response.reason() {
            entry.insert("reason".to_string(), json!(reason));
        }
        fields.insert(field.id.clone(), JsonValue::Object(entry));
    }
    json!({
        "runMode": doc.meta.run_mode,
        "fields": JsonValue::Object(fields),
    })
}
