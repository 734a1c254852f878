//! Document Parser
//!
//! Two-pass parser for the directive-annotated form format. The structural
//! pass builds the schema (ids, kinds, requiredness, roles, options,
//! columns) together with a byte-span record per field; the value pass then
//! interprets each recorded response block as its field's kind.
//!
//! All parse failures are `DocumentError`s pointing at the offending line;
//! nothing is silently recovered.

mod directive;
mod frontmatter;
mod literal;

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{CoreResult, DocumentError};
use crate::models::document::{Document, SourceMap, SourceSpan};
use crate::models::note::Note;
use crate::models::response::FieldResponse;
use crate::models::schema::{
    CheckboxMode, ChoiceOption, Column, ColumnKind, Field, FieldKind, Group, Role, Schema,
};

use directive::{is_directive, parse_directive, Directive};

/// One physical line of the document with its position.
#[derive(Debug, Clone)]
pub(crate) struct RawLine {
    /// 1-based line number
    pub number: usize,
    /// Byte offset of the line start in the original text
    pub start: usize,
    /// Line content without the trailing newline
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BlockKind {
    Options,
    Columns,
    Response,
    Note,
}

impl BlockKind {
    fn directive_name(&self) -> &'static str {
        match self {
            BlockKind::Options => "options",
            BlockKind::Columns => "columns",
            BlockKind::Response => "response",
            BlockKind::Note => "note",
        }
    }
}

struct OpenBlock {
    kind: BlockKind,
    head: Directive,
    body: Vec<RawLine>,
}

/// A response block recorded during the structural pass, typed in pass two.
struct PendingResponse {
    state: String,
    reason: Option<String>,
    body: Vec<RawLine>,
    line: usize,
}

/// Parse document text into a typed `Document`.
pub fn parse(text: &str) -> CoreResult<Document> {
    let lines = raw_lines(text);
    let (meta, body_start) = frontmatter::parse_frontmatter(&lines)?;

    let mut state = ParseState::new();
    for line in &lines[body_start..] {
        state.feed(line)?;
    }
    state.finish(text.len())?;

    let mut responses = HashMap::new();
    let schema = Schema {
        groups: state.groups,
    };
    // Value pass: every recorded literal must parse as its field's kind.
    for (_, field) in schema.fields() {
        if let Some(pending) = state.pending_responses.remove(&field.id) {
            responses.insert(field.id.clone(), typed_response(field, pending)?);
        }
    }

    debug!(
        groups = schema.groups.len(),
        fields = schema.field_count(),
        notes = state.notes.len(),
        "parsed form document"
    );

    Ok(Document {
        meta,
        preamble: state.preamble.join("\n").trim().to_string(),
        schema,
        responses,
        notes: state.notes,
        source: Some(SourceMap {
            raw: text.to_string(),
            field_spans: state.field_spans,
        }),
        dirty: HashSet::new(),
    })
}

fn raw_lines(text: &str) -> Vec<RawLine> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for (idx, piece) in text.split_inclusive('\n').enumerate() {
        let content = piece.strip_suffix('\n').unwrap_or(piece);
        let content = content.strip_suffix('\r').unwrap_or(content);
        lines.push(RawLine {
            number: idx + 1,
            start: offset,
            text: content.to_string(),
        });
        offset += piece.len();
    }
    lines
}

struct ParseState {
    groups: Vec<Group>,
    notes: Vec<Note>,
    preamble: Vec<String>,
    pending_responses: HashMap<String, PendingResponse>,
    field_spans: HashMap<String, SourceSpan>,
    ids: HashMap<String, usize>,
    note_ids: HashSet<String>,
    /// (group index, field index, span start) of the field being built
    current_field: Option<(usize, usize, usize)>,
    prompt_lines: Vec<String>,
    field_has_block: bool,
    group_has_field: bool,
    open_block: Option<OpenBlock>,
}

impl ParseState {
    fn new() -> Self {
        Self {
            groups: Vec::new(),
            notes: Vec::new(),
            preamble: Vec::new(),
            pending_responses: HashMap::new(),
            field_spans: HashMap::new(),
            ids: HashMap::new(),
            note_ids: HashSet::new(),
            current_field: None,
            prompt_lines: Vec::new(),
            field_has_block: false,
            group_has_field: false,
            open_block: None,
        }
    }

    fn feed(&mut self, line: &RawLine) -> CoreResult<()> {
        if self.open_block.is_some() {
            if is_directive(&line.text) {
                let head = parse_directive(&line.text, line.number)?;
                if head.name == "end" {
                    let block = self.open_block.take().unwrap();
                    return self.close_block(block);
                }
                let kind = self.open_block.as_ref().unwrap().kind;
                return Err(DocumentError::invalid_directive(
                    line.number,
                    format!(
                        "`::{}` inside an open ::{} block; close it with ::end",
                        head.name,
                        kind.directive_name()
                    ),
                ));
            }
            self.open_block.as_mut().unwrap().body.push(line.clone());
            return Ok(());
        }

        if !is_directive(&line.text) {
            return self.feed_prose(line);
        }

        let head = parse_directive(&line.text, line.number)?;
        match head.name.as_str() {
            "group" => self.start_group(head, line.start),
            "field" => self.start_field(head, line.start),
            "options" => self.open_field_block(head, BlockKind::Options),
            "columns" => self.open_field_block(head, BlockKind::Columns),
            "response" => self.open_field_block(head, BlockKind::Response),
            "note" => {
                self.close_field_span(line.start);
                self.open_block = Some(OpenBlock {
                    kind: BlockKind::Note,
                    head,
                    body: Vec::new(),
                });
                Ok(())
            }
            "end" => Err(DocumentError::invalid_directive(
                line.number,
                "::end without an open block",
            )),
            other => Err(DocumentError::unknown_directive(other, line.number)),
        }
    }

    fn feed_prose(&mut self, line: &RawLine) -> CoreResult<()> {
        let blank = line.text.trim().is_empty();
        if self.current_field.is_some() {
            if self.field_has_block {
                if blank {
                    return Ok(());
                }
                return Err(DocumentError::invalid_directive(
                    line.number,
                    "prompt text must precede the field's option/column/response blocks",
                ));
            }
            self.prompt_lines.push(line.text.clone());
            return Ok(());
        }
        if let Some(group) = self.groups.last_mut() {
            if self.group_has_field {
                if blank {
                    return Ok(());
                }
                return Err(DocumentError::invalid_directive(
                    line.number,
                    "prose after a group's fields; attach it to a field prompt or a ::note",
                ));
            }
            if !group.description.is_empty() || !blank {
                group.description.push_str(&line.text);
                group.description.push('\n');
            }
            return Ok(());
        }
        self.preamble.push(line.text.clone());
        Ok(())
    }

    fn check_unique(&mut self, id: &str, line: usize) -> CoreResult<()> {
        if let Some(_prior) = self.ids.insert(id.to_string(), line) {
            return Err(DocumentError::duplicate_id(id, line));
        }
        Ok(())
    }

    fn start_group(&mut self, head: Directive, byte_start: usize) -> CoreResult<()> {
        self.close_field_span(byte_start);
        if let Some(group) = self.groups.last_mut() {
            group.description = group.description.trim().to_string();
        }

        let id = head.require_attr("id")?.to_string();
        self.check_unique(&id, head.line)?;
        let mut group = Group::new(id, head.attr("label").unwrap_or(""));
        if group.label.is_empty() {
            group.label = group.id.clone();
        }
        group.order = head.int_attr("order")?;
        self.groups.push(group);
        self.group_has_field = false;
        Ok(())
    }

    fn start_field(&mut self, head: Directive, byte_start: usize) -> CoreResult<()> {
        self.close_field_span(byte_start);
        let group_idx = match self.groups.len() {
            0 => {
                return Err(DocumentError::invalid_directive(
                    head.line,
                    "`::field` requires an enclosing `::group`",
                ))
            }
            n => n - 1,
        };
        if let Some(group) = self.groups.last_mut() {
            group.description = group.description.trim().to_string();
        }

        let id = head.require_attr("id")?.to_string();
        self.check_unique(&id, head.line)?;
        let kind_name = head.require_attr("kind")?;
        let kind = FieldKind::parse(kind_name).ok_or_else(|| {
            DocumentError::invalid_directive(
                head.line,
                format!("unknown field kind `{}`", kind_name),
            )
        })?;

        let mut field = Field::new(id, kind, head.attr("label").unwrap_or(""));
        if field.label.is_empty() {
            field.label = field.id.clone();
        }
        field.required = head.bool_attr("required")?;
        field.role = Role::from(head.attr("role").unwrap_or("user").to_string());
        field.order = head.int_attr("order")?;
        field.depends_on = head.attr("depends-on").map(str::to_string);
        field.parallel_group = head.attr("parallel").map(str::to_string);
        field.serial = head.bool_attr("serial")?;

        match head.attr("mode") {
            None => {}
            Some(_) if kind != FieldKind::CheckboxSet => {
                return Err(DocumentError::invalid_directive(
                    head.line,
                    "`mode` only applies to checkbox-set fields",
                ))
            }
            Some("simple") => field.checkbox_mode = CheckboxMode::Simple,
            Some("status") => field.checkbox_mode = CheckboxMode::Status,
            Some(other) => {
                return Err(DocumentError::invalid_directive(
                    head.line,
                    format!("unknown checkbox mode `{}`", other),
                ))
            }
        }

        field.min_rows = head.count_attr("min-rows")?;
        field.max_rows = head.count_attr("max-rows")?;
        if (field.min_rows.is_some() || field.max_rows.is_some()) && kind != FieldKind::Table {
            return Err(DocumentError::invalid_directive(
                head.line,
                "row bounds only apply to table fields",
            ));
        }

        let group = &mut self.groups[group_idx];
        group.fields.push(field);
        self.current_field = Some((group_idx, group.fields.len() - 1, byte_start));
        self.prompt_lines.clear();
        self.field_has_block = false;
        self.group_has_field = true;
        Ok(())
    }

    fn open_field_block(&mut self, head: Directive, kind: BlockKind) -> CoreResult<()> {
        let (group_idx, field_idx, _) = self.current_field.ok_or_else(|| {
            DocumentError::invalid_directive(
                head.line,
                format!("`::{}` belongs inside a field", kind.directive_name()),
            )
        })?;
        let field = &self.groups[group_idx].fields[field_idx];

        match kind {
            BlockKind::Options if !field.kind.has_options() => {
                return Err(DocumentError::invalid_directive(
                    head.line,
                    format!("`::options` does not apply to a {} field", field.kind),
                ))
            }
            BlockKind::Options if !field.options.is_empty() => {
                return Err(DocumentError::invalid_directive(
                    head.line,
                    "second ::options block for the same field",
                ))
            }
            BlockKind::Columns if field.kind != FieldKind::Table => {
                return Err(DocumentError::invalid_directive(
                    head.line,
                    format!("`::columns` does not apply to a {} field", field.kind),
                ))
            }
            BlockKind::Columns if !field.columns.is_empty() => {
                return Err(DocumentError::invalid_directive(
                    head.line,
                    "second ::columns block for the same field",
                ))
            }
            BlockKind::Response if self.pending_responses.contains_key(&field.id) => {
                return Err(DocumentError::invalid_directive(
                    head.line,
                    "second ::response block for the same field",
                ))
            }
            _ => {}
        }

        if kind == BlockKind::Response {
            let state = head.require_attr("state")?;
            if !matches!(state, "answered" | "skipped" | "aborted") {
                return Err(DocumentError::invalid_directive(
                    head.line,
                    format!("unknown response state `{}`", state),
                ));
            }
        }

        self.field_has_block = true;
        self.open_block = Some(OpenBlock {
            kind,
            head,
            body: Vec::new(),
        });
        Ok(())
    }

    fn close_block(&mut self, block: OpenBlock) -> CoreResult<()> {
        match block.kind {
            BlockKind::Options => self.attach_options(block),
            BlockKind::Columns => self.attach_columns(block),
            BlockKind::Response => self.record_response(block),
            BlockKind::Note => self.attach_note(block),
        }
    }

    fn attach_options(&mut self, block: OpenBlock) -> CoreResult<()> {
        let (group_idx, field_idx, _) = self.current_field.expect("options outside field");
        let mut options = Vec::new();
        let mut seen = HashSet::new();
        for line in &block.body {
            let trimmed = line.text.trim();
            if trimmed.is_empty() {
                continue;
            }
            let item = trimmed.strip_prefix("- ").ok_or_else(|| {
                DocumentError::invalid_directive(
                    line.number,
                    format!("options are `- id | label` lines, got `{}`", trimmed),
                )
            })?;
            let (id, label) = match item.split_once('|') {
                Some((id, label)) => (id.trim(), label.trim()),
                None => (item.trim(), item.trim()),
            };
            if !seen.insert(id.to_string()) {
                return Err(DocumentError::duplicate_id(id, line.number));
            }
            options.push(ChoiceOption::new(id, label));
        }
        self.groups[group_idx].fields[field_idx].options = options;
        Ok(())
    }

    fn attach_columns(&mut self, block: OpenBlock) -> CoreResult<()> {
        let (group_idx, field_idx, _) = self.current_field.expect("columns outside field");
        let mut columns = Vec::new();
        let mut seen = HashSet::new();
        for line in &block.body {
            let trimmed = line.text.trim();
            if trimmed.is_empty() {
                continue;
            }
            let item = trimmed.strip_prefix("- ").ok_or_else(|| {
                DocumentError::invalid_directive(
                    line.number,
                    format!("columns are `- id | label | kind` lines, got `{}`", trimmed),
                )
            })?;
            let parts: Vec<&str> = item.split('|').map(str::trim).collect();
            if parts.len() < 3 {
                return Err(DocumentError::invalid_directive(
                    line.number,
                    "columns need at least `id | label | kind`",
                ));
            }
            let kind = ColumnKind::parse(parts[2]).ok_or_else(|| {
                DocumentError::invalid_directive(
                    line.number,
                    format!("unknown column kind `{}`", parts[2]),
                )
            })?;
            let required = match parts.get(3) {
                None => false,
                Some(&"required") => true,
                Some(other) => {
                    return Err(DocumentError::invalid_directive(
                        line.number,
                        format!("trailing column flag must be `required`, got `{}`", other),
                    ))
                }
            };
            if !seen.insert(parts[0].to_string()) {
                return Err(DocumentError::duplicate_id(parts[0], line.number));
            }
            columns.push(Column {
                id: parts[0].to_string(),
                label: parts[1].to_string(),
                kind,
                required,
            });
        }
        self.groups[group_idx].fields[field_idx].columns = columns;
        Ok(())
    }

    fn record_response(&mut self, block: OpenBlock) -> CoreResult<()> {
        let (group_idx, field_idx, _) = self.current_field.expect("response outside field");
        let field_id = self.groups[group_idx].fields[field_idx].id.clone();
        self.pending_responses.insert(
            field_id,
            PendingResponse {
                state: block.head.require_attr("state")?.to_string(),
                reason: block.head.attr("reason").map(str::to_string),
                body: block.body,
                line: block.head.line,
            },
        );
        Ok(())
    }

    fn attach_note(&mut self, block: OpenBlock) -> CoreResult<()> {
        let id = block.head.require_attr("id")?.to_string();
        if !self.note_ids.insert(id.clone()) {
            return Err(DocumentError::duplicate_id(id, block.head.line));
        }
        let reference = block.head.require_attr("ref")?.to_string();
        let role = Role::from(block.head.attr("role").unwrap_or("user").to_string());
        let text = block
            .body
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();
        self.notes.push(Note::new(id, role, reference, text));
        Ok(())
    }

    /// Close the span of the field under construction, folding in its prompt
    fn close_field_span(&mut self, byte_end: usize) {
        if let Some((group_idx, field_idx, span_start)) = self.current_field.take() {
            let field = &mut self.groups[group_idx].fields[field_idx];
            field.prompt = self.prompt_lines.join("\n").trim().to_string();
            self.prompt_lines.clear();
            self.field_spans.insert(
                field.id.clone(),
                SourceSpan {
                    start: span_start,
                    end: byte_end,
                },
            );
        }
    }

    fn finish(&mut self, text_len: usize) -> CoreResult<()> {
        if let Some(block) = &self.open_block {
            return Err(DocumentError::invalid_directive(
                block.head.line,
                format!("unterminated ::{} block", block.kind.directive_name()),
            ));
        }
        self.close_field_span(text_len);
        if let Some(group) = self.groups.last_mut() {
            group.description = group.description.trim().to_string();
        }
        Ok(())
    }
}

fn typed_response(field: &Field, pending: PendingResponse) -> CoreResult<FieldResponse> {
    match pending.state.as_str() {
        "answered" => {
            let value = literal::parse_value_literal(field, &pending.body, pending.line)?;
            Ok(FieldResponse::Answered { value })
        }
        state => {
            if let Some(line) = pending.body.iter().find(|l| !l.text.trim().is_empty()) {
                return Err(DocumentError::invalid_directive(
                    line.number,
                    format!("a {} response carries no value literal", state),
                ));
            }
            match state {
                "skipped" => Ok(FieldResponse::Skipped {
                    reason: pending.reason,
                }),
                _ => Ok(FieldResponse::Aborted {
                    reason: pending.reason,
                }),
            }
        }
    }
}
