//! Document Aggregate
//!
//! The form document as a value: schema, per-field responses, notes, and
//! metadata, plus a positional source record for formatting-preserving
//! re-serialization. Only the patch engine mutates responses; inspection and
//! planning are read-only and never touch the source record.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::models::note::Note;
use crate::models::response::FieldResponse;
use crate::models::schema::Schema;

/// Declared run mode from frontmatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Collaborative,
    Autonomous,
    Review,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Collaborative => "collaborative",
            RunMode::Autonomous => "autonomous",
            RunMode::Review => "review",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "collaborative" => Some(RunMode::Collaborative),
            "autonomous" => Some(RunMode::Autonomous),
            "review" => Some(RunMode::Review),
            _ => None,
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Harness limits declared in frontmatter; enforced by the driving loop, not
/// by the engine itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarnessLimits {
    pub max_turns: Option<u32>,
    pub max_patches_per_turn: Option<u32>,
    pub max_issues_per_turn: Option<u32>,
}

/// Document metadata from the frontmatter block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    pub run_mode: RunMode,
    pub limits: HarnessLimits,
    /// Unknown frontmatter keys, preserved in declaration order
    #[serde(default)]
    pub extra: Vec<(String, String)>,
}

impl DocumentMeta {
    /// Whether any metadata would need a frontmatter block to express
    pub fn is_default(&self) -> bool {
        self.run_mode == RunMode::default()
            && self.limits == HarnessLimits::default()
            && self.extra.is_empty()
    }
}

/// Half-open byte range into the original document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

/// Positional record kept from parse time, consumed only by the serializer
/// when original formatting is to be preserved.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    /// The original text, byte for byte
    pub raw: String,
    /// Span of each field block (directive through its last body line)
    pub field_spans: HashMap<String, SourceSpan>,
}

/// The form document aggregate.
///
/// A `Document` is a value: `apply_patches` returns a new one rather than
/// mutating in place. Equality covers schema, responses, notes, and
/// metadata; the source record is formatting bookkeeping and excluded.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub meta: DocumentMeta,
    /// Free prose between the frontmatter and the first group directive
    pub preamble: String,
    pub schema: Schema,
    pub responses: HashMap<String, FieldResponse>,
    pub notes: Vec<Note>,
    pub(crate) source: Option<SourceMap>,
    /// Fields whose response changed since parse; re-emitted canonically
    pub(crate) dirty: HashSet<String>,
}

impl Document {
    /// Build a document from a schema with all fields unanswered
    pub fn new(schema: Schema, meta: DocumentMeta) -> Self {
        Self {
            meta,
            preamble: String::new(),
            schema,
            responses: HashMap::new(),
            notes: Vec::new(),
            source: None,
            dirty: HashSet::new(),
        }
    }

    /// Response for a field, defaulting to unanswered
    pub fn response(&self, field_id: &str) -> &FieldResponse {
        static UNANSWERED: FieldResponse = FieldResponse::Unanswered;
        self.responses.get(field_id).unwrap_or(&UNANSWERED)
    }

    /// Record a response and mark the field for canonical re-emission.
    /// Crate-internal: callers go through the patch engine.
    pub(crate) fn set_response(&mut self, field_id: &str, response: FieldResponse) {
        self.responses.insert(field_id.to_string(), response);
        self.dirty.insert(field_id.to_string());
    }

    /// Notes referencing a given field or group id
    pub fn notes_for<'a>(&'a self, reference: &'a str) -> impl Iterator<Item = &'a Note> + 'a {
        self.notes.iter().filter(move |n| n.reference == reference)
    }

    pub(crate) fn source(&self) -> Option<&SourceMap> {
        self.source.as_ref()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.meta == other.meta
            && self.preamble == other.preamble
            && self.schema == other.schema
            && self.notes == other.notes
            && self.schema
                .fields()
                .all(|(_, f)| self.response(&f.id) == other.response(&f.id))
    }
}
