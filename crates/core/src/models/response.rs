//! Field Responses
//!
//! The per-field answer state machine. Any state may move to any other state
//! through a patch; there is no forced progression, so an agent can un-skip
//! a field by answering it later.

use serde::Serialize;

use crate::models::value::FieldValue;

/// Current answer state of a single field.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum FieldResponse {
    #[default]
    Unanswered,
    Answered {
        value: FieldValue,
    },
    Skipped {
        reason: Option<String>,
    },
    Aborted {
        reason: Option<String>,
    },
}

impl FieldResponse {
    /// Whether the field has left the unanswered state
    pub fn is_resolved(&self) -> bool {
        !matches!(self, FieldResponse::Unanswered)
    }

    /// The answer value, if answered
    pub fn value(&self) -> Option<&FieldValue> {
        match self {
            FieldResponse::Answered { value } => Some(value),
            _ => None,
        }
    }

    /// State name as written in the document text
    pub fn state_name(&self) -> &'static str {
        match self {
            FieldResponse::Unanswered => "unanswered",
            FieldResponse::Answered { .. } => "answered",
            FieldResponse::Skipped { .. } => "skipped",
            FieldResponse::Aborted { .. } => "aborted",
        }
    }

    /// Skip/abort reason, if present
    pub fn reason(&self) -> Option<&str> {
        match self {
            FieldResponse::Skipped { reason } | FieldResponse::Aborted { reason } => {
                reason.as_deref()
            }
            _ => None,
        }
    }
}
