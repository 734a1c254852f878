//! Notes
//!
//! Free-text annotations carried alongside responses. Notes reference a
//! field or group and never affect validation outcomes.

use serde::Serialize;

use crate::models::schema::Role;

/// A free-text annotation attached to a field or group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    pub id: String,
    /// Who wrote the note
    pub role: Role,
    /// Field or group id the note concerns
    pub reference: String,
    pub text: String,
}

impl Note {
    pub fn new(
        id: impl Into<String>,
        role: Role,
        reference: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            role,
            reference: reference.into(),
            text: text.into(),
        }
    }
}
