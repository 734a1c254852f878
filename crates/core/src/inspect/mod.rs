//! Inspection Engine
//!
//! Read-only walk over a document producing structure/progress summaries,
//! the overall form state, and a sorted, filterable issue list. `inspect` is
//! a pure function of its input: calling it twice on the same document
//! yields identical output, which patch application and the planner both
//! rely on.

mod filter;
mod issues;
mod summary;

pub use filter::{filter_by_count, filter_by_roles, filter_by_scope, filter_ready};
pub use summary::{FormState, ProgressSummary, StructureSummary};

pub(crate) use summary::semantic_violations;

use serde::Serialize;
use tracing::debug;

use crate::models::document::Document;
use crate::models::issue::Issue;
use crate::models::response::FieldResponse;
use crate::models::schema::Role;

/// Options for an inspection run.
#[derive(Debug, Clone, Default)]
pub struct InspectOptions {
    /// Restrict emitted issues to fields owned by these roles.
    /// `None`, an empty set, or a `*` entry means no role filtering.
    pub target_roles: Option<Vec<Role>>,
}

/// The full result of inspecting a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionReport {
    pub structure: StructureSummary,
    pub progress: ProgressSummary,
    pub form_state: FormState,
    pub issues: Vec<Issue>,
}

/// Inspect a document: summaries, form state, and outstanding issues.
pub fn inspect(doc: &Document, opts: &InspectOptions) -> InspectionReport {
    let structure = StructureSummary {
        groups: doc.schema.groups.len(),
        fields: doc.schema.field_count(),
        options: doc.schema.option_count(),
    };

    let mut progress = ProgressSummary::default();
    let mut required_outstanding = 0usize;
    for (_, field) in doc.schema.fields() {
        let response = doc.response(&field.id);
        let mut filled = false;
        match response {
            FieldResponse::Unanswered => progress.unanswered += 1,
            FieldResponse::Skipped { .. } => progress.skipped += 1,
            FieldResponse::Aborted { .. } => progress.aborted += 1,
            FieldResponse::Answered { value } => {
                progress.answered += 1;
                filled = !value.is_empty();
                if summary::semantic_violations(field, value).is_empty() {
                    progress.valid += 1;
                } else {
                    progress.invalid += 1;
                }
            }
        }
        if filled {
            progress.filled += 1;
        } else {
            progress.empty += 1;
        }
        let resolved_for_completion = match response {
            FieldResponse::Answered { value } => !value.is_empty(),
            FieldResponse::Skipped { .. } | FieldResponse::Aborted { .. } => true,
            FieldResponse::Unanswered => false,
        };
        if field.required && !resolved_for_completion {
            required_outstanding += 1;
        }
    }

    // An untouched form with outstanding required work reads incomplete, not
    // empty: empty is reserved for forms with nothing to do and nothing done.
    let no_responses = progress.answered + progress.skipped + progress.aborted == 0;
    let form_state = if progress.invalid > 0 {
        FormState::Invalid
    } else if required_outstanding > 0 {
        FormState::Incomplete
    } else if no_responses {
        FormState::Empty
    } else {
        FormState::Complete
    };

    let mut issues = issues::generate_issues(doc);
    if let Some(roles) = &opts.target_roles {
        issues = filter_by_roles(&issues, roles);
    }

    debug!(
        form_state = %form_state,
        issues = issues.len(),
        invalid = progress.invalid,
        "inspected document"
    );

    InspectionReport {
        structure,
        progress,
        form_state,
        issues,
    }
}
