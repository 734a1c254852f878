//! Patch Application
//!
//! Validates and applies a batch of proposed set-value/skip/abort operations
//! against a document. Structural validation runs over the whole batch
//! first, reporting every problem; one bad patch rejects the entire batch
//! and the input document is returned unchanged. A structurally sound batch
//! always applies, and the re-inspection afterwards decides between
//! `applied` and `partial`.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use tracing::debug;

use crate::inspect::{inspect, InspectOptions, InspectionReport};
use crate::models::document::Document;
use crate::models::response::FieldResponse;
use crate::models::value::FieldValue;

/// A proposed mutation for one field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    pub field_id: String,
    #[serde(flatten)]
    pub operation: PatchOperation,
}

/// What the patch does to the field's response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "kebab-case")]
pub enum PatchOperation {
    SetValue {
        value: JsonValue,
    },
    Skip {
        #[serde(default)]
        reason: Option<String>,
    },
    Abort {
        #[serde(default)]
        reason: Option<String>,
    },
}

/// Batch outcome classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyStatus {
    /// Every answered value on the new document is valid
    Applied,
    /// The batch applied, but some values are semantically invalid
    Partial,
    /// Structural validation failed; the document is unchanged
    Rejected,
}

impl ApplyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplyStatus::Applied => "applied",
            ApplyStatus::Partial => "partial",
            ApplyStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One structural problem found in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchProblem {
    pub field_id: String,
    pub message: String,
}

/// Result of applying a batch.
#[derive(Debug, Clone)]
pub struct PatchOutcome {
    pub status: ApplyStatus,
    /// The new document (or an untouched copy of the input on rejection)
    pub document: Document,
    /// Inspection of the returned document
    pub report: InspectionReport,
    /// Structural problems; non-empty exactly when rejected
    pub problems: Vec<PatchProblem>,
}

/// Apply a patch batch to a document, returning a new document value.
///
/// The input document is never mutated. The last patch for a given field in
/// the batch wins; across separate calls no such arbitration happens.
pub fn apply_patches(doc: &Document, patches: &[Patch]) -> PatchOutcome {
    let mut problems = Vec::new();
    let mut staged: Vec<(String, FieldResponse)> = Vec::new();

    for patch in patches {
        let field = match doc.schema.field(&patch.field_id) {
            Some((_, field)) => field,
            None => {
                problems.push(PatchProblem {
                    field_id: patch.field_id.clone(),
                    message: format!("unknown field `{}`", patch.field_id),
                });
                continue;
            }
        };
        match &patch.operation {
            PatchOperation::SetValue { value } => {
                match FieldValue::from_json(field, value) {
                    Ok(value) => staged.push((field.id.clone(), FieldResponse::Answered { value })),
                    Err(message) => problems.push(PatchProblem {
                        field_id: patch.field_id.clone(),
                        message,
                    }),
                }
            }
            PatchOperation::Skip { reason } => staged.push((
                field.id.clone(),
                FieldResponse::Skipped {
                    reason: reason.clone(),
                },
            )),
            PatchOperation::Abort { reason } => staged.push((
                field.id.clone(),
                FieldResponse::Aborted {
                    reason: reason.clone(),
                },
            )),
        }
    }

    if !problems.is_empty() {
        debug!(problems = problems.len(), "patch batch rejected");
        return PatchOutcome {
            status: ApplyStatus::Rejected,
            document: doc.clone(),
            report: inspect(doc, &InspectOptions::default()),
            problems,
        };
    }

    let mut next = doc.clone();
    for (field_id, response) in staged {
        next.set_response(&field_id, response);
    }

    let report = inspect(&next, &InspectOptions::default());
    let status = if report.progress.invalid > 0 {
        ApplyStatus::Partial
    } else {
        ApplyStatus::Applied
    };
    debug!(%status, patches = patches.len(), "patch batch applied");

    PatchOutcome {
        status,
        document: next,
        report,
        problems: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::FormState;
    use crate::parser::parse;
    use serde_json::json;

    const FORM: &str = "::group{id=g label=\"G\"}\n\n::field{id=choice kind=single-choice label=\"Choice\" required=true}\n\n::options\n- a | Option A\n- b | Option B\n::end\n\n::field{id=notes kind=text role=agent}\n";

    fn set_value(field: &str, value: JsonValue) -> Patch {
        Patch {
            field_id: field.to_string(),
            operation: PatchOperation::SetValue { value },
        }
    }

    #[test]
    fn test_invalid_option_rejects_batch() {
        let doc = parse(FORM).unwrap();
        let outcome = apply_patches(&doc, &[set_value("choice", json!("c"))]);

        assert_eq!(outcome.status, ApplyStatus::Rejected);
        assert_eq!(outcome.problems.len(), 1);
        assert!(outcome.problems[0].message.contains("unknown option `c`"));
        assert_eq!(outcome.document, doc);
    }

    #[test]
    fn test_valid_patch_completes_form() {
        let doc = parse(FORM).unwrap();
        let outcome = apply_patches(&doc, &[set_value("choice", json!("a"))]);

        assert_eq!(outcome.status, ApplyStatus::Applied);
        assert_eq!(outcome.report.form_state, FormState::Complete);
        assert!(outcome.report.issues.iter().all(|i| i.priority > 3));
        // Input document is untouched.
        assert!(doc.response("choice").value().is_none());
    }

    #[test]
    fn test_atomicity_one_bad_patch_rejects_all() {
        let doc = parse(FORM).unwrap();
        let outcome = apply_patches(
            &doc,
            &[
                set_value("choice", json!("a")),
                set_value("ghost", json!("x")),
            ],
        );

        assert_eq!(outcome.status, ApplyStatus::Rejected);
        assert_eq!(outcome.document, doc);
        assert!(outcome.document.response("choice").value().is_none());
        assert!(outcome.problems[0].message.contains("unknown field `ghost`"));
    }

    #[test]
    fn test_all_problems_reported_not_just_first() {
        let doc = parse(FORM).unwrap();
        let outcome = apply_patches(
            &doc,
            &[
                set_value("ghost", json!("x")),
                set_value("choice", json!(42)),
            ],
        );
        assert_eq!(outcome.status, ApplyStatus::Rejected);
        assert_eq!(outcome.problems.len(), 2);
    }

    #[test]
    fn test_last_patch_wins_within_batch() {
        let doc = parse(FORM).unwrap();
        let outcome = apply_patches(
            &doc,
            &[set_value("choice", json!("a")), set_value("choice", json!("b"))],
        );
        assert_eq!(outcome.status, ApplyStatus::Applied);
        assert_eq!(
            outcome.document.response("choice").value(),
            Some(&FieldValue::SingleChoice(Some("b".to_string())))
        );
    }

    #[test]
    fn test_skip_and_unskip() {
        let doc = parse(FORM).unwrap();
        let skipped = apply_patches(
            &doc,
            &[Patch {
                field_id: "choice".to_string(),
                operation: PatchOperation::Skip {
                    reason: Some("later".to_string()),
                },
            }],
        );
        assert_eq!(skipped.status, ApplyStatus::Applied);
        assert_eq!(skipped.report.form_state, FormState::Complete);

        // Any state may move to any other state.
        let answered = apply_patches(&skipped.document, &[set_value("choice", json!("a"))]);
        assert_eq!(answered.status, ApplyStatus::Applied);
        assert!(answered.document.response("choice").value().is_some());
    }

    #[test]
    fn test_partial_when_semantically_invalid() {
        let text = "::group{id=g}\n\n::field{id=pubs kind=table required=true min-rows=1}\n\n::columns\n- title | Title | text | required\n- year | Year | year\n::end\n";
        let doc = parse(text).unwrap();
        // Well-typed row, but the required `title` column is absent.
        let outcome = apply_patches(&doc, &[set_value("pubs", json!([{"year": 2020}]))]);

        assert_eq!(outcome.status, ApplyStatus::Partial);
        assert!(outcome.problems.is_empty());
        assert_eq!(outcome.report.progress.invalid, 1);
        assert!(outcome
            .report
            .issues
            .iter()
            .any(|i| i.message.contains("required column `title` is missing")));
    }

    #[test]
    fn test_patch_json_shape() {
        let batch: Vec<Patch> = serde_json::from_str(
            r#"[
                {"fieldId": "choice", "operation": "set-value", "value": "a"},
                {"fieldId": "notes", "operation": "skip", "reason": "nothing to add"}
            ]"#,
        )
        .unwrap();
        assert_eq!(batch.len(), 2);
        assert!(matches!(batch[0].operation, PatchOperation::SetValue { .. }));
        assert!(matches!(batch[1].operation, PatchOperation::Skip { .. }));
    }
}
