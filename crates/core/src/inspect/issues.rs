//! Issue Generation
//!
//! Walks the schema in declaration order and emits one issue per field that
//! still needs attention. Priority tiers:
//!
//! 1. invalid value on a required field
//! 2. unanswered (or answered-empty) required field
//! 3. invalid value on an optional field
//! 4. unanswered recommended field
//! 5. recommended field with a present-but-empty value
//!
//! Ties break on severity (required before recommended), then declaration
//! order. The ordering is a correctness property: identical input yields an
//! identical issue list.

use crate::inspect::summary::semantic_violations;
use crate::models::document::Document;
use crate::models::issue::{Issue, IssueReason, IssueScope, IssueSeverity};
use crate::models::response::FieldResponse;

pub(crate) fn generate_issues(doc: &Document) -> Vec<Issue> {
    let mut issues = Vec::new();

    for (group, field) in doc.schema.fields() {
        let response = doc.response(&field.id);
        let severity = if field.required {
            IssueSeverity::Required
        } else {
            IssueSeverity::Recommended
        };
        // A dependency that has not left the unanswered state blocks this
        // field; an unknown dependency id can never resolve, so it blocks too.
        let blocked_by = field
            .depends_on
            .as_ref()
            .filter(|dep| !doc.response(dep).is_resolved())
            .cloned();

        let issue = match response {
            FieldResponse::Answered { value } => {
                let violations = semantic_violations(field, value);
                if !violations.is_empty() {
                    Some((
                        IssueReason::InvalidValueForKind,
                        if field.required { 1 } else { 3 },
                        format!("Value for `{}` is invalid: {}", field.id, violations[0]),
                        None,
                    ))
                } else if value.is_empty() {
                    if field.required {
                        Some((
                            IssueReason::MissingRequiredValue,
                            2,
                            format!("Required field `{}` has an empty value", field.id),
                            blocked_by,
                        ))
                    } else {
                        Some((
                            IssueReason::IncompleteValue,
                            5,
                            format!("Field `{}` has an empty value", field.id),
                            None,
                        ))
                    }
                } else {
                    None
                }
            }
            FieldResponse::Unanswered => {
                let priority = if field.required { 2 } else { 4 };
                match &blocked_by {
                    Some(dep) => Some((
                        IssueReason::UnmetDependency,
                        priority,
                        format!("Field `{}` is waiting on `{}`", field.id, dep),
                        blocked_by.clone(),
                    )),
                    None if field.required => Some((
                        IssueReason::MissingRequiredValue,
                        priority,
                        format!("Required field `{}` is unanswered", field.id),
                        None,
                    )),
                    None => Some((
                        IssueReason::MissingRecommendedValue,
                        priority,
                        format!("Recommended field `{}` is unanswered", field.id),
                        None,
                    )),
                }
            }
            FieldResponse::Skipped { .. } | FieldResponse::Aborted { .. } => None,
        };

        if let Some((reason, priority, message, blocked_by)) = issue {
            issues.push(Issue {
                reference: field.id.clone(),
                group: Some(group.id.clone()),
                scope: IssueScope::Field,
                reason,
                message,
                severity,
                priority,
                role: Some(field.role.clone()),
                blocked_by,
            });
        }
    }

    // Declaration order is the generation order, so a stable sort on
    // (priority, severity) completes the documented ordering.
    issues.sort_by_key(|issue| (issue.priority, issue.severity.rank()));
    issues
}
