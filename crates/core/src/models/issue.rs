//! Issues
//!
//! Derived statements that a field or group needs attention. Issues are
//! computed by inspection, never stored on the document, and are sorted
//! deterministically: priority first, severity second, declaration order
//! last.

use serde::Serialize;
use std::fmt;

use crate::models::schema::Role;

/// What an issue points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueScope {
    Field,
    Group,
    Form,
}

/// Machine-readable reason code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueReason {
    MissingRequiredValue,
    MissingRecommendedValue,
    InvalidValueForKind,
    UnmetDependency,
    IncompleteValue,
}

impl IssueReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueReason::MissingRequiredValue => "missing-required-value",
            IssueReason::MissingRecommendedValue => "missing-recommended-value",
            IssueReason::InvalidValueForKind => "invalid-value-for-kind",
            IssueReason::UnmetDependency => "unmet-dependency",
            IssueReason::IncompleteValue => "incomplete-value",
        }
    }
}

impl fmt::Display for IssueReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How urgent the attention is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Required,
    Recommended,
}

impl IssueSeverity {
    /// Sort rank; required sorts before recommended
    pub fn rank(&self) -> u8 {
        match self {
            IssueSeverity::Required => 0,
            IssueSeverity::Recommended => 1,
        }
    }
}

/// A single outstanding problem on the form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Field or group id the issue refers to
    pub reference: String,
    /// Owning group id, when the reference is a field
    pub group: Option<String>,
    pub scope: IssueScope,
    pub reason: IssueReason,
    /// Human message
    pub message: String,
    pub severity: IssueSeverity,
    /// 1 = most urgent
    pub priority: u8,
    /// Role expected to resolve the referenced field
    pub role: Option<Role>,
    /// Field id that must be resolved before this issue can be worked
    pub blocked_by: Option<String>,
}

impl Issue {
    /// Whether the issue is workable right now
    pub fn is_ready(&self) -> bool {
        self.blocked_by.is_none()
    }
}
