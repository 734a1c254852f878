//! Issue Filters
//!
//! A pipeline of pure, stable filter stages over an ordered issue list.
//! Each stage takes and returns an ordered sequence, so stages compose in
//! any order and the result is deterministic for a given input.

use std::collections::HashSet;

use crate::models::issue::Issue;
use crate::models::schema::Role;

/// Keep only issues that are workable now (no unresolved dependency).
pub fn filter_ready(issues: &[Issue]) -> Vec<Issue> {
    issues.iter().filter(|i| i.is_ready()).cloned().collect()
}

/// Keep only issues whose field role is in `roles`.
///
/// An empty set or a `*` wildcard entry disables the filter; issues without
/// a role (form-scoped) always pass.
pub fn filter_by_roles(issues: &[Issue], roles: &[Role]) -> Vec<Issue> {
    if roles.is_empty() || roles.iter().any(Role::is_wildcard) {
        return issues.to_vec();
    }
    issues
        .iter()
        .filter(|issue| match &issue.role {
            Some(role) => roles.contains(role),
            None => true,
        })
        .cloned()
        .collect()
}

/// Cap the number of distinct fields and/or distinct groups touched.
///
/// Used to carve a small batch of work for one actor: once the cap is hit,
/// further issues on new fields/groups are dropped, while additional issues
/// on already-admitted fields still pass.
pub fn filter_by_scope(
    issues: &[Issue],
    max_fields: Option<usize>,
    max_groups: Option<usize>,
) -> Vec<Issue> {
    let mut seen_fields: HashSet<&str> = HashSet::new();
    let mut seen_groups: HashSet<&str> = HashSet::new();
    let mut kept = Vec::new();

    for issue in issues {
        let field_new = !seen_fields.contains(issue.reference.as_str());
        if field_new {
            if let Some(max) = max_fields {
                if seen_fields.len() >= max {
                    continue;
                }
            }
        }
        let group_new = issue
            .group
            .as_deref()
            .map(|g| !seen_groups.contains(g))
            .unwrap_or(false);
        if group_new {
            if let Some(max) = max_groups {
                if seen_groups.len() >= max {
                    continue;
                }
            }
        }

        seen_fields.insert(issue.reference.as_str());
        if let Some(group) = issue.group.as_deref() {
            seen_groups.insert(group);
        }
        kept.push(issue.clone());
    }

    kept
}

/// Hard cap on the number of issues returned.
pub fn filter_by_count(issues: &[Issue], max: usize) -> Vec<Issue> {
    issues.iter().take(max).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::issue::{IssueReason, IssueScope, IssueSeverity};

    fn issue(reference: &str, group: &str, role: Role, blocked_by: Option<&str>) -> Issue {
        Issue {
            reference: reference.to_string(),
            group: Some(group.to_string()),
            scope: IssueScope::Field,
            reason: IssueReason::MissingRequiredValue,
            message: format!("`{}` needs attention", reference),
            severity: IssueSeverity::Required,
            priority: 2,
            role: Some(role),
            blocked_by: blocked_by.map(str::to_string),
        }
    }

    #[test]
    fn test_filter_ready_drops_blocked() {
        let issues = vec![
            issue("a", "g", Role::User, None),
            issue("b", "g", Role::User, Some("a")),
        ];
        let ready = filter_ready(&issues);
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].reference, "a");
    }

    #[test]
    fn test_filter_by_roles_with_wildcard() {
        let issues = vec![
            issue("a", "g", Role::User, None),
            issue("b", "g", Role::Agent, None),
        ];
        let agents = filter_by_roles(&issues, &[Role::Agent]);
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].reference, "b");

        let all = filter_by_roles(&issues, &[Role::Other("*".to_string())]);
        assert_eq!(all.len(), 2);
        assert_eq!(filter_by_roles(&issues, &[]).len(), 2);
    }

    #[test]
    fn test_filter_by_scope_caps_distinct_fields() {
        let issues = vec![
            issue("a", "g1", Role::User, None),
            issue("a", "g1", Role::User, None),
            issue("b", "g1", Role::User, None),
            issue("c", "g2", Role::User, None),
        ];
        let capped = filter_by_scope(&issues, Some(2), None);
        assert_eq!(capped.len(), 3);
        assert!(capped.iter().all(|i| i.reference != "c"));

        let one_group = filter_by_scope(&issues, None, Some(1));
        assert!(one_group.iter().all(|i| i.group.as_deref() == Some("g1")));
    }

    #[test]
    fn test_filter_by_count_is_prefix() {
        let issues = vec![
            issue("a", "g", Role::User, None),
            issue("b", "g", Role::User, None),
            issue("c", "g", Role::User, None),
        ];
        let two = filter_by_count(&issues, 2);
        assert_eq!(two.len(), 2);
        assert_eq!(two[0].reference, "a");
        assert_eq!(two[1].reference, "b");
    }

    #[test]
    fn test_stages_compose() {
        let issues = vec![
            issue("a", "g", Role::User, None),
            issue("b", "g", Role::Agent, Some("a")),
            issue("c", "g", Role::Agent, None),
        ];
        let piped = filter_by_count(&filter_by_roles(&filter_ready(&issues), &[Role::Agent]), 5);
        assert_eq!(piped.len(), 1);
        assert_eq!(piped[0].reference, "c");
    }
}
