//! Inspection, issue ordering, and filter pipeline tests.

use intake_core::{
    filter_by_count, filter_by_scope, filter_ready, inspect, parse, FormState, InspectOptions,
    IssueSeverity, Role,
};

const DEPENDENT_FORM: &str = "::group{id=g label=\"G\"}\n\n::field{id=a kind=text label=\"A\" required=true}\n\n::field{id=b kind=text label=\"B\" required=true depends-on=a}\n";

#[test]
fn test_inspect_is_deterministic() {
    let text = "::group{id=g}\n\n::field{id=x kind=text required=true}\n\n::field{id=y kind=number role=agent}\n";
    let doc = parse(text).unwrap();
    let opts = InspectOptions::default();

    let first = inspect(&doc, &opts);
    let second = inspect(&doc, &opts);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_priority_ordering_property() {
    // One invalid required value, one missing required, one missing
    // recommended; priorities must come out ascending with declaration
    // order breaking ties.
    let text = "::group{id=g}\n\n::field{id=opt kind=text}\n\n::field{id=req kind=text required=true}\n\n::field{id=bad kind=single-choice required=true}\n\n::options\n- a | A\n::end\n\n::response{state=answered}\na\n::end\n";
    let mut doc = parse(text).unwrap();
    // Make `bad` invalid by shrinking its option set after the fact.
    doc.schema.groups[0].fields[2].options.clear();

    let report = inspect(&doc, &InspectOptions::default());
    let priorities: Vec<u8> = report.issues.iter().map(|i| i.priority).collect();
    let mut sorted = priorities.clone();
    sorted.sort();
    assert_eq!(priorities, sorted);
    assert_eq!(report.issues[0].reference, "bad");
    assert_eq!(report.issues[0].priority, 1);
    assert_eq!(report.issues[0].severity, IssueSeverity::Required);
}

#[test]
fn test_dependency_scenario_blocked_and_ready_filter() {
    let doc = parse(DEPENDENT_FORM).unwrap();
    let report = inspect(&doc, &InspectOptions::default());

    assert_eq!(report.issues.len(), 2);
    let a = report.issues.iter().find(|i| i.reference == "a").unwrap();
    let b = report.issues.iter().find(|i| i.reference == "b").unwrap();
    assert_eq!(a.priority, 2);
    assert!(a.blocked_by.is_none());
    assert_eq!(b.blocked_by.as_deref(), Some("a"));

    let ready = filter_ready(&report.issues);
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].reference, "a");
}

#[test]
fn test_filter_pipeline_composes_stably() {
    let text = "::group{id=g1 label=\"G1\"}\n\n::field{id=a kind=text required=true role=agent}\n\n::field{id=b kind=text required=true role=agent}\n\n::group{id=g2 label=\"G2\"}\n\n::field{id=c kind=text required=true role=user}\n\n::field{id=d kind=text required=true role=agent}\n";
    let doc = parse(text).unwrap();
    let report = inspect(
        &doc,
        &InspectOptions {
            target_roles: Some(vec![Role::Agent]),
        },
    );
    assert_eq!(report.issues.len(), 3);

    let scoped = filter_by_scope(&report.issues, Some(2), Some(1));
    assert_eq!(scoped.len(), 2);
    assert!(scoped.iter().all(|i| i.group.as_deref() == Some("g1")));

    let capped = filter_by_count(&scoped, 1);
    assert_eq!(capped.len(), 1);
    assert_eq!(capped[0].reference, "a");
}

#[test]
fn test_form_states() {
    // Untouched form with required work: incomplete.
    let doc = parse(DEPENDENT_FORM).unwrap();
    assert_eq!(
        inspect(&doc, &InspectOptions::default()).form_state,
        FormState::Incomplete
    );

    // Untouched form with only optional fields: empty.
    let optional = parse("::group{id=g}\n\n::field{id=a kind=text}\n").unwrap();
    assert_eq!(
        inspect(&optional, &InspectOptions::default()).form_state,
        FormState::Empty
    );

    // Answered optional form: complete.
    let answered = parse(
        "::group{id=g}\n\n::field{id=a kind=text}\n\n::response{state=answered}\nhi\n::end\n",
    )
    .unwrap();
    assert_eq!(
        inspect(&answered, &InspectOptions::default()).form_state,
        FormState::Complete
    );
}
