//! Patch application tests, including the required single-choice scenario.

use intake_core::{
    apply_patches, inspect, parse, ApplyStatus, FormState, InspectOptions, Patch,
    PatchOperation,
};
use serde_json::json;

const CHOICE_FORM: &str = "::group{id=g label=\"G\"}\n\n::field{id=choice kind=single-choice label=\"Choice\" required=true}\n\n::options\n- a | Option A\n- b | Option B\n::end\n";

fn set_value(field: &str, value: serde_json::Value) -> Patch {
    Patch {
        field_id: field.to_string(),
        operation: PatchOperation::SetValue { value },
    }
}

#[test]
fn test_required_single_choice_scenario() {
    let doc = parse(CHOICE_FORM).unwrap();

    // Unanswered: exactly one issue, required severity, priority 2.
    let report = inspect(&doc, &InspectOptions::default());
    assert_eq!(report.form_state, FormState::Incomplete);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].priority, 2);
    assert_eq!(report.issues[0].severity.rank(), 0);
    assert_eq!(report.issues[0].reason.as_str(), "missing-required-value");

    // `c` is not a valid option: the batch is rejected and names it.
    let rejected = apply_patches(&doc, &[set_value("choice", json!("c"))]);
    assert_eq!(rejected.status, ApplyStatus::Rejected);
    assert!(rejected.problems[0].message.contains("`c`"));
    assert_eq!(rejected.document, doc);

    // `a` applies; the form is complete with zero issues.
    let applied = apply_patches(&doc, &[set_value("choice", json!("a"))]);
    assert_eq!(applied.status, ApplyStatus::Applied);
    assert_eq!(applied.report.form_state, FormState::Complete);
    assert!(applied.report.issues.is_empty());
}

#[test]
fn test_batch_atomicity() {
    let text = "::group{id=g}\n\n::field{id=a kind=text required=true}\n\n::field{id=b kind=year required=true}\n";
    let doc = parse(text).unwrap();

    let outcome = apply_patches(
        &doc,
        &[
            set_value("a", json!("fine")),
            set_value("b", json!("not-a-year")),
        ],
    );
    assert_eq!(outcome.status, ApplyStatus::Rejected);
    // No partial mutation leaks through.
    assert_eq!(outcome.document, doc);
    assert!(outcome.document.response("a").value().is_none());

    // Fixing the bad patch applies both.
    let outcome = apply_patches(&doc, &[set_value("a", json!("fine")), set_value("b", json!(1999))]);
    assert_eq!(outcome.status, ApplyStatus::Applied);
    assert_eq!(outcome.report.form_state, FormState::Complete);
}

#[test]
fn test_every_problem_in_batch_is_reported() {
    let doc = parse(CHOICE_FORM).unwrap();
    let outcome = apply_patches(
        &doc,
        &[
            set_value("ghost", json!("x")),
            set_value("choice", json!(3)),
            set_value("choice", json!("zzz")),
        ],
    );
    assert_eq!(outcome.status, ApplyStatus::Rejected);
    assert_eq!(outcome.problems.len(), 3);
}

#[test]
fn test_state_transitions_are_free() {
    let doc = parse(CHOICE_FORM).unwrap();

    let aborted = apply_patches(
        &doc,
        &[Patch {
            field_id: "choice".to_string(),
            operation: PatchOperation::Abort {
                reason: Some("cannot decide".to_string()),
            },
        }],
    );
    assert_eq!(aborted.status, ApplyStatus::Applied);
    assert_eq!(aborted.report.form_state, FormState::Complete);
    assert_eq!(
        aborted.document.response("choice").reason(),
        Some("cannot decide")
    );

    // Aborted fields can be answered later.
    let answered = apply_patches(&aborted.document, &[set_value("choice", json!("b"))]);
    assert_eq!(answered.status, ApplyStatus::Applied);
    assert!(answered.document.response("choice").value().is_some());
}

#[test]
fn test_checkbox_and_date_payloads() {
    let text = "::group{id=g}\n\n::field{id=boxes kind=checkbox-set required=true mode=status}\n\n::options\n- build | Build\n- test | Test\n::end\n\n::field{id=due kind=date}\n";
    let doc = parse(text).unwrap();

    let outcome = apply_patches(
        &doc,
        &[
            set_value("boxes", json!({"build": "done", "test": "pending"})),
            set_value("due", json!("2026-01-15")),
        ],
    );
    assert_eq!(outcome.status, ApplyStatus::Applied);

    let bad_mark = apply_patches(&doc, &[set_value("boxes", json!({"build": true}))]);
    assert_eq!(bad_mark.status, ApplyStatus::Rejected);
    assert!(bad_mark.problems[0].message.contains("status string"));

    let bad_date = apply_patches(&doc, &[set_value("due", json!("soonish"))]);
    assert_eq!(bad_date.status, ApplyStatus::Rejected);
}
