//! Execution planner tests, including the two-role parallel scenario and
//! the monotonic-shrink property.

use intake_core::{apply_patches, compute_execution_plan, parse, Patch, PatchOperation};
use serde_json::json;

fn answer(field: &str, value: serde_json::Value) -> Patch {
    Patch {
        field_id: field.to_string(),
        operation: PatchOperation::SetValue { value },
    }
}

#[test]
fn test_two_roles_same_level_form_two_batches() {
    let text = "::group{id=g label=\"G\"}\n\n::field{id=human kind=text required=true role=user}\n\n::field{id=bot kind=text required=true role=agent}\n";
    let doc = parse(text).unwrap();
    let plan = compute_execution_plan(&doc);

    assert_eq!(plan.levels.len(), 1);
    let level = &plan.levels[0];
    assert!(level.loose_serial.is_empty());
    assert_eq!(level.parallel_batches.len(), 2);
    let keys: Vec<&str> = level
        .parallel_batches
        .iter()
        .map(|b| b.key.as_str())
        .collect();
    assert_eq!(keys, vec!["user", "agent"]);
}

#[test]
fn test_plan_shrinks_monotonically() {
    let text = "::group{id=g1 label=\"G1\" order=1}\n\n::field{id=a kind=text required=true}\n\n::field{id=b kind=text required=true}\n\n::group{id=g2 label=\"G2\" order=2}\n\n::field{id=c kind=text required=true}\n";
    let mut doc = parse(text).unwrap();
    let mut plan = compute_execution_plan(&doc);
    let mut last_count = plan.remaining_field_count();
    assert_eq!(last_count, 3);

    // Answer every field of the first loose-serial item, recompute, and the
    // plan must strictly shrink without reintroducing the item.
    while !plan.is_empty() {
        let first = plan.loose_serial().next().expect("serial item").clone();
        let patches: Vec<Patch> = first
            .remaining_fields
            .iter()
            .map(|f| answer(f, json!("done")))
            .collect();
        doc = apply_patches(&doc, &patches).document;

        plan = compute_execution_plan(&doc);
        let count = plan.remaining_field_count();
        assert!(count < last_count);
        for item in plan.loose_serial() {
            assert!(!(item.group == first.group && item.actor == first.actor
                && item.remaining_fields == first.remaining_fields));
        }
        last_count = count;
    }
    assert_eq!(last_count, 0);
}

#[test]
fn test_dependency_across_levels_stays_parallel_within_level() {
    // `b` depends on `a`, but they sit at different levels, so each level
    // is free of chains.
    let text = "::group{id=g1 label=\"G1\" order=1}\n\n::field{id=a kind=text required=true role=user}\n\n::group{id=g2 label=\"G2\" order=2}\n\n::field{id=b kind=text required=true role=agent depends-on=a}\n";
    let doc = parse(text).unwrap();
    let plan = compute_execution_plan(&doc);

    assert_eq!(plan.levels.len(), 2);
    assert_eq!(plan.levels[0].loose_serial.len(), 1);
    assert_eq!(plan.levels[1].loose_serial.len(), 1);
    assert!(plan.parallel_batches().count() == 0);
}

#[test]
fn test_invalid_answer_keeps_field_in_plan() {
    let text = "::group{id=g}\n\n::field{id=pubs kind=table required=true}\n\n::columns\n- title | Title | text | required\n::end\n";
    let doc = parse(text).unwrap();
    // Well-typed but missing the required column: partial apply.
    let outcome = apply_patches(&doc, &[answer("pubs", json!([{}]))]);
    let plan = compute_execution_plan(&outcome.document);

    assert_eq!(plan.remaining_field_count(), 1);
    assert_eq!(
        plan.loose_serial().next().unwrap().remaining_fields,
        vec!["pubs"]
    );
}

#[test]
fn test_skipped_fields_leave_the_plan() {
    let text = "::group{id=g}\n\n::field{id=a kind=text required=true}\n\n::field{id=b kind=text required=true}\n";
    let doc = parse(text).unwrap();
    let outcome = apply_patches(
        &doc,
        &[Patch {
            field_id: "a".to_string(),
            operation: PatchOperation::Skip { reason: None },
        }],
    );
    let plan = compute_execution_plan(&outcome.document);
    assert_eq!(plan.remaining_field_count(), 1);
}
