//! Round-trip and serialization tests.

use intake_core::{
    apply_patches, parse, serialize, Patch, PatchOperation, SerializeOptions,
};
use serde_json::json;

const FORM: &str = "---\nrun-mode: collaborative\nmax-turns: 8\nmax-patches-per-turn: 4\n---\n\nCandidate intake for the research track.\n\n::group{id=profile label=\"Profile\" order=1}\nWho is applying.\n\n::field{id=name kind=text label=\"Full name\" required=true role=user}\nYour legal name as it appears on documents.\n\n::response{state=answered}\nJane Doe\n::end\n\n::field{id=website kind=url label=\"Website\" role=user}\n\n::field{id=started kind=year label=\"First year\" role=user}\n\n::response{state=skipped reason=\"does not remember\"}\n::end\n\n::group{id=work label=\"Work\" order=2}\n\n::field{id=langs kind=multi-choice label=\"Languages\" required=true role=agent}\nPick every language that applies.\n\n::options\n- rust | Rust\n- go | Go\n- python | Python\n::end\n\n::response{state=answered}\n- rust\n- python\n::end\n\n::field{id=pubs kind=table label=\"Publications\" role=agent min-rows=1}\n\n::columns\n- title | Title | text | required\n- year | Year | year\n::end\n\n::response{state=answered}\n| Intake at scale | 2023 |\n| Forms as values |  |\n::end\n\n::note{id=n1 role=agent ref=pubs}\nPulled from the public profile.\n::end\n";

#[test]
fn test_round_trip_without_mutation_is_byte_identical() {
    let doc = parse(FORM).unwrap();
    let out = serialize(&doc, &SerializeOptions::default());
    assert_eq!(out, FORM);

    let reparsed = parse(&out).unwrap();
    assert_eq!(doc, reparsed);
}

#[test]
fn test_canonical_round_trip_preserves_model() {
    let doc = parse(FORM).unwrap();
    let canonical = serialize(
        &doc,
        &SerializeOptions {
            preserve_original_formatting: false,
        },
    );
    let reparsed = parse(&canonical).unwrap();
    assert_eq!(doc, reparsed);
    // Notes, skip reasons, and table cells all survive.
    assert_eq!(reparsed.notes.len(), 1);
    assert_eq!(reparsed.response("started").reason(), Some("does not remember"));
}

#[test]
fn test_preserve_after_patch_touches_only_changed_field() {
    let doc = parse(FORM).unwrap();
    let outcome = apply_patches(
        &doc,
        &[Patch {
            field_id: "website".to_string(),
            operation: PatchOperation::SetValue {
                value: json!("https://example.org/jane"),
            },
        }],
    );
    let out = serialize(&outcome.document, &SerializeOptions::default());

    // Unchanged content keeps its original bytes.
    assert!(out.contains("Candidate intake for the research track."));
    assert!(out.contains("::response{state=answered}\nJane Doe\n::end"));
    assert!(out.contains("| Intake at scale | 2023 |"));
    // The patched field is re-emitted with its new value.
    assert!(out.contains("https://example.org/jane"));

    let reparsed = parse(&out).unwrap();
    assert_eq!(reparsed, outcome.document);
}

#[test]
fn test_parse_errors_carry_location() {
    let err = parse("::group{id=g}\n::mystery{id=x}\n").unwrap_err();
    assert_eq!(err.line(), 2);
    assert!(err.to_string().contains("mystery"));

    let err = parse("---\nmax-turns: many\n---\n").unwrap_err();
    assert!(err.to_string().contains("max-turns"));
}
