//! CLI command tests against real files.

use std::fs;

use intake::commands::{apply, export, fmt, inspect, plan};
use intake::render::OutputFormat;

const FORM: &str = "::group{id=g label=\"G\"}\n\n::field{id=choice kind=single-choice label=\"Choice\" required=true}\n\n::options\n- a | Option A\n- b | Option B\n::end\n";

fn write_form(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("form.md");
    fs::write(&path, FORM).unwrap();
    path
}

#[test]
fn test_inspect_command_runs() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_form(&dir);

    let code = inspect::run(&inspect::Args {
        file,
        roles: None,
        ready: true,
        max_fields: None,
        max_groups: None,
        max_issues: Some(5),
        format: OutputFormat::Json,
    })
    .unwrap();
    assert_eq!(code, 0);
}

#[test]
fn test_apply_command_writes_back() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_form(&dir);
    let patches = dir.path().join("patches.json");
    fs::write(
        &patches,
        r#"[{"fieldId": "choice", "operation": "set-value", "value": "a"}]"#,
    )
    .unwrap();

    let code = apply::run(&apply::Args {
        file: file.clone(),
        patches,
        write: true,
        normalize: false,
        format: OutputFormat::Text,
    })
    .unwrap();
    assert_eq!(code, 0);

    let updated = fs::read_to_string(&file).unwrap();
    assert!(updated.contains("::response{state=answered}"));
    assert!(updated.contains("\na\n"));
}

#[test]
fn test_apply_command_rejects_bad_batch() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_form(&dir);
    let patches = dir.path().join("patches.json");
    fs::write(
        &patches,
        r#"[{"fieldId": "choice", "operation": "set-value", "value": "zzz"}]"#,
    )
    .unwrap();

    let code = apply::run(&apply::Args {
        file: file.clone(),
        patches,
        write: true,
        normalize: false,
        format: OutputFormat::Text,
    })
    .unwrap();
    assert_eq!(code, 1);
    // Rejected batches never touch the file.
    assert_eq!(fs::read_to_string(&file).unwrap(), FORM);
}

#[test]
fn test_apply_command_requires_json_array() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_form(&dir);
    let patches = dir.path().join("patches.json");
    fs::write(&patches, r#"{"fieldId": "choice"}"#).unwrap();

    let result = apply::run(&apply::Args {
        file,
        patches,
        write: false,
        normalize: false,
        format: OutputFormat::Text,
    });
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("JSON array"));
}

#[test]
fn test_fmt_and_export_commands() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_form(&dir);

    let code = fmt::run(&fmt::Args {
        file: file.clone(),
        write: true,
    })
    .unwrap();
    assert_eq!(code, 0);

    let out = dir.path().join("schema.json");
    let code = export::run(&export::Args {
        file: file.clone(),
        to: export::Projection::Schema,
        output: Some(out.clone()),
    })
    .unwrap();
    assert_eq!(code, 0);
    let schema: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(
        schema["properties"]["g"]["properties"]["choice"]["x-intake-kind"],
        "single-choice"
    );

    let code = plan::run(&plan::Args {
        file,
        format: OutputFormat::Yaml,
    })
    .unwrap();
    assert_eq!(code, 0);
}
