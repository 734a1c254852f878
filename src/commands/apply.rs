//! `intake apply`

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use intake_core::{
    apply_patches, serialize, ApplyStatus, InspectionReport, Patch, PatchProblem,
    SerializeOptions,
};

use crate::render::{print_structured, report_text, OutputFormat};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Form document to patch
    pub file: PathBuf,

    /// JSON file holding an array of patches
    #[arg(long)]
    pub patches: PathBuf,

    /// Write the updated document back to the file
    #[arg(long)]
    pub write: bool,

    /// Discard original formatting when writing back
    #[arg(long)]
    pub normalize: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Serializable view of an apply run for JSON/YAML output.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApplySummary<'a> {
    status: ApplyStatus,
    problems: &'a [PatchProblem],
    report: &'a InspectionReport,
}

pub fn run(args: &Args) -> Result<i32> {
    let doc = super::load_document(&args.file)?;
    let patches = load_patches(&args.patches)?;

    let outcome = apply_patches(&doc, &patches);

    match args.format {
        OutputFormat::Text => {
            println!("Apply status: {}", outcome.status);
            for problem in &outcome.problems {
                println!("  rejected `{}`: {}", problem.field_id, problem.message);
            }
            println!("{}", report_text(&outcome.report));
        }
        other => print_structured(
            &ApplySummary {
                status: outcome.status,
                problems: &outcome.problems,
                report: &outcome.report,
            },
            other,
        )?,
    }

    if outcome.status == ApplyStatus::Rejected {
        return Ok(1);
    }

    if args.write {
        let text = serialize(
            &outcome.document,
            &SerializeOptions {
                preserve_original_formatting: !args.normalize,
            },
        );
        std::fs::write(&args.file, text)
            .with_context(|| format!("failed to write {}", args.file.display()))?;
    }
    Ok(0)
}

/// Load a patch batch, rejecting anything that is not a JSON array before
/// it reaches the engine.
fn load_patches(path: &PathBuf) -> Result<Vec<Patch>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    if !json.is_array() {
        bail!("{} must hold a JSON array of patches", path.display());
    }
    let patches: Vec<Patch> = serde_json::from_value(json)
        .with_context(|| format!("{} does not match the patch shape", path.display()))?;
    Ok(patches)
}
