//! Output Rendering
//!
//! Shared rendering helpers for the CLI: the output format flag and the
//! console-text views of reports and plans. JSON and YAML renderings come
//! straight from the engine's serializable types, so they never drift from
//! engine semantics.

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use intake_core::{ExecutionPlan, InspectionReport, Issue};

/// Output format for machine- or human-readable command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        };
        write!(f, "{}", name)
    }
}

/// Print a serializable value as pretty JSON or YAML.
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        OutputFormat::Text => unreachable!("text output is rendered by the caller"),
    }
    Ok(())
}

/// Console-text view of an inspection report.
pub fn report_text(report: &InspectionReport) -> String {
    let mut out = Vec::new();
    out.push(format!("Form state: {}", report.form_state));
    out.push(format!(
        "Structure:  {} groups, {} fields, {} options",
        report.structure.groups, report.structure.fields, report.structure.options
    ));
    let p = &report.progress;
    out.push(format!(
        "Progress:   {} answered, {} skipped, {} aborted, {} unanswered",
        p.answered, p.skipped, p.aborted, p.unanswered
    ));
    out.push(format!(
        "Values:     {} filled, {} empty, {} valid, {} invalid",
        p.filled, p.empty, p.valid, p.invalid
    ));

    if report.issues.is_empty() {
        out.push("No outstanding issues.".to_string());
    } else {
        out.push(format!("Issues ({}):", report.issues.len()));
        for issue in &report.issues {
            out.push(issue_line(issue));
        }
    }
    out.join("\n")
}

fn issue_line(issue: &Issue) -> String {
    let severity = match issue.severity {
        intake_core::IssueSeverity::Required => "required",
        intake_core::IssueSeverity::Recommended => "recommended",
    };
    let blocked = match &issue.blocked_by {
        Some(dep) => format!(" [blocked by `{}`]", dep),
        None => String::new(),
    };
    format!(
        "  P{} {:<11} {:<24} {}{}",
        issue.priority, severity, issue.reference, issue.message, blocked
    )
}

/// Console-text view of an execution plan.
pub fn plan_text(plan: &ExecutionPlan) -> String {
    if plan.is_empty() {
        return "Nothing left to do.".to_string();
    }

    let mut out = Vec::new();
    out.push(format!(
        "{} fields remaining across {} order levels",
        plan.remaining_field_count(),
        plan.levels.len()
    ));
    for level in &plan.levels {
        out.push(format!("Level {}:", level.order));
        for item in &level.loose_serial {
            out.push(format!(
                "  serial   {} ({}) -> {}",
                item.group,
                item.role,
                item.remaining_fields.join(", ")
            ));
        }
        for batch in &level.parallel_batches {
            out.push(format!("  batch `{}`:", batch.key));
            for item in &batch.items {
                out.push(format!(
                    "    {} ({}) -> {}",
                    item.group,
                    item.role,
                    item.remaining_fields.join(", ")
                ));
            }
        }
    }
    out.join("\n")
}
