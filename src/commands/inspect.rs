//! `intake inspect`

use anyhow::Result;
use std::path::PathBuf;

use intake_core::{
    filter_by_count, filter_by_scope, filter_ready, inspect, InspectOptions,
};

use crate::render::{print_structured, report_text, OutputFormat};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Form document to inspect
    pub file: PathBuf,

    /// Comma-separated roles to report on (`*` for all)
    #[arg(long)]
    pub roles: Option<String>,

    /// Only issues that are workable now (no unresolved dependency)
    #[arg(long)]
    pub ready: bool,

    /// Cap the number of distinct fields touched
    #[arg(long)]
    pub max_fields: Option<usize>,

    /// Cap the number of distinct groups touched
    #[arg(long)]
    pub max_groups: Option<usize>,

    /// Hard cap on issues returned
    #[arg(long)]
    pub max_issues: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn run(args: &Args) -> Result<i32> {
    let doc = super::load_document(&args.file)?;

    let opts = InspectOptions {
        target_roles: args.roles.as_deref().map(super::parse_roles),
    };
    let mut report = inspect(&doc, &opts);

    // Filter stages compose after role filtering, in a fixed order.
    if args.ready {
        report.issues = filter_ready(&report.issues);
    }
    if args.max_fields.is_some() || args.max_groups.is_some() {
        report.issues = filter_by_scope(&report.issues, args.max_fields, args.max_groups);
    }
    if let Some(max) = args.max_issues {
        report.issues = filter_by_count(&report.issues, max);
    }

    match args.format {
        OutputFormat::Text => println!("{}", report_text(&report)),
        other => print_structured(&report, other)?,
    }
    Ok(0)
}
