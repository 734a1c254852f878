//! `intake plan`

use anyhow::Result;
use std::path::PathBuf;

use intake_core::compute_execution_plan;

use crate::render::{plan_text, print_structured, OutputFormat};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Form document to plan over
    pub file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn run(args: &Args) -> Result<i32> {
    let doc = super::load_document(&args.file)?;
    let plan = compute_execution_plan(&doc);

    match args.format {
        OutputFormat::Text => println!("{}", plan_text(&plan)),
        other => print_structured(&plan, other)?,
    }
    Ok(0)
}
