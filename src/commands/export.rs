//! `intake export`

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::PathBuf;

use intake_core::{to_markdown, to_schema_json, to_values_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Projection {
    /// Narrative markdown rendering
    Markdown,
    /// JSON-Schema-shaped structural description
    Schema,
    /// Current responses as plain JSON
    Values,
}

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Form document to export
    pub file: PathBuf,

    /// Which projection to produce
    #[arg(long, value_enum)]
    pub to: Projection,

    /// Write to a file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &Args) -> Result<i32> {
    let doc = super::load_document(&args.file)?;

    let rendered = match args.to {
        Projection::Markdown => to_markdown(&doc),
        Projection::Schema => serde_json::to_string_pretty(&to_schema_json(&doc))? + "\n",
        Projection::Values => serde_json::to_string_pretty(&to_values_json(&doc))? + "\n",
    };

    match &args.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{}", rendered),
    }
    Ok(0)
}
