//! `intake fmt`

use anyhow::{Context, Result};
use std::path::PathBuf;

use intake_core::{serialize, SerializeOptions};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Form document to normalize
    pub file: PathBuf,

    /// Rewrite the file in place instead of printing
    #[arg(long)]
    pub write: bool,
}

pub fn run(args: &Args) -> Result<i32> {
    let doc = super::load_document(&args.file)?;
    let text = serialize(
        &doc,
        &SerializeOptions {
            preserve_original_formatting: false,
        },
    );

    if args.write {
        std::fs::write(&args.file, text)
            .with_context(|| format!("failed to write {}", args.file.display()))?;
    } else {
        print!("{}", text);
    }
    Ok(0)
}
