//! CLI Commands
//!
//! One module per subcommand. Each exposes a clap `Args` struct and a
//! `run(&Args) -> Result<i32>` returning the process exit code: 0 on
//! success (including partial applies), 1 on document or patch errors.

pub mod apply;
pub mod export;
pub mod fmt;
pub mod inspect;
pub mod plan;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

use intake_core::{parse, Document, Role};

/// Read and parse a form document from disk
pub(crate) fn load_document(path: &Path) -> Result<Document> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let doc = parse(&text).with_context(|| format!("failed to parse {}", path.display()))?;
    debug!(path = %path.display(), fields = doc.schema.field_count(), "loaded form");
    Ok(doc)
}

/// Parse a `--roles user,agent` value into roles; `*` keeps everything
pub(crate) fn parse_roles(raw: &str) -> Vec<Role> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Role::from(s.to_string()))
        .collect()
}
