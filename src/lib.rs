//! Intake CLI
//!
//! Command implementations and rendering for the `intake` binary. All form
//! semantics live in `intake-core`; this crate only reads files, calls the
//! engine, and renders results to console text, JSON, or YAML.

pub mod commands;
pub mod render;
