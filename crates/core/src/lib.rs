//! Intake Core
//!
//! The form engine for the Intake workspace: a typed document model, the
//! directive-format parser/serializer, the inspection/validation engine, the
//! patch application engine, and the execution planner. This crate has zero
//! dependencies on application-level code (CLI, terminal rendering, file
//! I/O).
//!
//! ## Module Organization
//!
//! - `error` - Parse-time error types (`DocumentError`, `CoreResult`)
//! - `models` - Schema, values, responses, notes, issues, and the `Document` aggregate
//! - `parser` - Two-pass parser for the directive-annotated text format
//! - `serializer` - Canonical and formatting-preserving rendering back to text
//! - `export` - Read-only projections (markdown, JSON-Schema shape, values)
//! - `inspect` - Summaries, form state, issue generation, and filter stages
//! - `patch` - Atomic batch application of proposed answers
//! - `plan` - Order levels, loose-serial items, and parallel batches
//!
//! ## Design Principles
//!
//! 1. **The document is a value** - `apply_patches` returns a new `Document`;
//!    nothing mutates in place and nothing blocks
//! 2. **Exhaustive kind matching** - every consumer matches the closed
//!    `FieldKind`/`FieldValue` sums, so an unhandled kind cannot compile
//! 3. **Deterministic output** - inspection and planning are pure functions;
//!    identical input produces identical output

pub mod error;
pub mod export;
pub mod inspect;
pub mod models;
pub mod parser;
pub mod patch;
pub mod plan;
pub mod serializer;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreResult, DocumentError};

// ── Document Model ─────────────────────────────────────────────────────
pub use models::{
    CheckboxEntry, CheckboxMark, CheckboxMode, ChoiceOption, Column, ColumnKind, Document,
    DocumentMeta, Field, FieldKind, FieldResponse, FieldValue, Group, HarnessLimits, Issue,
    IssueReason, IssueScope, IssueSeverity, Note, Role, RunMode, Schema, TableCell, TableRow,
};

// ── Parser & Serializer ────────────────────────────────────────────────
pub use parser::parse;
pub use serializer::{serialize, SerializeOptions};

// ── Projections ────────────────────────────────────────────────────────
pub use export::{to_markdown, to_schema_json, to_values_json};

// ── Inspection ─────────────────────────────────────────────────────────
pub use inspect::{
    filter_by_count, filter_by_roles, filter_by_scope, filter_ready, inspect, FormState,
    InspectOptions, InspectionReport, ProgressSummary, StructureSummary,
};

// ── Patch Application ──────────────────────────────────────────────────
pub use patch::{apply_patches, ApplyStatus, Patch, PatchOperation, PatchOutcome, PatchProblem};

// ── Execution Planning ─────────────────────────────────────────────────
pub use plan::{compute_execution_plan, ExecutionPlan, PlanBatch, PlanItem, PlanLevel};
