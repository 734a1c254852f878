//! Core Error Types
//!
//! Parse-time error types for the form engine. These are dependency-free
//! (only thiserror + std) to keep the core crate lightweight.
//!
//! Document errors are fatal to the parse call that raised them and always
//! carry enough context (line number, id) to render a precise message.
//! Validation findings are not errors; they travel as `Issue` data.

use thiserror::Error;

/// Fatal errors raised while parsing a form document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The frontmatter block is unterminated or carries a bad scalar
    #[error("Malformed frontmatter at line {line}: {message}")]
    MalformedFrontmatter { line: usize, message: String },

    /// A field, group, option, or column id appears twice
    #[error("Duplicate id `{id}` at line {line}")]
    DuplicateId { id: String, line: usize },

    /// A directive name outside the recognized set
    #[error("Unknown directive `{name}` at line {line}")]
    UnknownDirective { name: String, line: usize },

    /// A recognized directive with bad attributes or in an illegal position
    #[error("Invalid directive at line {line}: {message}")]
    InvalidDirective { line: usize, message: String },

    /// A value literal that does not parse as the field's declared kind
    #[error("Value for field `{field}` at line {line} is not a valid {kind}: {message}")]
    TypeMismatch {
        field: String,
        kind: String,
        line: usize,
        message: String,
    },
}

/// Result type alias for document errors
pub type CoreResult<T> = Result<T, DocumentError>;

impl DocumentError {
    /// Create a malformed-frontmatter error
    pub fn frontmatter(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedFrontmatter {
            line,
            message: message.into(),
        }
    }

    /// Create a duplicate-id error
    pub fn duplicate_id(id: impl Into<String>, line: usize) -> Self {
        Self::DuplicateId {
            id: id.into(),
            line,
        }
    }

    /// Create an unknown-directive error
    pub fn unknown_directive(name: impl Into<String>, line: usize) -> Self {
        Self::UnknownDirective {
            name: name.into(),
            line,
        }
    }

    /// Create an invalid-directive error
    pub fn invalid_directive(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidDirective {
            line,
            message: message.into(),
        }
    }

    /// Create a type-mismatch error for a field's value literal
    pub fn type_mismatch(
        field: impl Into<String>,
        kind: impl Into<String>,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            kind: kind.into(),
            line,
            message: message.into(),
        }
    }

    /// Line the error points at (1-based)
    pub fn line(&self) -> usize {
        match self {
            Self::MalformedFrontmatter { line, .. }
            | Self::DuplicateId { line, .. }
            | Self::UnknownDirective { line, .. }
            | Self::InvalidDirective { line, .. }
            | Self::TypeMismatch { line, .. } => *line,
        }
    }
}
