//! Data Models
//!
//! Typed representation of a form: schema, values, responses, notes, issues,
//! and the document aggregate.

pub mod document;
pub mod issue;
pub mod note;
pub mod response;
pub mod schema;
pub mod value;

pub use document::*;
pub use issue::*;
pub use note::*;
pub use response::*;
pub use schema::*;
pub use value::*;
