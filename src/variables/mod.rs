//! Placeholder resolution for `.http` documents.
//!
//! [`substitution`] expands `{{placeholders}}` against a layered
//! [`ResolutionScope`], [`system`] evaluates the `$`-prefixed built-in
//! functions, and [`query`] runs path expressions over outcome data.

pub mod error;
pub mod query;
pub mod substitution;
pub mod system;

pub use error::VarError;
pub use query::{paths, query, query_collapsed, redact, REDACTED};
pub use substitution::{resolve, ResolutionScope};
pub use system::{evaluate, BuiltinFunction};
