//! Error types for placeholder resolution.

use std::fmt;

/// Errors that can occur while resolving `{{placeholders}}`.
///
/// Every error aborts the whole resolution call; there is no partial result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarError {
    /// An identifier was reached again while expanding itself.
    Cycle {
        /// Identifiers in traversal order, ending with the repeated one
        path: Vec<String>,
    },

    /// A global variable's expansion referenced a block-local identifier.
    NotOnGlobalScope(String),

    /// The identifier is not a local, global, environment variable, or
    /// outcome reference.
    UndefinedVariable(String),

    /// `{{$name}}` where `name` is not a built-in function.
    UnknownFunction(String),

    /// A `$randomInt` bound that is not a base-10 integer.
    InvalidInteger(String),

    /// A `$randomInt` lower bound above the upper bound.
    InvalidRange { min: i64, max: i64 },

    /// Malformed built-in arguments.
    InvalidSyntax(String),

    /// A path expression that does not compile.
    InvalidQuery { path: String, message: String },
}

impl fmt::Display for VarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarError::Cycle { path } => {
                write!(f, "variable cycle found: {}", path.join(" -> "))
            }
            VarError::NotOnGlobalScope(id) => {
                write!(f, "variable not found on global scope: {}", id)
            }
            VarError::UndefinedVariable(id) => write!(f, "variable not found: {}", id),
            VarError::UnknownFunction(name) => write!(f, "not implemented: ${}", name),
            VarError::InvalidInteger(value) => {
                write!(f, "\"{}\" is not a integer number", value)
            }
            VarError::InvalidRange { min, max } => {
                write!(f, "min ({}) cannot be greater than max ({})", min, max)
            }
            VarError::InvalidSyntax(msg) => write!(f, "invalid syntax: {}", msg),
            VarError::InvalidQuery { path, message } => {
                write!(f, "invalid path query \"{}\": {}", path, message)
            }
        }
    }
}

impl std::error::Error for VarError {}
