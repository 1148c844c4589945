//! Error types for `.http` document parsing.
//!
//! Every variant carries the 1-based line number of the offending line so the
//! message can point the user at the exact place to fix.

use std::fmt;

/// Errors that can occur while parsing a `.http` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A method + URL line was required but something else was found.
    ExpectedRequestLine {
        /// The offending line, trimmed
        found: String,
        /// Line number in the source document (1-based)
        line: usize,
    },

    /// A second `@name` directive inside the same block.
    DuplicateName {
        /// Line number following the second directive (1-based)
        line: usize,
    },

    /// The body was declared as JSON but does not decode.
    InvalidJsonBody {
        /// Decoder message
        message: String,
        /// Line number where the body starts (1-based)
        line: usize,
    },

    /// A directive whose value does not fit its grammar, such as
    /// `@status abc` or `@ignoreHeaders (`.
    InvalidDirective {
        /// Directive name without the `@`
        directive: String,
        /// What was wrong with the value
        message: String,
        /// Line number of the comment (1-based)
        line: usize,
    },
}

impl ParseError {
    /// Returns the line number associated with this error.
    pub fn line(&self) -> usize {
        match self {
            ParseError::ExpectedRequestLine { line, .. } => *line,
            ParseError::DuplicateName { line } => *line,
            ParseError::InvalidJsonBody { line, .. } => *line,
            ParseError::InvalidDirective { line, .. } => *line,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::ExpectedRequestLine { found, line } => {
                write!(
                    f,
                    "(line: {}) method + url expected but found: {}",
                    line, found
                )
            }
            ParseError::DuplicateName { line } => {
                write!(
                    f,
                    "(line: {}) only a single \"name\" request variable is allowed per request",
                    line
                )
            }
            ParseError::InvalidJsonBody { message, line } => {
                write!(f, "(line: {}) invalid JSON body: {}", line, message)
            }
            ParseError::InvalidDirective {
                directive,
                message,
                line,
            } => {
                write!(
                    f,
                    "(line: {}) invalid @{} directive: {}",
                    line, directive, message
                )
            }
        }
    }
}

impl std::error::Error for ParseError {}
