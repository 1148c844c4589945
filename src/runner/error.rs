//! Execution error types.

use crate::parser::error::ParseError;
use crate::variables::VarError;
use serde_json::Value;
use std::fmt;

/// Errors reported by a [`Transport`](super::Transport).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection failures, DNS errors, and other network-level issues.
    NetworkError(String),

    /// The request did not complete within the configured timeout.
    Timeout,

    /// The request could not be built from the resolved data.
    BuildError(String),

    /// The response body did not match its declared content type.
    DecodeError(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            TransportError::Timeout => write!(f, "Request timed out"),
            TransportError::BuildError(msg) => write!(f, "Request build error: {}", msg),
            TransportError::DecodeError(msg) => write!(f, "Response decode error: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

#[cfg(feature = "native")]
impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_builder() {
            TransportError::BuildError(err.to_string())
        } else if err.is_decode() {
            TransportError::DecodeError(err.to_string())
        } else {
            TransportError::NetworkError(err.to_string())
        }
    }
}

/// Why a single request did not pass.
#[derive(Debug, Clone, PartialEq)]
pub enum RunError {
    /// The document could not be parsed.
    Parse(ParseError),

    /// A placeholder in the URL, a header, or the body failed to resolve,
    /// or an assertion path did not compile.
    Resolve(VarError),

    /// The resolved URL is not absolute or not well-formed.
    InvalidUrl { url: String, message: String },

    /// The transport failed to complete the exchange.
    Transport(TransportError),

    /// A directive pattern failed to compile.
    InvalidPattern { directive: String, message: String },

    /// The outcome could not be converted to JSON.
    Serialize(String),

    /// An `@expect` or `@status` assertion did not hold.
    Assertion {
        path: String,
        expected: Value,
        actual: Value,
    },

    /// A `@throws` request completed without error.
    UnexpectedSuccess { pattern: Option<String> },

    /// A `@throws` request failed, but not with a matching message.
    UnexpectedFailure { pattern: String, message: String },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Parse(err) => write!(f, "{}", err),
            RunError::Resolve(err) => write!(f, "{}", err),
            RunError::InvalidUrl { url, message } => {
                write!(f, "Invalid URL \"{}\": {}", url, message)
            }
            RunError::Transport(err) => write!(f, "{}", err),
            RunError::InvalidPattern { directive, message } => {
                write!(f, "invalid @{} pattern: {}", directive, message)
            }
            RunError::Serialize(msg) => write!(f, "Failed to serialize outcome: {}", msg),
            RunError::Assertion {
                path,
                expected,
                actual,
            } => write!(
                f,
                "expected {} to equal {} but found {}",
                path, expected, actual
            ),
            RunError::UnexpectedSuccess { pattern: None } => {
                write!(f, "expected the request to fail")
            }
            RunError::UnexpectedSuccess {
                pattern: Some(pattern),
            } => write!(f, "expected the request to fail matching /{}/", pattern),
            RunError::UnexpectedFailure { pattern, message } => write!(
                f,
                "expected a failure matching /{}/ but got: {}",
                pattern, message
            ),
        }
    }
}

impl std::error::Error for RunError {}

impl From<ParseError> for RunError {
    fn from(err: ParseError) -> Self {
        RunError::Parse(err)
    }
}

impl From<VarError> for RunError {
    fn from(err: VarError) -> Self {
        RunError::Resolve(err)
    }
}

impl From<TransportError> for RunError {
    fn from(err: TransportError) -> Self {
        RunError::Transport(err)
    }
}

impl From<serde_json::Error> for RunError {
    fn from(err: serde_json::Error) -> Self {
        RunError::Serialize(err.to_string())
    }
}
