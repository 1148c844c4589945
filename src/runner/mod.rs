//! Sequential request execution.
//!
//! The runner drives a parsed [`Document`] through a [`Transport`]: each
//! request is resolved, sent, registered under its `@name` so later requests
//! can reference it, checked against its `@expect`/`@status` assertions, and
//! reported. Requests run strictly one after another; a failure ends only
//! the request it happened in.
//!
//! The HTTP exchange itself sits behind the [`Transport`] trait. Enable the
//! `native` feature for a blocking `reqwest` implementation.

pub mod body;
pub mod error;
pub mod report;
pub mod session;

#[cfg(feature = "native")]
pub mod native;

pub use body::decode_body;
pub use error::{RunError, TransportError};
pub use report::{ReportStatus, RequestReport, RunSummary};
pub use session::Session;

#[cfg(feature = "native")]
pub use native::NativeTransport;

use crate::config::RunnerConfig;
use crate::models::{ResolvedRequest, ResponseRecord};
use crate::parser::parse_document;
use std::collections::HashMap;

/// Performs one HTTP exchange for a fully resolved request.
///
/// Closures with the matching signature are transports too, which keeps test
/// doubles short.
pub trait Transport {
    fn send(&mut self, request: &ResolvedRequest) -> Result<ResponseRecord, TransportError>;
}

impl<F> Transport for F
where
    F: FnMut(&ResolvedRequest) -> Result<ResponseRecord, TransportError>,
{
    fn send(&mut self, request: &ResolvedRequest) -> Result<ResponseRecord, TransportError> {
        self(request)
    }
}

/// Parses `content` and runs every request in it.
///
/// # Examples
///
/// ```
/// use http_script::config::RunnerConfig;
/// use http_script::models::{ResolvedRequest, ResponseRecord};
/// use http_script::runner::{run_document, RunSummary, TransportError};
/// use std::collections::HashMap;
///
/// let content = "# @status 204\nDELETE https://api.example.com/items/1\n";
/// let transport = |_: &ResolvedRequest| -> Result<ResponseRecord, TransportError> {
///     Ok(ResponseRecord::new(204, "No Content"))
/// };
///
/// let reports = run_document(content, HashMap::new(), RunnerConfig::default(), transport).unwrap();
/// assert!(RunSummary::from_reports(&reports).is_success());
/// ```
pub fn run_document<T: Transport>(
    content: &str,
    env: HashMap<String, String>,
    config: RunnerConfig,
    transport: T,
) -> Result<Vec<RequestReport>, RunError> {
    let document = parse_document(content)?;
    let mut session = Session::new(&document, env, config, transport);
    Ok(session.run())
}
