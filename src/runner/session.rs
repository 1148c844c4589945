//! Sequential execution of a parsed document.

use super::error::RunError;
use super::report::{ReportStatus, RequestReport};
use super::Transport;
use crate::config::RunnerConfig;
use crate::models::{Document, Header, Outcome, OutcomeTable, Request, ResolvedRequest, Throws, VariableSet};
use crate::variables::{query_collapsed, redact, ResolutionScope, VarError, REDACTED};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use url::Url;

/// Runs the requests of one document in order, one at a time.
///
/// Globals are hoisted once when the session is created. Each request is
/// resolved against its own block's variables plus every outcome registered
/// so far, so a request can only reference requests that ran before it.
pub struct Session<'d, T> {
    document: &'d Document,
    env: HashMap<String, String>,
    globals: VariableSet,
    outcomes: OutcomeTable,
    config: RunnerConfig,
    transport: T,
}

impl<'d, T: Transport> Session<'d, T> {
    /// Creates a session over `document`. `env` is the flattened environment
    /// of the selected environment name.
    pub fn new(
        document: &'d Document,
        env: HashMap<String, String>,
        config: RunnerConfig,
        transport: T,
    ) -> Self {
        let globals = document.global_variables();
        log::debug!(
            "session over {} request(s), {} global(s), {} environment variable(s)",
            document.requests().count(),
            globals.len(),
            env.len()
        );

        Self {
            document,
            env,
            globals,
            outcomes: OutcomeTable::new(),
            config,
            transport,
        }
    }

    pub fn outcomes(&self) -> &OutcomeTable {
        &self.outcomes
    }

    pub fn globals(&self) -> &VariableSet {
        &self.globals
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Consumes the session, handing back its transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// The scope placeholders of `request` resolve against right now.
    pub fn scope<'s>(&'s self, request: &'s Request) -> ResolutionScope<'s> {
        ResolutionScope::new(&self.env, &self.globals, &request.variables, &self.outcomes)
    }

    /// Expands `text` in the scope of `request`.
    pub fn resolve(&self, request: &Request, text: &str) -> Result<String, VarError> {
        self.scope(request).resolve(text)
    }

    /// Expands the URL, header values, and body of `request`.
    ///
    /// Bodyless methods get no body even if one is written.
    pub fn resolve_request(&self, request: &Request) -> Result<ResolvedRequest, RunError> {
        let scope = self.scope(request);

        let url = scope.resolve(&request.url)?;
        Url::parse(&url).map_err(|e| RunError::InvalidUrl {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let headers = request
            .headers
            .iter()
            .map(|header| Ok(Header::new(header.name.as_str(), scope.resolve(&header.value)?)))
            .collect::<Result<Vec<_>, VarError>>()?;

        let body = request
            .body
            .as_deref()
            .map(|body| scope.resolve(body))
            .transpose()?
            .filter(|body| !body.is_empty() && !self.config.is_bodyless(request.method.as_str()));

        Ok(ResolvedRequest {
            method: request.method.clone(),
            url,
            headers,
            body,
        })
    }

    /// `@title`, or the method and resolved URL. Falls back to the raw URL
    /// when it cannot be resolved yet.
    pub fn title(&self, request: &Request) -> String {
        if let Some(title) = request.meta.title() {
            return title.to_string();
        }
        let url = self
            .resolve(request, &request.url)
            .unwrap_or_else(|_| request.url.clone());
        format!("{} {}", request.method, url)
    }

    /// Resolves and sends `request`, registering the outcome under its
    /// `@name`.
    pub fn execute(&mut self, request: &Request) -> Result<Outcome, RunError> {
        let resolved = self.resolve_request(request)?;
        log::debug!("line {}: sending {} {}", request.line, resolved.method, resolved.url);

        let response = self.transport.send(&resolved)?;
        log::debug!(
            "line {}: received {} {}",
            request.line,
            response.status,
            response.status_text
        );

        let outcome = Outcome {
            request: resolved,
            response,
        };

        if let Some(name) = request.meta.name() {
            self.outcomes.register(name, &outcome)?;
            log::trace!("registered outcome {}", name);
        }

        Ok(outcome)
    }

    /// Evaluates the `@expect` and `@status` assertions of `request` and
    /// returns the redacted snapshot of the outcome.
    pub fn check(&self, request: &Request, outcome: &Outcome) -> Result<Value, RunError> {
        let value = outcome.to_value()?;

        for expectation in request.meta.expectations() {
            let actual = query_collapsed(&value, &expectation.path)?.unwrap_or(Value::Null);
            if actual != expectation.expected {
                return Err(RunError::Assertion {
                    path: expectation.path,
                    expected: expectation.expected,
                    actual,
                });
            }
        }

        self.snapshot(request, outcome)
    }

    /// The outcome as JSON with ignored response headers and `@ignore`
    /// paths replaced by [`REDACTED`].
    pub fn snapshot(&self, request: &Request, outcome: &Outcome) -> Result<Value, RunError> {
        let pattern = request
            .meta
            .ignore_headers()
            .map(|source| compile_pattern("ignoreHeaders", source))
            .transpose()?;

        let mut redacted = outcome.clone();
        for header in &mut redacted.response.headers {
            let ignored = self.config.is_ignored_header(&header.name)
                || pattern.as_ref().map_or(false, |p| p.is_match(&header.name));
            if ignored {
                header.value = REDACTED.to_string();
            }
        }

        let mut value = redacted.to_value()?;
        for path in request.meta.ignore_paths() {
            redact(&mut value, path)?;
        }

        Ok(value)
    }

    /// Runs one request and reports how it went. `any_only` tells whether
    /// some request in the document carries `@only`.
    pub fn run_request(&mut self, request: &Request, any_only: bool) -> RequestReport {
        let title = self.title(request);
        let name = request.meta.name().map(str::to_string);
        let selected = request.meta.only() || (!any_only && !request.meta.skip());

        if !selected {
            log::info!("skipped: {}", title);
            return RequestReport {
                title,
                line: request.line,
                name,
                status: ReportStatus::Skipped,
                outcome: None,
                snapshot: None,
            };
        }

        log::info!("running: {}", title);

        let (outcome, result) = match self.execute(request) {
            Ok(outcome) => {
                let checked = self.check(request, &outcome);
                (Some(outcome), checked)
            }
            Err(err) => (None, Err(err)),
        };

        let (status, snapshot) = match (request.meta.throws(), result) {
            (None, Ok(snapshot)) => (ReportStatus::Passed, Some(snapshot)),
            (None, Err(err)) => (ReportStatus::Failed(err), None),
            (Some(throws), Ok(snapshot)) => {
                let pattern = match throws {
                    Throws::Any => None,
                    Throws::Matching(pattern) => Some(pattern),
                };
                (
                    ReportStatus::Failed(RunError::UnexpectedSuccess { pattern }),
                    Some(snapshot),
                )
            }
            (Some(throws), Err(err)) => (expected_failure(&throws, &err), None),
        };

        match &status {
            ReportStatus::Failed(err) => log::warn!("failed: {}: {}", title, err),
            _ => log::info!("passed: {}", title),
        }

        RequestReport {
            title,
            line: request.line,
            name,
            status,
            outcome,
            snapshot,
        }
    }

    /// Runs every request of the document in order.
    pub fn run(&mut self) -> Vec<RequestReport> {
        let document = self.document;
        let any_only = document.requests().any(|request| request.meta.only());

        document
            .requests()
            .map(|request| self.run_request(request, any_only))
            .collect()
    }
}

fn compile_pattern(directive: &str, source: &str) -> Result<Regex, RunError> {
    Regex::new(source).map_err(|e| RunError::InvalidPattern {
        directive: directive.to_string(),
        message: e.to_string(),
    })
}

/// Status of a `@throws` request that failed with `err`.
fn expected_failure(throws: &Throws, err: &RunError) -> ReportStatus {
    let pattern = match throws {
        Throws::Any => return ReportStatus::Passed,
        Throws::Matching(pattern) => pattern,
    };

    let message = err.to_string();
    match compile_pattern("throws", pattern) {
        Ok(regex) if regex.is_match(&message) => ReportStatus::Passed,
        Ok(_) => ReportStatus::Failed(RunError::UnexpectedFailure {
            pattern: pattern.clone(),
            message,
        }),
        Err(compile_error) => ReportStatus::Failed(compile_error),
    }
}
