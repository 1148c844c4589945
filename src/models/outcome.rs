//! Outcome models: a resolved request paired with the response it received.
//!
//! Outcomes are what later requests dereference through
//! `{{name.$.response.body.field}}`. They are stored as JSON values so path
//! queries can run over them directly:
//!
//! ```text
//! {
//!   "request":  { "method", "url", "headers": [[k, v]], "body"? },
//!   "response": { "status", "statusText", "headers": [[k, v]], "body"? }
//! }
//! ```

use super::request::{Header, HttpMethod};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// A request after every placeholder in its URL, headers, and body has been
/// expanded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<Header>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Response data as handed back by a transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<Header>,

    /// Decoded body: JSON for JSON content types, a string otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl ResponseRecord {
    pub fn new(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// First header with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }
}

/// The resolved request together with its response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub request: ResolvedRequest,
    pub response: ResponseRecord,
}

impl Outcome {
    /// Converts the outcome into the JSON shape that path queries run against.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Outcomes of previously executed requests, keyed by their `@name`.
///
/// The table only grows: registering a name again replaces the stored value
/// but nothing is ever removed.
#[derive(Debug, Clone, Default)]
pub struct OutcomeTable {
    entries: IndexMap<String, Value>,
}

impl OutcomeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an outcome under `name`.
    pub fn register(&mut self, name: &str, outcome: &Outcome) -> Result<(), serde_json::Error> {
        let value = outcome.to_value()?;
        self.entries.insert(name.to_string(), value);
        Ok(())
    }

    /// Stores an already-serialized outcome under `name`.
    pub fn register_value(&mut self, name: &str, value: Value) {
        self.entries.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }
}
