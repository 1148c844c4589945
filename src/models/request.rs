//! Parsed request data models.
//!
//! This module defines the structures produced by the parser: the request
//! method, ordered headers, raw body, and the variables and meta-directives
//! declared above each request. All text is kept raw: `{{placeholders}}` are
//! only expanded when a request is executed.

use super::meta::MetaMap;
use super::variable::VariableSet;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// HTTP request method.
///
/// The request-line grammar accepts any run of uppercase letters, so methods
/// outside the standard set are kept as [`HttpMethod::Extension`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    OPTIONS,
    HEAD,
    TRACE,
    CONNECT,
    /// Any other uppercase method token (e.g. `PROPFIND`).
    Extension(String),
}

impl HttpMethod {
    /// Returns the string representation of the HTTP method.
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::OPTIONS => "OPTIONS",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::TRACE => "TRACE",
            HttpMethod::CONNECT => "CONNECT",
            HttpMethod::Extension(method) => method,
        }
    }

    /// Maps a method token onto a known variant, keeping unknown tokens as
    /// extensions. Matching is exact: the parser only produces uppercase tokens.
    pub fn from_token(token: &str) -> Self {
        match token {
            "GET" => HttpMethod::GET,
            "POST" => HttpMethod::POST,
            "PUT" => HttpMethod::PUT,
            "DELETE" => HttpMethod::DELETE,
            "PATCH" => HttpMethod::PATCH,
            "OPTIONS" => HttpMethod::OPTIONS,
            "HEAD" => HttpMethod::HEAD,
            "TRACE" => HttpMethod::TRACE,
            "CONNECT" => HttpMethod::CONNECT,
            other => HttpMethod::Extension(other.to_string()),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for HttpMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single `name: value` header line, both parts trimmed and unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

// Headers serialize as `[name, value]` pairs.
impl Serialize for Header {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.name, &self.value).serialize(serializer)
    }
}

/// A request parsed from one block of a `.http` document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    pub method: HttpMethod,

    /// Raw URL: the remainder of the request line after the method.
    pub url: String,

    /// Headers in declaration order. Repeated names are kept.
    pub headers: Vec<Header>,

    /// Raw body, trimmed at both ends only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Structured body, present when a JSON content type was declared.
    #[serde(skip)]
    pub json: Option<Value>,

    /// Every variable declared in this block, local and global.
    pub variables: VariableSet,

    pub meta: MetaMap,

    /// 1-based line of the request line.
    #[serde(skip)]
    pub line: usize,
}

impl Request {
    /// Creates a request with no headers, body, variables, or directives.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            json: None,
            variables: VariableSet::new(),
            meta: MetaMap::new(),
            line: 0,
        }
    }

    /// Returns the first header with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Re-serializes the headers, one `name: value` per line.
    pub fn headers_text(&self) -> String {
        self.headers
            .iter()
            .map(Header::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Variables and directives of a block that has no request line, such as a
/// trailing block of global declarations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PartialRecord {
    pub variables: VariableSet,
    pub meta: MetaMap,
    #[serde(skip)]
    pub line: usize,
}

/// What one block of the document produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Request(Request),
    Partial(PartialRecord),
}

impl Record {
    pub fn variables(&self) -> &VariableSet {
        match self {
            Record::Request(request) => &request.variables,
            Record::Partial(partial) => &partial.variables,
        }
    }

    pub fn meta(&self) -> &MetaMap {
        match self {
            Record::Request(request) => &request.meta,
            Record::Partial(partial) => &partial.meta,
        }
    }

    pub fn as_request(&self) -> Option<&Request> {
        match self {
            Record::Request(request) => Some(request),
            Record::Partial(_) => None,
        }
    }
}

/// A parsed `.http` document: its records in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Document {
    pub records: Vec<Record>,
}

impl Document {
    /// Iterates over the records that carry a request.
    pub fn requests(&self) -> impl Iterator<Item = &Request> {
        self.records.iter().filter_map(Record::as_request)
    }

    /// Collects every `@@` declaration of the document into one set.
    ///
    /// Globals are hoisted: the returned set is visible to every request,
    /// including those declared before the global. When a name is declared
    /// globally more than once, the last declaration wins.
    pub fn global_variables(&self) -> VariableSet {
        self.records
            .iter()
            .flat_map(|record| record.variables().globals())
            .map(|(name, variable)| (name.clone(), variable.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
