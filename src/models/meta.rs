//! Meta-directive models.
//!
//! Meta-directives are `@name value` annotations embedded in comment lines
//! above a request (`# @name login`, `// @expect $.response.status 200`). They
//! control how a request is executed and validated rather than what is sent.
//!
//! Each directive name has an accumulation policy looked up once in
//! [`DIRECTIVE_POLICIES`]: list directives collect every occurrence in
//! declaration order, `name` may appear only once per block, and all other
//! directives keep their last occurrence.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// How repeated occurrences of a directive within one block are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accumulation {
    /// A second occurrence is a parse error.
    Unique,
    /// Occurrences are appended to a list.
    Append,
    /// The last occurrence wins.
    Overwrite,
}

/// Accumulation policy per directive name. Names not listed overwrite.
pub const DIRECTIVE_POLICIES: &[(&str, Accumulation)] = &[
    ("name", Accumulation::Unique),
    ("expect", Accumulation::Append),
    ("ignore", Accumulation::Append),
];

/// Returns the accumulation policy for a directive name.
pub fn accumulation_for(name: &str) -> Accumulation {
    DIRECTIVE_POLICIES
        .iter()
        .find(|(directive, _)| *directive == name)
        .map(|(_, policy)| *policy)
        .unwrap_or(Accumulation::Overwrite)
}

/// A single assertion: the value found at `path` in the outcome must equal
/// `expected`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expectation {
    /// Query path evaluated against the outcome (e.g. `$.response.body.id`).
    pub path: String,
    /// Expected JSON value, compared with strict equality.
    pub expected: Value,
}

impl Expectation {
    pub fn new(path: impl Into<String>, expected: Value) -> Self {
        Self {
            path: path.into(),
            expected,
        }
    }
}

/// Expected response status from a `@status 200 OK` directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusExpectation {
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Typed value carried by a directive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DirectiveValue {
    /// Boolean directives (`@only`, `@skip`, value-less `@throws`).
    Flag(bool),
    /// Free text (`@name`, `@title`, `@ignore`, `@ignoreHeaders`, unknown names).
    Text(String),
    /// `@expect <path> <json>`.
    Expect(Expectation),
    /// `@status <code> [text]`.
    Status(StatusExpectation),
}

impl DirectiveValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DirectiveValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            DirectiveValue::Flag(flag) => Some(*flag),
            _ => None,
        }
    }
}

/// One directive occurrence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Directive {
    pub value: DirectiveValue,

    /// Declared with `@@` inside the comment.
    pub global: bool,

    /// 1-based source line of the comment carrying the directive.
    #[serde(skip)]
    pub line: usize,
}

impl Directive {
    pub fn new(value: DirectiveValue, line: usize) -> Self {
        Self {
            value,
            global: false,
            line,
        }
    }
}

/// Accumulated occurrences of one directive name.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaEntry {
    Single(Directive),
    List(Vec<Directive>),
}

impl MetaEntry {
    /// All occurrences, in declaration order.
    pub fn directives(&self) -> &[Directive] {
        match self {
            MetaEntry::Single(directive) => std::slice::from_ref(directive),
            MetaEntry::List(list) => list,
        }
    }

    /// The last (effective) occurrence.
    pub fn last(&self) -> Option<&Directive> {
        self.directives().last()
    }
}

impl Serialize for MetaEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetaEntry::Single(directive) => directive.serialize(serializer),
            MetaEntry::List(list) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("value", list)?;
                map.end()
            }
        }
    }
}

/// Expected failure from a `@throws` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Throws {
    /// Any failure satisfies the expectation.
    Any,
    /// The failure message must match this regex source.
    Matching(String),
}

/// Ordered mapping from directive name to its accumulated occurrences.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetaMap {
    entries: IndexMap<String, MetaEntry>,
}

impl MetaMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directive according to its accumulation policy.
    ///
    /// Returns `false` (leaving the map untouched) when `name` is
    /// [`Accumulation::Unique`] and already present.
    pub fn try_insert(&mut self, name: &str, directive: Directive) -> bool {
        match accumulation_for(name) {
            Accumulation::Unique => {
                if self.entries.contains_key(name) {
                    return false;
                }
                self.entries
                    .insert(name.to_string(), MetaEntry::Single(directive));
            }
            Accumulation::Append => match self.entries.get_mut(name) {
                Some(MetaEntry::List(list)) => list.push(directive),
                _ => {
                    self.entries
                        .insert(name.to_string(), MetaEntry::List(vec![directive]));
                }
            },
            Accumulation::Overwrite => {
                self.entries
                    .insert(name.to_string(), MetaEntry::Single(directive));
            }
        }
        true
    }

    pub fn get(&self, name: &str) -> Option<&MetaEntry> {
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

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetaEntry)> {
        self.entries.iter()
    }

    fn last_value(&self, name: &str) -> Option<&DirectiveValue> {
        self.entries
            .get(name)
            .and_then(MetaEntry::last)
            .map(|d| &d.value)
    }

    fn flag(&self, name: &str) -> bool {
        self.last_value(name)
            .and_then(DirectiveValue::as_flag)
            .unwrap_or(false)
    }

    /// Name under which the request's outcome is registered.
    pub fn name(&self) -> Option<&str> {
        self.last_value("name").and_then(DirectiveValue::as_text)
    }

    pub fn title(&self) -> Option<&str> {
        self.last_value("title").and_then(DirectiveValue::as_text)
    }

    pub fn only(&self) -> bool {
        self.flag("only")
    }

    pub fn skip(&self) -> bool {
        self.flag("skip")
    }

    /// Regex source applied to response header names before comparison.
    pub fn ignore_headers(&self) -> Option<&str> {
        self.last_value("ignoreHeaders")
            .and_then(DirectiveValue::as_text)
    }

    /// Query paths whose matches are redacted before comparison.
    pub fn ignore_paths(&self) -> Vec<&str> {
        self.entries
            .get("ignore")
            .map(|entry| {
                entry
                    .directives()
                    .iter()
                    .filter_map(|d| d.value.as_text())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All assertions for the request: every `@expect` in order, followed by
    /// the expansion of `@status` into status code and status text checks.
    pub fn expectations(&self) -> Vec<Expectation> {
        let mut expectations: Vec<Expectation> = self
            .entries
            .get("expect")
            .map(|entry| {
                entry
                    .directives()
                    .iter()
                    .filter_map(|d| match &d.value {
                        DirectiveValue::Expect(expectation) => Some(expectation.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        if let Some(DirectiveValue::Status(status)) = self.last_value("status") {
            expectations.push(Expectation::new(
                "$.response.status",
                Value::from(status.code),
            ));
            if let Some(text) = &status.text {
                expectations.push(Expectation::new(
                    "$.response.statusText",
                    Value::from(text.as_str()),
                ));
            }
        }

        expectations
    }

    pub fn throws(&self) -> Option<Throws> {
        match self.last_value("throws")? {
            DirectiveValue::Flag(true) => Some(Throws::Any),
            DirectiveValue::Text(pattern) => Some(Throws::Matching(pattern.clone())),
            _ => None,
        }
    }
}
