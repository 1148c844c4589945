//! Variable declaration models.
//!
//! Variables are declared before a request with `@name=value` (local to the
//! block) or `@@name=value` (global to the whole document). A declaration
//! without a value (`@flag`) stores the boolean `true`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Raw, unresolved value of a declared variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    /// Value-less declaration such as `@flag`.
    Flag(bool),
    /// Text after the `=`, trimmed. May contain `{{placeholders}}`.
    Text(String),
}

impl VariableValue {
    /// Returns the raw text that resolution starts from.
    pub fn as_raw(&self) -> Cow<'_, str> {
        match self {
            VariableValue::Flag(flag) => Cow::Owned(flag.to_string()),
            VariableValue::Text(text) => Cow::Borrowed(text),
        }
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        VariableValue::Text(value.to_string())
    }
}

/// A single declared variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Raw value, resolved lazily at request time.
    pub value: VariableValue,

    /// `true` when declared with `@@`.
    pub global: bool,
}

impl Variable {
    /// Creates a block-local text variable.
    pub fn local(value: impl Into<String>) -> Self {
        Self {
            value: VariableValue::Text(value.into()),
            global: false,
        }
    }

    /// Creates a document-wide text variable.
    pub fn global(value: impl Into<String>) -> Self {
        Self {
            value: VariableValue::Text(value.into()),
            global: true,
        }
    }
}

/// Ordered mapping from variable name to declaration.
///
/// Declaration order is preserved; redeclaring a name replaces the earlier
/// value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableSet {
    entries: IndexMap<String, Variable>,
}

impl VariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, variable: Variable) {
        self.entries.insert(name.into(), variable);
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
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

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Variable)> {
        self.entries.iter()
    }

    /// Iterates over the `@@` declarations only.
    pub fn globals(&self) -> impl Iterator<Item = (&String, &Variable)> {
        self.entries.iter().filter(|(_, v)| v.global)
    }
}

impl FromIterator<(String, Variable)> for VariableSet {
    fn from_iter<I: IntoIterator<Item = (String, Variable)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
