//! Placeholder expansion.
//!
//! Replaces every `{{identifier}}` in a string with its value from a
//! [`ResolutionScope`], recursively expanding values that contain further
//! placeholders. Identifiers are looked up as follows:
//!
//! 1. `$name args...` is a built-in function; its result is inserted verbatim.
//! 2. `outcome.<path>` where `outcome` names a registered outcome is a path
//!    query into that outcome's data.
//! 3. Otherwise: the request's own block (its `@` and `@@` declarations),
//!    then document globals, then the environment.
//!
//! While expanding a global (or environment, or outcome-derived) value, the
//! block's variables are invisible and only document globals apply. Each recursion carries its own copy of the
//! visited identifiers, so a repeated identifier is reported as a cycle.

use super::error::VarError;
use super::query::query_collapsed;
use super::system;
use crate::models::{OutcomeTable, VariableSet};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;

/// Everything a placeholder may refer to during one resolution call.
///
/// All maps are borrowed read-only, so a scope can be rebuilt cheaply for
/// each request while the outcome table grows between requests.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionScope<'a> {
    /// Flattened environment, always global
    pub env: &'a HashMap<String, String>,

    /// Document-wide (hoisted) `@@` variables
    pub globals: &'a VariableSet,

    /// Variables declared in the request's own block, local and global
    pub locals: &'a VariableSet,

    /// Outcomes of earlier named requests
    pub outcomes: &'a OutcomeTable,
}

impl<'a> ResolutionScope<'a> {
    pub fn new(
        env: &'a HashMap<String, String>,
        globals: &'a VariableSet,
        locals: &'a VariableSet,
        outcomes: &'a OutcomeTable,
    ) -> Self {
        Self {
            env,
            globals,
            locals,
            outcomes,
        }
    }

    /// Expands all placeholders in `text`.
    pub fn resolve(&self, text: &str) -> Result<String, VarError> {
        resolve(text, self)
    }

    fn expand(&self, text: &str, path: &[String], in_global: bool) -> Result<String, VarError> {
        let mut fragments = text.split("{{");
        let mut result = String::with_capacity(text.len());
        result.push_str(fragments.next().unwrap_or_default());

        for fragment in fragments {
            match fragment.find("}}") {
                Some(end) => {
                    let identifier = fragment[..end].trim();
                    result.push_str(&self.placeholder(identifier, path, in_global)?);
                    result.push_str(&fragment[end + 2..]);
                }
                // No closing braces: keep the text as written.
                None => {
                    result.push_str("{{");
                    result.push_str(fragment);
                }
            }
        }

        Ok(result)
    }

    fn placeholder(
        &self,
        identifier: &str,
        path: &[String],
        in_global: bool,
    ) -> Result<String, VarError> {
        if let Some(expression) = identifier.strip_prefix('$') {
            return system::evaluate(expression);
        }

        if path.iter().any(|visited| visited == identifier) {
            let mut cycle = path.to_vec();
            cycle.push(identifier.to_string());
            return Err(VarError::Cycle { path: cycle });
        }

        let outcome_reference = identifier
            .split_once('.')
            .and_then(|(name, query)| self.outcomes.get(name).map(|outcome| (outcome, query)));

        if in_global
            && outcome_reference.is_none()
            && !self.globals.contains(identifier)
            && !self.env.contains_key(identifier)
        {
            return Err(VarError::NotOnGlobalScope(identifier.to_string()));
        }

        let (raw, is_global): (Cow<'_, str>, bool) = if let Some((outcome, query)) = outcome_reference {
            (Cow::Owned(outcome_text(outcome, query)?), true)
        } else if let Some(own) = self.locals.get(identifier).filter(|_| !in_global) {
            (own.value.as_raw(), own.global)
        } else if let Some(global) = self.globals.get(identifier) {
            (global.value.as_raw(), true)
        } else if let Some(value) = self.env.get(identifier) {
            (Cow::Borrowed(value.as_str()), true)
        } else {
            return Err(VarError::UndefinedVariable(identifier.to_string()));
        };

        log::trace!(
            "{{{{{}}}}} -> {:?} ({})",
            identifier,
            raw,
            if is_global { "global" } else { "local" }
        );

        let mut next_path = path.to_vec();
        next_path.push(identifier.to_string());
        self.expand(&raw, &next_path, is_global)
    }
}

/// Renders a query result as placeholder text: strings verbatim, other values
/// as JSON, nothing as an empty string.
fn outcome_text(outcome: &Value, query: &str) -> Result<String, VarError> {
    Ok(match query_collapsed(outcome, query)? {
        None => String::new(),
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
    })
}

/// Expands all placeholders in `text` against `scope`.
///
/// Text without `{{` is returned unchanged.
///
/// # Examples
///
/// ```
/// use http_script::models::{OutcomeTable, Variable, VariableSet};
/// use http_script::variables::substitution::{resolve, ResolutionScope};
/// use std::collections::HashMap;
///
/// let env = HashMap::from([("scheme".to_string(), "https".to_string())]);
/// let mut globals = VariableSet::new();
/// globals.insert("host", Variable::global("api.example.com"));
/// let mut locals = VariableSet::new();
/// locals.insert("base", Variable::local("{{scheme}}://{{host}}"));
/// let outcomes = OutcomeTable::new();
///
/// let scope = ResolutionScope::new(&env, &globals, &locals, &outcomes);
/// assert_eq!(
///     resolve("GET {{base}}/users", &scope).unwrap(),
///     "GET https://api.example.com/users"
/// );
/// ```
pub fn resolve(text: &str, scope: &ResolutionScope<'_>) -> Result<String, VarError> {
    if !text.contains("{{") {
        return Ok(text.to_string());
    }
    scope.expand(text, &[], false)
}
