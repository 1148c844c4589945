//! Path queries over outcome data.
//!
//! Paths are JSONPath expressions (`$.response.body.items[0].id`) evaluated
//! with `serde_json_path`. Outcome references in placeholders, `@expect`
//! assertions, and `@ignore` redaction all go through this module.

use super::error::VarError;
use serde_json::Value;
use serde_json_path::JsonPath;

/// Replacement written over redacted values.
pub const REDACTED: &str = "<ignored>";

fn compile(path: &str) -> Result<JsonPath, VarError> {
    JsonPath::parse(path.trim()).map_err(|e| VarError::InvalidQuery {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Every node matched by `path`, in document order.
pub fn query<'v>(value: &'v Value, path: &str) -> Result<Vec<&'v Value>, VarError> {
    Ok(compile(path)?.query(value).all())
}

/// Collapses the matches of `path` into one value: `None` for no match, the
/// node itself for a single match, and an array otherwise.
///
/// # Examples
///
/// ```
/// use http_script::variables::query::query_collapsed;
/// use serde_json::json;
///
/// let outcome = json!({"response": {"status": 200, "body": [{"id": 1}, {"id": 2}]}});
///
/// assert_eq!(query_collapsed(&outcome, "$.response.status").unwrap(), Some(json!(200)));
/// assert_eq!(query_collapsed(&outcome, "$.response.body[*].id").unwrap(), Some(json!([1, 2])));
/// assert_eq!(query_collapsed(&outcome, "$.response.missing").unwrap(), None);
/// ```
pub fn query_collapsed(value: &Value, path: &str) -> Result<Option<Value>, VarError> {
    let mut matches = query(value, path)?;
    Ok(match matches.len() {
        0 => None,
        1 => matches.pop().cloned(),
        _ => Some(Value::Array(matches.into_iter().cloned().collect())),
    })
}

/// Locations matched by `path`, as JSON pointers (`/response/body/0/id`).
pub fn paths(value: &Value, path: &str) -> Result<Vec<String>, VarError> {
    Ok(compile(path)?
        .query_located(value)
        .locations()
        .map(|location| location.to_json_pointer())
        .collect())
}

/// Overwrites every node matched by `path` with [`REDACTED`].
///
/// Returns the number of nodes replaced.
pub fn redact(value: &mut Value, path: &str) -> Result<usize, VarError> {
    let pointers = paths(value, path)?;
    let mut replaced = 0;

    for pointer in pointers {
        if let Some(node) = value.pointer_mut(&pointer) {
            *node = Value::String(REDACTED.to_string());
            replaced += 1;
        }
    }

    Ok(replaced)
}
