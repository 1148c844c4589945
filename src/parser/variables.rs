//! Variable declarations preceding a request.
//!
//! ```text
//! @hostname=localhost        local to this block
//! @@port=3000                global to the whole document
//! @verbose                   value-less: stores `true`
//! ```
//!
//! Comments, blank lines, and meta-directives may appear between
//! declarations.

use super::cursor::SourceCursor;
use super::directives::skip;
use super::error::ParseError;
use crate::models::meta::MetaMap;
use crate::models::variable::{Variable, VariableSet, VariableValue};
use once_cell::sync::Lazy;
use regex::Regex;

static VARIABLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(@@?)([a-z_]\w*)\s*(?:=(.*))?$")
        .expect("Failed to compile variable declaration regex")
});

/// Parses a trimmed declaration line into its name and variable.
///
/// Returns `None` when the line is not a declaration.
pub fn parse_variable_line(line: &str) -> Option<(String, Variable)> {
    let captures = VARIABLE_REGEX.captures(line)?;

    let global = &captures[1] == "@@";
    let name = captures[2].to_string();
    let value = match captures.get(3) {
        Some(value) => VariableValue::Text(value.as_str().trim().to_string()),
        None => VariableValue::Flag(true),
    };

    Some((name, Variable { value, global }))
}

/// Consumes consecutive declarations into `variables`, skipping comments
/// between them and collecting their directives into `meta`.
pub fn parse_variables(
    cursor: &mut SourceCursor<'_>,
    variables: &mut VariableSet,
    meta: &mut MetaMap,
) -> Result<(), ParseError> {
    skip(cursor, meta)?;

    while let Some((name, variable)) = cursor.current_line().and_then(parse_variable_line) {
        log::trace!(
            "line {}: {} variable {}",
            cursor.line_number(),
            if variable.global { "global" } else { "local" },
            name
        );
        cursor.consume_line();
        variables.insert(name, variable);
        skip(cursor, meta)?;
    }

    Ok(())
}
