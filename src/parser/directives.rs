//! Blank-line, comment, and meta-directive handling.
//!
//! Comments start with `#` (but not `##`) or `//`. A comment whose text
//! begins with `@name` or `@@name` carries a meta-directive:
//!
//! ```text
//! # @name login
//! // @expect $.response.body.id 1
//! # @status 201 Created
//! # @skip
//! ```
//!
//! The directive name is followed by whitespace and an optional value; what
//! the value must look like depends on the directive.

use super::cursor::SourceCursor;
use super::error::ParseError;
use crate::models::meta::{
    Directive, DirectiveValue, Expectation, MetaMap, StatusExpectation,
};
use once_cell::sync::Lazy;
use regex::Regex;

/// Matches a directive inside a comment: `# @@?name [value]`.
static DIRECTIVE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:#|//)\s*(@@?)([A-Za-z_]\w*)(?:\s+(.*?))?\s*$")
        .expect("Failed to compile directive regex")
});

static IDENTIFIER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_]\w*$").expect("Failed to compile identifier regex"));

/// Returns `true` for `#` comments (not `##`, so `###` separators are excluded)
/// and `//` comments. Expects a trimmed line.
pub fn is_comment(line: &str) -> bool {
    if line.starts_with("//") {
        return true;
    }
    match line.strip_prefix('#') {
        Some(rest) => !rest.starts_with('#'),
        None => false,
    }
}

/// Consumes blank lines and comments, feeding any directives into `meta`.
///
/// Stops at the first line that is neither blank nor a comment, or at the end
/// of input.
pub fn skip(cursor: &mut SourceCursor<'_>, meta: &mut MetaMap) -> Result<(), ParseError> {
    while let Some(line) = cursor.current_line() {
        if line.is_empty() {
            cursor.consume_line();
            continue;
        }

        if !is_comment(line) {
            break;
        }

        let line_number = cursor.line_number();
        cursor.consume_line();

        if let Some((name, directive)) = parse_directive(line, line_number)? {
            log::trace!("line {}: directive @{}", line_number, name);
            if !meta.try_insert(&name, directive) {
                // Reported at the cursor, which has moved past the duplicate.
                return Err(ParseError::DuplicateName {
                    line: cursor.line_number(),
                });
            }
        }
    }

    Ok(())
}

/// Parses a single comment line into a directive name and value.
///
/// Returns `Ok(None)` for plain comments.
pub fn parse_directive(
    line: &str,
    line_number: usize,
) -> Result<Option<(String, Directive)>, ParseError> {
    let Some(captures) = DIRECTIVE_REGEX.captures(line) else {
        return Ok(None);
    };

    let global = &captures[1] == "@@";
    let name = captures[2].to_string();
    let raw = captures
        .get(3)
        .map(|m| m.as_str().trim())
        .filter(|value| !value.is_empty());

    let value = directive_value(&name, raw, line_number)?;

    Ok(Some((
        name,
        Directive {
            value,
            global,
            line: line_number,
        },
    )))
}

fn invalid(directive: &str, message: impl Into<String>, line: usize) -> ParseError {
    ParseError::InvalidDirective {
        directive: directive.to_string(),
        message: message.into(),
        line,
    }
}

fn required<'a>(name: &str, raw: Option<&'a str>, line: usize) -> Result<&'a str, ParseError> {
    raw.ok_or_else(|| invalid(name, "a value is required", line))
}

/// Types the raw directive value according to the directive name.
fn directive_value(
    name: &str,
    raw: Option<&str>,
    line: usize,
) -> Result<DirectiveValue, ParseError> {
    match name {
        "name" => {
            let value = required(name, raw, line)?;
            if !IDENTIFIER_REGEX.is_match(value) {
                return Err(invalid(
                    name,
                    format!("\"{}\" is not a valid identifier", value),
                    line,
                ));
            }
            Ok(DirectiveValue::Text(value.to_string()))
        }
        "only" | "skip" => match raw {
            None | Some("true") => Ok(DirectiveValue::Flag(true)),
            Some("false") => Ok(DirectiveValue::Flag(false)),
            Some(other) => Err(invalid(
                name,
                format!("expected true or false, found \"{}\"", other),
                line,
            )),
        },
        "expect" => {
            let value = required(name, raw, line)?;
            let (path, literal) = value
                .split_once(char::is_whitespace)
                .ok_or_else(|| invalid(name, "expected a path followed by a JSON value", line))?;
            let expected = serde_json::from_str(literal.trim())
                .map_err(|e| invalid(name, format!("invalid JSON value: {}", e), line))?;
            Ok(DirectiveValue::Expect(Expectation::new(path, expected)))
        }
        "status" => {
            let value = required(name, raw, line)?;
            let (code, text) = match value.split_once(char::is_whitespace) {
                Some((code, text)) => (code, Some(text.trim().to_string())),
                None => (value, None),
            };
            let code = code
                .parse::<u16>()
                .map_err(|_| invalid(name, format!("\"{}\" is not a status code", code), line))?;
            Ok(DirectiveValue::Status(StatusExpectation { code, text }))
        }
        "ignoreHeaders" => {
            let value = required(name, raw, line)?;
            Regex::new(value).map_err(|e| invalid(name, e.to_string(), line))?;
            Ok(DirectiveValue::Text(value.to_string()))
        }
        "throws" => match raw {
            None => Ok(DirectiveValue::Flag(true)),
            Some(pattern) => {
                Regex::new(pattern).map_err(|e| invalid(name, e.to_string(), line))?;
                Ok(DirectiveValue::Text(pattern.to_string()))
            }
        },
        "ignore" | "title" => {
            let value = required(name, raw, line)?;
            Ok(DirectiveValue::Text(value.to_string()))
        }
        _ => Ok(match raw {
            Some(value) => DirectiveValue::Text(value.to_string()),
            None => DirectiveValue::Flag(true),
        }),
    }
}
