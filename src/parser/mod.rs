//! `.http` document parser.
//!
//! A document is a sequence of blocks separated by lines containing only
//! `###`. Each block is read in a single forward pass:
//!
//! ```text
//! skip -> variables -> skip -> request line -> headers -> body -> separator?
//! ```
//!
//! where `skip` consumes blank lines and comments (collecting meta-directives).
//! A block without a request line yields a [`PartialRecord`] holding only its
//! variables and directives.
//!
//! Nothing is resolved here: URLs, header values, and bodies keep their
//! `{{placeholders}}` until execution.

pub mod cursor;
pub mod directives;
pub mod error;
pub mod variables;

use crate::models::{Document, Header, HttpMethod, MetaMap, PartialRecord, Record, Request, VariableSet};
use cursor::SourceCursor;
use directives::is_comment;
use error::ParseError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use variables::parse_variables;

static REQUEST_LINE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]+)\s+(.*)$").expect("Failed to compile request line regex"));

static HEADER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([\w-]+)\s*:(.*)$").expect("Failed to compile header regex"));

/// Returns `true` for a block separator. Expects a trimmed line.
pub fn is_separator(line: &str) -> bool {
    line == "###"
}

/// Parses the content of a `.http` document.
///
/// # Examples
///
/// ```
/// use http_script::parser::parse_document;
///
/// let content = r#"
/// @@base=https://api.example.com
///
/// # @name users
/// GET {{base}}/users
///
/// ###
///
/// POST {{base}}/users
/// Content-Type: application/json
///
/// {"name": "John"}
/// "#;
///
/// let document = parse_document(content).unwrap();
/// assert_eq!(document.requests().count(), 2);
/// assert_eq!(document.requests().next().unwrap().meta.name(), Some("users"));
/// ```
pub fn parse_document(content: &str) -> Result<Document, ParseError> {
    let mut cursor = SourceCursor::new(content);
    let mut records = Vec::new();

    while !cursor.at_end() {
        if let Some(record) = parse_block(&mut cursor)? {
            records.push(record);
        }
    }

    log::debug!("parsed {} record(s)", records.len());

    Ok(Document { records })
}

/// Parses one block, consuming its trailing separator if present.
///
/// Returns `Ok(None)` for a block with no request, variables, or directives.
pub fn parse_block(cursor: &mut SourceCursor<'_>) -> Result<Option<Record>, ParseError> {
    let block_line = cursor.line_number();
    let mut meta = MetaMap::new();
    let mut variables = VariableSet::new();

    parse_variables(cursor, &mut variables, &mut meta)?;

    match cursor.current_line() {
        None => return Ok(partial_record(variables, meta, block_line)),
        Some(line) if is_separator(line) => {
            cursor.consume_line();
            return Ok(partial_record(variables, meta, block_line));
        }
        Some(_) => {}
    }

    let line = cursor.line_number();
    let (method, url) = parse_request_line(cursor)?;
    let headers = parse_headers(cursor);
    let (body, body_line) = parse_body(cursor);

    if cursor.current_line().map_or(false, is_separator) {
        cursor.consume_line();
    }

    let mut request = Request {
        method,
        url,
        headers,
        body,
        json: None,
        variables,
        meta,
        line,
    };
    request.json = decode_json_body(&request, body_line)?;

    log::debug!(
        "line {}: {} {} ({} header(s), body: {})",
        line,
        request.method,
        request.url,
        request.headers.len(),
        request.body.is_some()
    );

    Ok(Some(Record::Request(request)))
}

fn partial_record(variables: VariableSet, meta: MetaMap, line: usize) -> Option<Record> {
    if variables.is_empty() && meta.is_empty() {
        return None;
    }
    Some(Record::Partial(PartialRecord {
        variables,
        meta,
        line,
    }))
}

/// Consumes the `METHOD URL` line.
///
/// The URL is the rest of the line, kept verbatim apart from trimming.
pub fn parse_request_line(
    cursor: &mut SourceCursor<'_>,
) -> Result<(HttpMethod, String), ParseError> {
    let line = cursor.line_number();
    let text = cursor.current_line().unwrap_or_default();

    let captures = REQUEST_LINE_REGEX
        .captures(text)
        .ok_or_else(|| ParseError::ExpectedRequestLine {
            found: text.to_string(),
            line,
        })?;

    let method = HttpMethod::from_token(&captures[1]);
    let url = captures[2].trim().to_string();
    cursor.consume_line();

    Ok((method, url))
}

/// Parses a trimmed `name: value` line.
pub fn parse_header_line(line: &str) -> Option<Header> {
    let captures = HEADER_REGEX.captures(line)?;
    Some(Header::new(captures[1].trim(), captures[2].trim()))
}

/// Consumes header lines, passing over blank lines and comments between them.
pub fn parse_headers(cursor: &mut SourceCursor<'_>) -> Vec<Header> {
    let mut headers = Vec::new();

    loop {
        skip_blank_and_comments(cursor);

        match cursor.current_line().and_then(parse_header_line) {
            Some(header) => {
                cursor.consume_line();
                headers.push(header);
            }
            None => break,
        }
    }

    headers
}

fn skip_blank_and_comments(cursor: &mut SourceCursor<'_>) {
    while cursor
        .current_line()
        .map_or(false, |line| line.is_empty() || is_comment(line))
    {
        cursor.consume_line();
    }
}

/// Consumes the body: every line up to the next separator or the end of
/// input. The joined text is trimmed at both ends only.
///
/// Returns the body (if non-empty) and the line it starts on.
pub fn parse_body(cursor: &mut SourceCursor<'_>) -> (Option<String>, usize) {
    let start = cursor.line_number();
    let mut lines = Vec::new();

    while let Some(raw) = cursor.raw_line() {
        if is_separator(raw.trim()) {
            break;
        }
        lines.push(raw);
        cursor.consume_raw_line();
    }

    let body = lines.join("\n").trim().to_string();
    if body.is_empty() {
        (None, start)
    } else {
        (Some(body), start)
    }
}

/// Decodes the body when the request declares a JSON content type.
fn decode_json_body(request: &Request, line: usize) -> Result<Option<Value>, ParseError> {
    let declares_json = request
        .content_type()
        .map_or(false, |ct| ct.to_ascii_lowercase().contains("json"));

    match (&request.body, declares_json) {
        (Some(body), true) => serde_json::from_str(body)
            .map(Some)
            .map_err(|e| ParseError::InvalidJsonBody {
                message: e.to_string(),
                line,
            }),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Variable, VariableValue};
    use serde_json::json;

    fn parse_requests(content: &str) -> Vec<Request> {
        parse_document(content)
            .unwrap()
            .requests()
            .cloned()
            .collect()
    }

    #[test]
    fn test_invalid_input() {
        let err = parse_document("foo bar").unwrap_err();
        assert_eq!(
            err.to_string(),
            "(line: 1) method + url expected but found: foo bar"
        );
    }

    #[test]
    fn test_invalid_input_after_valid_block() {
        let content = "\n# foo\n\nGET https://jsonplaceholder.typicode.com/todos/1\n\n###\n\nfoo bar\n";
        let err = parse_document(content).unwrap_err();
        assert_eq!(
            err,
            ParseError::ExpectedRequestLine {
                found: "foo bar".to_string(),
                line: 8
            }
        );
    }

    #[test]
    fn test_missing_url() {
        assert!(matches!(
            parse_document("GET").unwrap_err(),
            ParseError::ExpectedRequestLine { line: 1, .. }
        ));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(parse_document("").unwrap().is_empty());
        assert!(parse_document(" \r \n \t ").unwrap().is_empty());
        assert!(parse_document("###\n###\n").unwrap().is_empty());
    }

    #[test]
    fn test_basic_request() {
        let requests = parse_requests("\n    GET https://jsonplaceholder.typicode.com/todos/1\n  ");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::GET);
        assert_eq!(requests[0].url, "https://jsonplaceholder.typicode.com/todos/1");
        assert_eq!(requests[0].line, 2);
        assert!(requests[0].headers.is_empty());
        assert_eq!(requests[0].body, None);
    }

    #[test]
    fn test_url_keeps_trailing_content() {
        let requests = parse_requests("GET https://example.com/a b HTTP/1.1");
        assert_eq!(requests[0].url, "https://example.com/a b HTTP/1.1");
    }

    #[test]
    fn test_variables_are_attached() {
        let requests = parse_requests(
            "\n    @hostname=localhost\n    @port=3000\n    @host={{hostname}}:{{port}}\n    GET https://{{host}}/todos/1\n",
        );
        let request = &requests[0];
        assert_eq!(request.url, "https://{{host}}/todos/1");
        assert_eq!(request.variables.len(), 3);
        assert_eq!(
            request.variables.get("host"),
            Some(&Variable::local("{{hostname}}:{{port}}"))
        );
    }

    #[test]
    fn test_whitespace_and_comments_are_ignored() {
        let content = "\n\n \u{000B} \t\n # foo \n\nGET https://x/todos/1\n\n #  foo \n\n###\n\n // bar \n\nPOST https://x/todos/1\n\n //  bar \n\n";
        let requests = parse_requests(content);
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, HttpMethod::GET);
        assert_eq!(requests[0].body, None);
        assert_eq!(requests[1].method, HttpMethod::POST);
        assert_eq!(requests[1].body, None);
    }

    #[test]
    fn test_headers_are_trimmed_and_ordered() {
        let requests = parse_requests(
            "GET https://x\n\n\t content-type \t : \t application/json \t\n\n\t x-foo \t : \t bar \t\n",
        );
        assert_eq!(
            requests[0].headers,
            vec![
                Header::new("content-type", "application/json"),
                Header::new("x-foo", "bar")
            ]
        );
    }

    #[test]
    fn test_duplicated_headers_are_kept() {
        let requests = parse_requests(
            "GET https://x\ncontent-type: application/json\nx-foo: bar\nx-foo: baz\n",
        );
        assert_eq!(requests[0].headers.len(), 3);
        assert_eq!(
            requests[0].headers_text(),
            "content-type: application/json\nx-foo: bar\nx-foo: baz"
        );
    }

    #[test]
    fn test_many_requests() {
        let requests = parse_requests(
            "GET https://x/1\n###\nPOST https://x/1\n{}\n###\nPATCH https://x/1\nx-foo: bar\n{}\n",
        );
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[1].body.as_deref(), Some("{}"));
        assert_eq!(requests[2].headers, vec![Header::new("x-foo", "bar")]);
        assert_eq!(requests[2].body.as_deref(), Some("{}"));
    }

    #[test]
    fn test_body_is_trimmed_only_at_the_ends() {
        let requests = parse_requests(
            "GET https://x\nx-foo: bar\n\n \t \n\n \t foo     bar \t\n\n   line two\n\n",
        );
        assert_eq!(
            requests[0].body.as_deref(),
            Some("foo     bar \t\n\n   line two")
        );
    }

    #[test]
    fn test_json_body_is_decoded() {
        let requests = parse_requests(
            "POST https://x\nContent-Type: application/json; charset=utf-8\n\n{\n  \"name\": \"{{name}}\",\n  \"age\": 30\n}\n",
        );
        assert_eq!(
            requests[0].json,
            Some(json!({"name": "{{name}}", "age": 30}))
        );
        assert!(requests[0].body.as_deref().unwrap().contains("\"age\": 30"));
    }

    #[test]
    fn test_invalid_json_body_is_fatal() {
        let err = parse_document("POST https://x\ncontent-type: application/JSON\n\n{nope\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidJsonBody { line: 4, .. }));
    }

    #[test]
    fn test_non_json_body_is_not_decoded() {
        let requests = parse_requests("POST https://x\ncontent-type: text/plain\n\n{nope\n");
        assert_eq!(requests[0].json, None);
        assert_eq!(requests[0].body.as_deref(), Some("{nope"));
    }

    #[test]
    fn test_named_requests() {
        let requests = parse_requests("\n    // @name foo\n    GET https://x/todos/1\n");
        assert_eq!(requests[0].meta.name(), Some("foo"));
    }

    #[test]
    fn test_only_a_single_name_per_block() {
        let err = parse_document("\n// @name foo\n@a=1\n// @name bar\nGET https://x\n").unwrap_err();
        assert_eq!(err, ParseError::DuplicateName { line: 5 });
    }

    #[test]
    fn test_name_may_repeat_across_blocks() {
        let requests = parse_requests("# @name foo\nGET https://x\n###\n# @name bar\nGET https://y\n");
        assert_eq!(requests[0].meta.name(), Some("foo"));
        assert_eq!(requests[1].meta.name(), Some("bar"));
    }

    #[test]
    fn test_trailing_globals_become_partial_record() {
        let document = parse_document("GET {{base}}/a\n###\n@@base=https://x\n@@flag\n").unwrap();
        assert_eq!(document.records.len(), 2);
        match &document.records[1] {
            Record::Partial(partial) => {
                assert_eq!(partial.variables.len(), 2);
                assert_eq!(
                    partial.variables.get("flag").map(|v| &v.value),
                    Some(&VariableValue::Flag(true))
                );
                assert_eq!(partial.line, 3);
            }
            other => panic!("Expected partial record, got {:?}", other),
        }
        assert_eq!(document.global_variables().len(), 2);
    }

    #[test]
    fn test_comments_inside_body_are_kept() {
        let requests = parse_requests("POST https://x\n\nfirst\n# not a directive\nlast\n");
        assert_eq!(
            requests[0].body.as_deref(),
            Some("first\n# not a directive\nlast")
        );
    }

    #[test]
    fn test_extension_methods() {
        let requests = parse_requests("PROPFIND https://x/dav");
        assert_eq!(
            requests[0].method,
            HttpMethod::Extension("PROPFIND".to_string())
        );
    }
}
