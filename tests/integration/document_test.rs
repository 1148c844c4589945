//! Parsing and resolution of whole documents.

use super::{init_test_env, write_http_file};
use http_script::models::{Header, HttpMethod, OutcomeTable, Record, Variable, VariableValue};
use http_script::parser::parse_document;
use http_script::variables::{ResolutionScope, VarError};
use http_script::ParseError;
use serde_json::json;
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

fn resolve_first(content: &str, text: &str) -> Result<String, VarError> {
    let document = parse_document(content).unwrap();
    let request = document.requests().next().unwrap();
    let env = HashMap::new();
    let globals = document.global_variables();
    let outcomes = OutcomeTable::new();
    ResolutionScope::new(&env, &globals, &request.variables, &outcomes).resolve(text)
}

#[test]
fn test_example_document() {
    init_test_env();

    let content = "@@domain=foo\n@@port=3000\n@@host={{domain}}:{{port}}\n\n@endpoint=https://{{host}}/bar\nGET {{endpoint}}\n";
    let document = parse_document(content).unwrap();

    let requests: Vec<_> = document.requests().collect();
    assert_eq!(requests.len(), 1);
    let request = requests[0];
    assert_eq!(request.method, HttpMethod::GET);
    assert_eq!(request.url, "{{endpoint}}");
    assert_eq!(request.line, 6);

    let variables: Vec<(&str, &Variable)> = request
        .variables
        .iter()
        .map(|(name, variable)| (name.as_str(), variable))
        .collect();
    assert_eq!(
        variables,
        vec![
            ("domain", &Variable::global("foo")),
            ("port", &Variable::global("3000")),
            ("host", &Variable::global("{{domain}}:{{port}}")),
            ("endpoint", &Variable::local("https://{{host}}/bar")),
        ]
    );

    assert_eq!(
        resolve_first(content, &request.url).unwrap(),
        "https://foo:3000/bar"
    );
}

#[test]
fn test_globals_are_hoisted() {
    let content = "GET https://{{host}}/a\n\n###\n\n@@host=late.example.com\n";
    assert_eq!(
        resolve_first(content, "https://{{host}}/a").unwrap(),
        "https://late.example.com/a"
    );
}

#[test]
fn test_block_global_shadows_later_redeclaration() {
    let content = "@@x=1\nGET https://a/{{x}}\n###\n@@x=2\nGET https://b/{{x}}\n###\nGET https://c/{{x}}\n";
    let document = parse_document(content).unwrap();

    let env = HashMap::new();
    let globals = document.global_variables();
    let outcomes = OutcomeTable::new();
    let urls: Vec<String> = document
        .requests()
        .map(|request| {
            ResolutionScope::new(&env, &globals, &request.variables, &outcomes)
                .resolve(&request.url)
                .unwrap()
        })
        .collect();

    assert_eq!(urls, vec!["https://a/1", "https://b/2", "https://c/2"]);
}

#[test]
fn test_locals_stay_in_their_block() {
    let content = "@token=abc\nGET https://x/1\n\n###\n\nGET https://x/{{token}}\n";
    let document = parse_document(content).unwrap();
    let second = document.requests().nth(1).unwrap();

    let env = HashMap::new();
    let globals = document.global_variables();
    let outcomes = OutcomeTable::new();
    let scope = ResolutionScope::new(&env, &globals, &second.variables, &outcomes);

    assert_eq!(
        scope.resolve(&second.url),
        Err(VarError::UndefinedVariable("token".to_string()))
    );
}

#[test]
fn test_visibility_rule() {
    let content = "@@g={{local}}\n@local=x\nGET https://x/{{g}}\n";
    assert_eq!(
        resolve_first(content, "{{g}}").unwrap_err().to_string(),
        "variable not found on global scope: local"
    );
    assert_eq!(resolve_first(content, "{{local}}").unwrap(), "x");
}

#[test]
fn test_cycle_detection() {
    let content = "@a={{b}}\n@b={{a}}\nGET https://x\n";
    assert_eq!(
        resolve_first(content, "{{a}}"),
        Err(VarError::Cycle {
            path: vec!["a".to_string(), "b".to_string(), "a".to_string()]
        })
    );
}

#[test]
fn test_random_int_validation() {
    let content = "GET https://x\n";
    assert_eq!(
        resolve_first(content, "{{$randomInt a}}").unwrap_err().to_string(),
        "\"a\" is not a integer number"
    );
}

#[test]
fn test_headers_round_trip() {
    let content = "GET https://x\nAccept: application/json\nX-Tag:  one \nX-Tag: two\nAccept: text/plain\n";
    let document = parse_document(content).unwrap();
    let request = document.requests().next().unwrap();

    assert_eq!(
        request.headers_text(),
        "Accept: application/json\nX-Tag: one\nX-Tag: two\nAccept: text/plain"
    );

    let reparsed = parse_document(&format!("GET https://x\n{}\n", request.headers_text())).unwrap();
    assert_eq!(
        reparsed.requests().next().unwrap().headers,
        request.headers
    );
}

#[test]
fn test_parse_errors_carry_line_numbers() {
    let content = "GET https://x/1\n\n###\n\n# @name one\n# @name two\nGET https://x/2\n";
    assert_eq!(
        parse_document(content).unwrap_err(),
        ParseError::DuplicateName { line: 7 }
    );

    let content = "GET https://x/1\n###\nnot a request\n";
    let err = parse_document(content).unwrap_err();
    assert_eq!(err.line(), 3);
    assert_eq!(
        err.to_string(),
        "(line: 3) method + url expected but found: not a request"
    );
}

#[test]
fn test_document_from_file_with_crlf() {
    init_test_env();
    let dir = TempDir::new().unwrap();
    let path = write_http_file(
        &dir,
        "api.http",
        "# @name create\r\nPOST https://api.example.com/items\r\nContent-Type: application/json\r\n\r\n{\r\n  \"name\": \"widget\"\r\n}\r\n###\r\n@@flag\r\n",
    );

    let content = fs::read_to_string(path).unwrap();
    let document = parse_document(&content).unwrap();

    assert_eq!(document.records.len(), 2);
    let request = document.requests().next().unwrap();
    assert_eq!(request.meta.name(), Some("create"));
    assert_eq!(request.headers, vec![Header::new("Content-Type", "application/json")]);
    assert_eq!(request.body.as_deref(), Some("{\n  \"name\": \"widget\"\n}"));
    assert_eq!(request.json, Some(json!({"name": "widget"})));

    match &document.records[1] {
        Record::Partial(partial) => assert_eq!(
            partial.variables.get("flag").map(|v| &v.value),
            Some(&VariableValue::Flag(true))
        ),
        other => panic!("Expected partial record, got {:?}", other),
    }
}

#[test]
fn test_meta_serialization_shape() {
    let content = "# @name req\n# @expect $.response.status 200\n# @expect $.response.body.ok true\n# @ignore $.response.body.id\nGET https://x\n";
    let document = parse_document(content).unwrap();
    let request = document.requests().next().unwrap();

    let meta = serde_json::to_value(&request.meta).unwrap();
    assert_eq!(meta["name"], json!({"value": "req", "global": false}));
    assert_eq!(
        meta["expect"]["value"].as_array().map(Vec::len),
        Some(2)
    );
    assert_eq!(meta["ignore"]["value"][0]["value"], json!("$.response.body.id"));
}
