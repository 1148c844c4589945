//! Request chaining and session workflow tests.
//!
//! These run whole documents through a [`Session`] with a mock transport and
//! check that outcomes of named requests feed later requests.

use super::{init_test_env, json_response, MockTransport};
use http_script::config::{load_config, RunnerConfig};
use http_script::models::{HttpMethod, ResponseRecord};
use http_script::runner::{run_document, RunError, RunSummary, Session, TransportError};
use http_script::variables::{VarError, REDACTED};
use http_script::parse_document;
use serde_json::json;
use serial_test::serial;
use std::collections::HashMap;

#[test]
fn test_status_of_previous_request() {
    init_test_env();

    let content = "# @name first\nGET https://x/1\n\n###\n\nGET https://x/{{first.$.response.status}}\n";
    let transport = MockTransport::new()
        .route("GET", "https://x/1", json_response(200, "OK", json!({})))
        .route("GET", "https://x/200", json_response(200, "OK", json!({})));

    let document = parse_document(content).unwrap();
    let mut session = Session::new(&document, HashMap::new(), RunnerConfig::default(), transport);
    let reports = session.run();

    assert!(RunSummary::from_reports(&reports).is_success());
    let transport = session.into_transport();
    assert_eq!(transport.sent[1].url, "https://x/200");
}

#[test]
fn test_login_token_workflow() {
    init_test_env();

    let content = r#"@@base=https://api.example.com

# @name login
# @status 200 OK
POST {{base}}/auth/login
Content-Type: application/json

{"username": "{{user}}", "password": "pass"}

###

# @name profile
# @expect $.response.body.name "Test User"
GET {{base}}/me
Authorization: Bearer {{login.$.response.body.token}}

###

# @expect $.request.headers[0][1] "u-42"
DELETE {{base}}/users/{{profile.$.response.body.id}}
X-User: {{profile.$.response.body.id}}
"#;

    let transport = MockTransport::new()
        .route(
            "POST",
            "https://api.example.com/auth/login",
            json_response(200, "OK", json!({"token": "tok-123"})),
        )
        .route(
            "GET",
            "https://api.example.com/me",
            json_response(200, "OK", json!({"id": "u-42", "name": "Test User"})),
        )
        .route(
            "DELETE",
            "https://api.example.com/users/u-42",
            ResponseRecord::new(204, "No Content"),
        );

    let env = HashMap::from([("user".to_string(), "test".to_string())]);
    let document = parse_document(content).unwrap();
    let mut session = Session::new(&document, env, RunnerConfig::default(), transport);
    let reports = session.run();

    for report in &reports {
        assert!(report.passed(), "{} failed: {:?}", report.title, report.status);
    }
    assert_eq!(reports[0].title, "POST https://api.example.com/auth/login");
    assert_eq!(reports[0].name.as_deref(), Some("login"));

    let names: Vec<&String> = session.outcomes().names().collect();
    assert_eq!(names, vec!["login", "profile"]);

    let transport = session.into_transport();
    assert_eq!(
        transport.sent[0].body.as_deref(),
        Some(r#"{"username": "test", "password": "pass"}"#)
    );
    assert_eq!(transport.sent[1].headers[0].value, "Bearer tok-123");
    assert_eq!(transport.sent[2].method, HttpMethod::DELETE);
}

#[test]
fn test_reference_to_later_request_fails() {
    let content = "GET https://x/{{second.$.response.status}}\n###\n# @name second\nGET https://x/2\n";
    let transport = MockTransport::new().route("GET", "https://x/2", json_response(200, "OK", json!({})));

    let reports = run_document(content, HashMap::new(), RunnerConfig::default(), transport).unwrap();
    assert_eq!(
        reports[0].error(),
        Some(&RunError::Resolve(VarError::UndefinedVariable(
            "second.$.response.status".to_string()
        )))
    );
    assert!(reports[1].passed());
}

#[test]
fn test_failed_request_is_not_registered() {
    let content = "# @name down\nGET https://down/\n###\nGET https://x/{{down.$.response.status}}\n";
    let transport = MockTransport::new();

    let document = parse_document(content).unwrap();
    let mut session = Session::new(&document, HashMap::new(), RunnerConfig::default(), transport);
    let reports = session.run();

    assert!(matches!(
        reports[0].error(),
        Some(RunError::Transport(TransportError::NetworkError(_)))
    ));
    assert!(matches!(
        reports[1].error(),
        Some(RunError::Resolve(VarError::UndefinedVariable(_)))
    ));
    assert!(session.outcomes().is_empty());
}

#[test]
fn test_throws_on_transport_failure() {
    let content = "# @throws connection refused\nGET https://unreachable/\n";
    let reports = run_document(content, HashMap::new(), RunnerConfig::default(), MockTransport::new()).unwrap();
    assert!(reports[0].passed());
}

#[test]
fn test_snapshot_uses_configured_headers() {
    let settings = json!({
        "http-script": { "ignoredHeaders": ["x-request-id"] }
    });
    let config = load_config(Some(settings)).unwrap();

    let response = json_response(200, "OK", json!({"id": 7})).with_header("X-Request-Id", "r-1");
    let transport = MockTransport::new().route("GET", "https://x/", response);

    let reports = run_document("GET https://x/\n", HashMap::new(), config, transport).unwrap();
    let snapshot = reports[0].snapshot.as_ref().unwrap();
    assert_eq!(
        snapshot["response"]["headers"],
        json!([
            ["content-type", "application/json"],
            ["date", "Mon, 01 Jan 2024 00:00:00 GMT"],
            ["X-Request-Id", REDACTED]
        ])
    );
}

#[test]
fn test_configured_bodyless_methods() {
    let config = RunnerConfig {
        bodyless_methods: vec!["GET".to_string(), "HEAD".to_string(), "DELETE".to_string()],
        ..Default::default()
    };
    let transport = MockTransport::new().route("DELETE", "https://x/1", ResponseRecord::new(204, "No Content"));

    let document = parse_document("DELETE https://x/1\n\n{\"force\": true}\n").unwrap();
    let mut session = Session::new(&document, HashMap::new(), config, transport);
    session.run();

    assert_eq!(session.into_transport().sent[0].body, None);
}

#[test]
#[serial]
fn test_process_env_in_headers() {
    std::env::set_var("HTTP_SCRIPT_IT_TOKEN", "env-token");

    let content = "GET https://x/\nAuthorization: Bearer {{$processEnv HTTP_SCRIPT_IT_TOKEN}}\n";
    let transport = MockTransport::new().route("GET", "https://x/", json_response(200, "OK", json!(null)));

    let document = parse_document(content).unwrap();
    let mut session = Session::new(&document, HashMap::new(), RunnerConfig::default(), transport);
    let reports = session.run();
    std::env::remove_var("HTTP_SCRIPT_IT_TOKEN");

    assert!(reports[0].passed());
    assert_eq!(
        session.into_transport().sent[0].headers[0].value,
        "Bearer env-token"
    );
}
