//! Shared fixtures for integration tests.

pub mod document_test;
pub mod properties_test;
pub mod request_chaining_test;

use http_script::models::{ResolvedRequest, ResponseRecord};
use http_script::runner::{Transport, TransportError};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::sync::Once;
use tempfile::TempDir;

static INIT: Once = Once::new();

/// Initialize test environment (run once)
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Writes a `.http` file into `dir` and returns its path.
pub fn write_http_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write test file");
    path
}

/// JSON response with the headers a typical API sends.
pub fn json_response(status: u16, status_text: &str, body: Value) -> ResponseRecord {
    ResponseRecord::new(status, status_text)
        .with_header("content-type", "application/json")
        .with_header("date", "Mon, 01 Jan 2024 00:00:00 GMT")
        .with_body(body)
}

/// Transport that answers by method and URL, recording every request.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Vec<(String, String, ResponseRecord)>,
    pub sent: Vec<ResolvedRequest>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, method: &str, url: &str, response: ResponseRecord) -> Self {
        self.routes
            .push((method.to_string(), url.to_string(), response));
        self
    }
}

impl Transport for MockTransport {
    fn send(&mut self, request: &ResolvedRequest) -> Result<ResponseRecord, TransportError> {
        self.sent.push(request.clone());
        self.routes
            .iter()
            .find(|(method, url, _)| method == request.method.as_str() && *url == request.url)
            .map(|(_, _, response)| response.clone())
            .ok_or_else(|| {
                TransportError::NetworkError(format!(
                    "connection refused: {} {}",
                    request.method, request.url
                ))
            })
    }
}
