//! Blocking HTTP transport backed by `reqwest`.
//!
//! Only available with the `native` feature.

use super::body::decode_body;
use super::error::TransportError;
use super::Transport;
use crate::config::RunnerConfig;
use crate::models::{Header, ResolvedRequest, ResponseRecord};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;

/// Sends requests over the network with a shared blocking client.
#[derive(Debug, Clone)]
pub struct NativeTransport {
    client: Client,
}

impl NativeTransport {
    /// Builds a client honouring the timeout and redirect settings.
    pub fn new(config: &RunnerConfig) -> Result<Self, TransportError> {
        let redirect = if config.follow_redirects {
            Policy::limited(config.max_redirects as usize)
        } else {
            Policy::none()
        };

        let client = Client::builder()
            .timeout(config.timeout_duration())
            .redirect(redirect)
            .build()
            .map_err(|e| TransportError::BuildError(e.to_string()))?;

        Ok(Self { client })
    }
}

impl Transport for NativeTransport {
    fn send(&mut self, request: &ResolvedRequest) -> Result<ResponseRecord, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| TransportError::BuildError(e.to_string()))?;

        let mut builder = self.client.request(method, request.url.as_str());

        for header in &request.headers {
            builder = builder.header(header.name.as_str(), header.value.as_str());
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send()?;

        let status = response.status();
        let headers: Vec<Header> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| Header::new(name.as_str(), value))
            })
            .collect();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes()?;
        let body = decode_body(content_type.as_deref(), &bytes)?;

        Ok(ResponseRecord {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}
