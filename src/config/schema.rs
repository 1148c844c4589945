//! Runner settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings that shape how a document is executed and snapshotted.
///
/// Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerConfig {
    /// Request timeout in milliseconds. Defaults to 30000.
    ///
    /// Must be greater than 0.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Whether the native transport follows 3xx redirects. Defaults to true.
    #[serde(default = "default_follow_redirects")]
    pub follow_redirects: bool,

    /// Redirect limit when `follow_redirects` is set. Defaults to 10.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,

    /// Response headers whose values are always redacted in snapshots,
    /// compared case-insensitively. Defaults to `age` and `date`.
    #[serde(default = "default_ignored_headers")]
    pub ignored_headers: Vec<String>,

    /// Methods sent without a body even when one is written. Defaults to
    /// `GET` and `HEAD`.
    #[serde(default = "default_bodyless_methods")]
    pub bodyless_methods: Vec<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            follow_redirects: default_follow_redirects(),
            max_redirects: default_max_redirects(),
            ignored_headers: default_ignored_headers(),
            bodyless_methods: default_bodyless_methods(),
        }
    }
}

impl RunnerConfig {
    /// Validates the configuration and returns a message for the first invalid
    /// setting.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout == 0 {
            return Err("timeout must be greater than 0".to_string());
        }

        if let Some(method) = self
            .bodyless_methods
            .iter()
            .find(|m| m.is_empty() || !m.bytes().all(|b| b.is_ascii_uppercase()))
        {
            return Err(format!(
                "bodylessMethods entries must be uppercase methods, found \"{}\"",
                method
            ));
        }

        if self.ignored_headers.iter().any(|h| h.trim().is_empty()) {
            return Err("ignoredHeaders entries must not be empty".to_string());
        }

        Ok(())
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    /// Whether `method` is sent without a body.
    pub fn is_bodyless(&self, method: &str) -> bool {
        self.bodyless_methods.iter().any(|m| m == method)
    }

    /// Whether the response header `name` is always redacted.
    pub fn is_ignored_header(&self, name: &str) -> bool {
        self.ignored_headers
            .iter()
            .any(|h| h.eq_ignore_ascii_case(name))
    }
}

fn default_timeout() -> u64 {
    30000
}

fn default_follow_redirects() -> bool {
    true
}

fn default_max_redirects() -> u32 {
    10
}

fn default_ignored_headers() -> Vec<String> {
    vec!["age".to_string(), "date".to_string()]
}

fn default_bodyless_methods() -> Vec<String> {
    vec!["GET".to_string(), "HEAD".to_string()]
}
