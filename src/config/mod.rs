//! Configuration loading.
//!
//! Settings live under the `"http-script"` key of a JSON settings object and
//! are layered over [`RunnerConfig::default`].

pub mod schema;

pub use schema::RunnerConfig;

use serde_json::Value;
use std::fs;
use std::path::Path;

/// Key under which runner settings are read.
pub const SETTINGS_KEY: &str = "http-script";

/// Loads configuration from an optional settings value.
///
/// Settings that fail to deserialize are reported with a warning and replaced
/// by the defaults. Settings that deserialize but fail validation are an
/// error.
///
/// # Example
///
/// ```
/// use http_script::config::load_config;
/// use serde_json::json;
///
/// let settings = json!({
///     "http-script": {
///         "timeout": 5000,
///         "ignoredHeaders": ["date", "x-request-id"]
///     }
/// });
///
/// let config = load_config(Some(settings)).unwrap();
/// assert_eq!(config.timeout, 5000);
/// assert_eq!(config.bodyless_methods, vec!["GET", "HEAD"]);
/// ```
pub fn load_config(settings_json: Option<Value>) -> Result<RunnerConfig, String> {
    let mut config = RunnerConfig::default();

    if let Some(settings) = settings_json.as_ref().and_then(|s| s.get(SETTINGS_KEY)) {
        match serde_json::from_value::<RunnerConfig>(settings.clone()) {
            Ok(user_config) => config = user_config,
            Err(e) => {
                log::warn!(
                    "Failed to parse {} settings: {}. Using defaults.",
                    SETTINGS_KEY,
                    e
                );
            }
        }
    }

    config
        .validate()
        .map_err(|e| format!("Invalid configuration: {}", e))?;

    log::debug!("loaded configuration: {:?}", config);
    Ok(config)
}

/// Reads a JSON settings file and loads configuration from it.
pub fn load_config_file(path: &Path) -> Result<RunnerConfig, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let settings: Value = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;

    load_config(Some(settings))
}
