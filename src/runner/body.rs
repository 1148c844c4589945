//! Response body decoding shared by transports.

use super::error::TransportError;
use serde_json::Value;

/// Decodes raw response bytes according to the response content type.
///
/// - `text/*` becomes a string.
/// - Any content type mentioning `json` is parsed; an empty body is `null`.
/// - Everything else, including a missing content type, is hex-encoded.
///
/// Empty results (empty text, `null`, no bytes) yield `None` so the outcome
/// carries no `body` field.
pub fn decode_body(content_type: Option<&str>, bytes: &[u8]) -> Result<Option<Value>, TransportError> {
    let content_type = content_type.unwrap_or_default().to_ascii_lowercase();

    let value = if content_type.starts_with("text/") {
        Value::String(String::from_utf8_lossy(bytes).into_owned())
    } else if content_type.contains("json") {
        let text = String::from_utf8_lossy(bytes);
        if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| TransportError::DecodeError(e.to_string()))?
        }
    } else {
        Value::String(hex::encode(bytes))
    };

    Ok(match value {
        Value::Null => None,
        Value::String(ref text) if text.is_empty() => None,
        other => Some(other),
    })
}
