//! Interpretation of portal responses.
//!
//! Action endpoints wrap everything in `{"success": ..., "result": ...,
//! "error": ...}`. `error` is a plain string on some deployments and an object
//! with `message`/`__type` and per-field details on others.

use crate::types::{NgEsoError, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Response envelope of a portal action.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub(crate) success: bool,
    pub(crate) result: Option<T>,
    #[serde(default)]
    pub(crate) error: Option<Value>,
}

/// `result` of `datastore_search_sql`.
#[derive(Debug, Deserialize)]
pub(crate) struct SqlResult {
    #[serde(default)]
    pub(crate) records: Vec<Value>,
}

/// `result` of `resource_show`.
#[derive(Debug, Deserialize)]
pub(crate) struct ResourceInfo {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) url: Option<String>,
    #[serde(default)]
    pub(crate) datastore_active: bool,
}

/// `result` of `package_show`.
#[derive(Debug, Deserialize)]
pub(crate) struct PackageInfo {
    #[serde(default)]
    pub(crate) resources: Vec<ResourceInfo>,
}

/// Render the envelope's `error` member as one line of text.
pub(crate) fn error_detail(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            let head = map
                .get("message")
                .or_else(|| map.get("__type"))
                .and_then(Value::as_str)
                .unwrap_or("");
            let rest: Vec<String> = map
                .iter()
                .filter(|(k, _)| k.as_str() != "message" && k.as_str() != "__type")
                .map(|(k, v)| format!("{k}: {v}"))
                .collect();
            match (head.is_empty(), rest.is_empty()) {
                (true, true) => error.to_string(),
                (false, true) => head.to_string(),
                (true, false) => rest.join("; "),
                (false, false) => format!("{head}; {}", rest.join("; ")),
            }
        }
        other => other.to_string(),
    }
}

/// Best-effort error text for a failed response body.
fn failure_detail(body: &[u8]) -> String {
    if let Ok(envelope) = serde_json::from_slice::<Envelope<Value>>(body) {
        if let Some(error) = &envelope.error {
            return error_detail(error);
        }
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        "(empty response body)".to_string()
    } else {
        text.chars().take(500).collect()
    }
}

/// Fail on anything but 2xx. Redirects reqwest could not follow land here too.
pub(crate) fn check_status(status: StatusCode, body: &[u8]) -> Result<()> {
    if !status.is_success() {
        return Err(NgEsoError::UnsuccessfulRequest {
            status_code: status.as_u16(),
            detail: failure_detail(body),
        });
    }
    Ok(())
}

/// Check status and envelope, returning the decoded envelope on success.
pub(crate) fn check_envelope<T>(status: StatusCode, body: &[u8]) -> Result<Envelope<T>>
where
    T: DeserializeOwned,
{
    check_status(status, body)?;

    let envelope: Envelope<T> = serde_json::from_slice(body)?;
    if !envelope.success {
        let detail = envelope
            .error
            .as_ref()
            .map(error_detail)
            .unwrap_or_else(|| "portal reported success=false".to_string());
        return Err(NgEsoError::UnsuccessfulRequest {
            status_code: status.as_u16(),
            detail,
        });
    }
    Ok(envelope)
}

/// Number of records in a raw `datastore_search_sql` response.
pub fn record_count(body: &[u8]) -> Result<usize> {
    let envelope: Envelope<SqlResult> = serde_json::from_slice(body)?;
    Ok(envelope.result.map(|r| r.records.len()).unwrap_or(0))
}
