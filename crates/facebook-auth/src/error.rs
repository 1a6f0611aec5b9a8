//! Error types for OAuth and Graph API operations
//!
//! Two failure families, split on purpose: local validation failures
//! (malformed cookies, bad signatures) are reported as `None` by the
//! verification functions because "not logged in" is a normal outcome.
//! Only remote failures — an error body from the platform or a transport
//! failure reaching it — surface through `Error`.

use std::fmt;

use serde_json::Value;

/// Errors from token exchange and Graph API calls.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The platform answered with an error body instead of a result.
    #[error("Graph API error: {0}")]
    Api(GraphApiError),

    /// Network-level failure before any platform answer arrived.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was neither a token response nor JSON.
    #[error("unexpected response body: {0}")]
    UnexpectedResponse(String),
}

/// Result alias for OAuth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A parsed platform error body.
///
/// Facebook has shipped several error shapes over the years; the parser
/// tries each known one in order and keeps the raw body for anything it
/// could not classify. All fields other than `message` are optional
/// because no shape carries all of them.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphApiError {
    /// Human-readable message, or the raw body when no shape matched
    pub message: String,
    /// Error class, e.g. "OAuthException"
    pub error_type: Option<String>,
    pub code: Option<i64>,
    pub subcode: Option<i64>,
    /// The response body as received
    pub raw: Value,
}

impl GraphApiError {
    /// Parse an error body, trying each known Facebook error shape:
    /// Graph (`{"error": {...}}`), OAuth 2.0 draft 10
    /// (`error_description`/`error_code`), legacy REST (`error_msg`),
    /// then a raw-body fallback.
    pub fn from_body(body: Value) -> Self {
        // Graph style: {"error": {"message", "type", "code", "error_subcode"}}
        if let Some(err) = body.get("error").and_then(Value::as_object) {
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| body.to_string());
            return Self {
                message,
                error_type: err.get("type").and_then(Value::as_str).map(str::to_owned),
                code: err.get("code").and_then(Value::as_i64),
                subcode: err.get("error_subcode").and_then(Value::as_i64),
                raw: body,
            };
        }

        // OAuth 2.0 draft 10: {"error": "...", "error_description": "..."}
        if let Some(description) = body.get("error_description").and_then(Value::as_str) {
            return Self {
                message: description.to_owned(),
                error_type: body.get("error").and_then(Value::as_str).map(str::to_owned),
                code: body.get("error_code").and_then(Value::as_i64),
                subcode: None,
                raw: body,
            };
        }

        // Legacy REST server style: {"error_msg": "...", "error_code": ...}
        if let Some(msg) = body.get("error_msg").and_then(Value::as_str) {
            return Self {
                message: msg.to_owned(),
                error_type: None,
                code: body.get("error_code").and_then(Value::as_i64),
                subcode: None,
                raw: body,
            };
        }

        Self {
            message: body.to_string(),
            error_type: None,
            code: None,
            subcode: None,
            raw: body,
        }
    }
}

impl fmt::Display for GraphApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
