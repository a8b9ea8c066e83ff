use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// Opaque failure raised by a report backend.
///
/// The payload is kept as loose JSON because backends report errors in
/// different shapes: a nested `body.message`, a top-level `message`, or a
/// bare string.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(transparent)]
#[error("report failure: {0}")]
pub struct ReportFailure(Value);

impl ReportFailure {
    pub fn from_value(payload: Value) -> Self {
        Self(payload)
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self(json!({ "message": message.into() }))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self(Value::String(text.into()))
    }

    pub fn http(status: u16, body: Value) -> Self {
        Self(json!({ "status": status, "body": body }))
    }

    pub fn payload(&self) -> &Value {
        &self.0
    }

    pub fn display_message(&self) -> String {
        error_message_from_value(&self.0)
    }
}

/// Turns any failure payload into a non-empty display string.
///
/// Precedence: `body.message`, then `message`, then the payload itself when it
/// is a string, then [`UNKNOWN_ERROR_MESSAGE`]. Empty strings are skipped.
pub fn error_message_from_value(failure: &Value) -> String {
    let nested = failure
        .get("body")
        .and_then(|body| body.get("message"))
        .and_then(non_empty_str);
    let top_level = failure.get("message").and_then(non_empty_str);
    let bare = non_empty_str(failure);

    nested
        .or(top_level)
        .or(bare)
        .unwrap_or(UNKNOWN_ERROR_MESSAGE)
        .to_string()
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
