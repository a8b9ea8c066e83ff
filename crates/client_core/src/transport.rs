//! HTTP implementation of [`ReportService`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use shared::{
    domain::{ReportDescriptor, ReportResult},
    error::ReportFailure,
};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::ReportService;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid report backend url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("report backend url '{0}' cannot carry path segments")]
    CannotBeABase(String),
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Talks to a report backend exposing:
///
/// - `GET  {base}/reports`
/// - `POST {base}/reports/{report_id}/run`
pub struct HttpReportService {
    http: Client,
    base_url: Url,
}

impl HttpReportService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let parsed = Url::parse(base_url.trim()).map_err(|source| TransportError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        if parsed.cannot_be_a_base() {
            return Err(TransportError::CannotBeABase(base_url.to_string()));
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl ReportService for HttpReportService {
    async fn list_reports(&self) -> Result<Vec<ReportDescriptor>, ReportFailure> {
        let url = self.endpoint(&["reports"]);
        debug!(%url, "listing reports");
        let (status, body) = send(self.http.get(url)).await?;
        if !status.is_success() {
            return Err(failure_from_error_response(status, &body));
        }
        serde_json::from_slice(&body)
            .map_err(|err| ReportFailure::message(format!("invalid report catalog payload: {err}")))
    }

    async fn execute_report(&self, report_id: &str) -> Result<Option<ReportResult>, ReportFailure> {
        let url = self.endpoint(&["reports", report_id, "run"]);
        debug!(report_id, %url, "executing report");
        let (status, body) = send(self.http.post(url)).await?;
        if !status.is_success() {
            return Err(failure_from_error_response(status, &body));
        }
        if status == StatusCode::NO_CONTENT || body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice::<Option<ReportResult>>(&body)
            .map_err(|err| ReportFailure::message(format!("invalid report payload: {err}")))
    }
}

async fn send(request: reqwest::RequestBuilder) -> Result<(StatusCode, Vec<u8>), ReportFailure> {
    let response = request.send().await.map_err(|err| {
        warn!("report backend request failed: {err}");
        ReportFailure::message(format!("report backend request failed: {err}"))
    })?;
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|err| ReportFailure::message(format!("failed to read report backend response: {err}")))?;
    Ok((status, body.to_vec()))
}

/// Wraps a non-2xx response as `{status, body}`.
///
/// JSON bodies are kept as-is, except that a list of errors is narrowed to its
/// first entry. Text bodies, plain or JSON-encoded, become `{message: <text>}`.
fn failure_from_error_response(status: StatusCode, body: &[u8]) -> ReportFailure {
    warn!(status = status.as_u16(), "report backend returned an error status");
    let body = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Array(mut errors)) if !errors.is_empty() => errors.swap_remove(0),
        Ok(value) => value,
        Err(_) => Value::String(String::from_utf8_lossy(body).into_owned()),
    };
    let body = match body {
        Value::String(text) if text.trim().is_empty() => {
            json!({ "message": format!("report backend returned HTTP {status}") })
        }
        Value::String(text) => json!({ "message": text.trim() }),
        other => other,
    };
    ReportFailure::http(status.as_u16(), body)
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
