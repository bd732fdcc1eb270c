//! Outbound side of a release: one HTTP call to the entry's original
//! destination, bounded by a fixed timeout.

use std::time::Duration;

use async_trait::async_trait;

use crate::core::{CapturedEntry, ForwardFailure, OutboxError, Payload, Result};

/// Per-request timeout applied to every forward attempt.
pub const FORWARD_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of a completed outbound call.
///
/// Any HTTP status, including 4xx/5xx, counts as delivered; only
/// transport-level failures surface as errors.
#[derive(Debug, Clone)]
pub struct ForwardReceipt {
    pub status: u16,
    pub body: String,
}

/// Boundary for the outbound call performed on release. Pluggable so
/// tests can substitute a scripted client.
#[async_trait]
pub trait ForwardClient: Send + Sync {
    /// Deliver the entry to its original target. Never errors on a
    /// non-2xx status; errors only on timeout, connection failure, or
    /// other transport problems.
    async fn forward(&self, entry: &CapturedEntry) -> Result<ForwardReceipt>;
}

/// `reqwest`-backed forwarder sharing one connection pool.
pub struct ReqwestForwarder {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestForwarder {
    pub fn new() -> Result<Self> {
        Self::with_timeout(FORWARD_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| OutboxError::Internal(format!("building http client: {err}")))?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl ForwardClient for ReqwestForwarder {
    async fn forward(&self, entry: &CapturedEntry) -> Result<ForwardReceipt> {
        let method = reqwest::Method::from_bytes(entry.method.as_bytes())
            .map_err(|err| OutboxError::Internal(format!("method '{}': {err}", entry.method)))?;

        let mut headers = reqwest::header::HeaderMap::new();
        for (name, values) in &entry.headers {
            let name = reqwest::header::HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| OutboxError::Internal(format!("header name '{name}': {err}")))?;
            for value in values {
                let value = reqwest::header::HeaderValue::from_str(value)
                    .map_err(|err| OutboxError::Internal(format!("header value: {err}")))?;
                headers.append(name.clone(), value);
            }
        }

        let mut request = self
            .client
            .request(method, &entry.target_url)
            .headers(headers)
            .timeout(self.timeout);
        request = match &entry.body {
            Payload::Json(value) => request.json(value),
            Payload::Raw(bytes) => request.body(bytes.clone()),
            Payload::Empty => request,
        };

        match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                Ok(ForwardReceipt { status, body })
            }
            Err(err) => Err(OutboxError::ForwardTransport(ForwardFailure {
                id: entry.id,
                request: entry.request_line(),
                reason: err.to_string(),
            })),
        }
    }
}
