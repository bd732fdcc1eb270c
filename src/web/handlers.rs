use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::Html;
use serde::Deserialize;
use tracing::{error, warn};

use super::{AppState, Result, WebError, view};
use crate::core::{CapturedEntry, OutboxError, Payload};
use crate::facade::ManageCommand;

#[derive(Debug, Deserialize)]
pub struct CaptureParams {
    #[serde(rename = "targetUrl")]
    target_url: Option<String>,
}

/// Capture an inbound request of any method and acknowledge with the
/// stored entry.
pub async fn capture(
    State(outbox): State<AppState>,
    method: Method,
    Query(params): Query<CaptureParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CapturedEntry>> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let payload = Payload::from_bytes(content_type, &body);

    let entry = outbox
        .capture(method.as_str(), params.target_url.as_deref(), &headers, payload)
        .await
        .map_err(|err| {
            if !matches!(err, OutboxError::MissingTarget) {
                warn!(error = %err, "capturing request failed");
            }
            WebError::from(err)
        })?;

    Ok(Json((*entry).clone()))
}

/// Apply an operator batch. 200 with an empty body on success; 500 with
/// the failing forward's description on a transport failure.
pub async fn manage(
    State(outbox): State<AppState>,
    Json(command): Json<ManageCommand>,
) -> Result<StatusCode> {
    outbox.manage(command).await.map_err(|err| {
        if let OutboxError::ForwardTransport(failure) = &err {
            error!(request = %failure.request, reason = %failure.reason, "forwarding failed");
        }
        WebError::from(err)
    })?;
    Ok(StatusCode::OK)
}

/// Inspection page: current entries, most recent capture first.
pub async fn index(State(outbox): State<AppState>) -> Html<String> {
    let entries = outbox.entries().await;
    Html(view::render_manage_page(&outbox.config().callback, &entries))
}
