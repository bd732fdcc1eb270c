//! HTTP surface: capture, manage, and the inspection page.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::{ForwardFailure, OutboxError};
use crate::facade::RequestOutbox;

pub mod handlers;
pub mod view;

pub type AppState = Arc<RequestOutbox>;

/// Assemble the router over a shared outbox. CORS is permissive on all
/// routes so the capture endpoint accepts browser-originated traffic.
pub fn router(outbox: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/capture", any(handlers::capture))
        .route("/manage", post(handlers::manage))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(outbox)
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Body of the 500 answer for a forward that failed at the transport
/// level. `status` is always null here: the call never completed, so
/// there is no HTTP status to report.
#[derive(Debug, Serialize)]
pub struct ForwardErrorResponse {
    pub status: Option<u16>,
    pub request: String,
    pub response: String,
}

#[derive(Debug)]
pub enum WebError {
    MissingTarget,
    Forward(ForwardFailure),
    Internal(String),
}

impl From<OutboxError> for WebError {
    fn from(err: OutboxError) -> Self {
        match err {
            OutboxError::MissingTarget => Self::MissingTarget,
            OutboxError::ForwardTransport(failure) => Self::Forward(failure),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::MissingTarget => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "missing targetUrl query parameter".to_string(),
                    details: None,
                }),
            )
                .into_response(),
            WebError::Forward(failure) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ForwardErrorResponse {
                    status: None,
                    request: failure.request,
                    response: failure.reason,
                }),
            )
                .into_response(),
            WebError::Internal(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "capturing request failed".to_string(),
                    details: Some(details),
                }),
            )
                .into_response(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WebError>;
