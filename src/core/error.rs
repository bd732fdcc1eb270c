use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Wire-stable description of a forward attempt that failed at the
/// transport level (timeout, connection refused, DNS).
///
/// There is no HTTP status in this case; the manage endpoint reports
/// the failure as `{status: null, request, response}`.
#[derive(Debug, Clone, Serialize)]
pub struct ForwardFailure {
    pub id: Uuid,
    /// `"METHOD url"` of the attempted forward.
    pub request: String,
    pub reason: String,
}

#[derive(Error, Debug)]
pub enum OutboxError {
    #[error("missing targetUrl query parameter")]
    MissingTarget,

    #[error("duplicate entry id '{0}'")]
    DuplicateId(Uuid),

    #[error("forwarding '{}' failed: {}", .0.request, .0.reason)]
    ForwardTransport(ForwardFailure),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, OutboxError>;
