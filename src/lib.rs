// ============================================================================
// Request Outbox Library
// ============================================================================

pub mod config;
pub mod core;
pub mod facade;
pub mod forward;
pub mod storage;
pub mod web;

// Re-export main types for convenience
pub use config::OutboxConfig;
pub use crate::core::{CapturedEntry, ForwardFailure, OutboxError, Payload, Result};
pub use facade::{ManageCommand, RequestOutbox};
pub use forward::{ForwardClient, ForwardReceipt, ReqwestForwarder};
pub use storage::{EntryStore, Sweeper};
