pub mod entry;
pub mod error;

pub use entry::{CapturedEntry, Payload, filter_headers};
pub use error::{ForwardFailure, OutboxError, Result};
