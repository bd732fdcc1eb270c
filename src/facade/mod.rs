mod outbox;

pub use outbox::{ManageCommand, RequestOutbox};
