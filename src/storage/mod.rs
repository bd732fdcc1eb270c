pub mod store;
pub mod sweeper;

pub use store::EntryStore;
pub use sweeper::Sweeper;
