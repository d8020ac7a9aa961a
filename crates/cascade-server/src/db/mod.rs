//! Workflow document persistence

pub mod connection;
pub mod error;
pub mod store;

pub use connection::{DatabaseConnection, DatabasePool};
pub use error::StoreError;
pub use store::WorkflowStore;
