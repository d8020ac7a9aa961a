//! API endpoint handlers

pub mod health;
pub mod workflows;

pub use health::health;
pub use workflows::{delete_workflow, get_workflow, list_workflows, run_workflow, save_workflow};
