//! Node executors
//!
//! One module per built-in node type. Every executor resolves the node's
//! parameters through the template resolver, performs its side effect, and
//! publishes a result map into the execution context under the node's id.

pub mod condition;
pub mod http;
pub mod sql;
pub mod trigger;

pub use sql::{QueryRunner, SqlxQueryRunner};
