//! Workflow execution engine for cascade.
//!
//! This crate parses declarative workflow documents, walks their node graph
//! one node at a time, resolves `{{ … }}` template expressions against
//! workflow config and prior node results, and executes the built-in node
//! actions (trigger passthrough, HTTP request, SQL query, conditional) with
//! a per-node retry budget.

pub mod context;
pub mod engine;
pub mod executors;
pub mod functions;
pub mod model;
pub mod retry;
pub mod template;

use thiserror::Error;

pub use context::ExecutionContext;
pub use engine::{WorkflowEngine, DEFAULT_STEP_LIMIT};
pub use executors::{QueryRunner, SqlxQueryRunner};
pub use model::{Connection, Node, RetryPolicy, Workflow, WorkflowInfo};

/// Errors surfaced by workflow execution
#[derive(Debug, Error)]
pub enum EngineError {
    /// Workflow document is not valid JSON or does not match the expected shape
    #[error("failed to parse workflow document: {0}")]
    Parse(#[from] serde_json::Error),

    /// No node carries position 1, so there is nothing to start from
    #[error("no starting node found")]
    NoStartNode,

    /// A connection points at a node id that does not exist
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// A node's type is not one of the built-in executors
    #[error("unsupported node type: {0}")]
    UnsupportedNodeType(String),

    /// A template expression could not be evaluated
    #[error("template resolution failed: {0}")]
    Resolver(String),

    /// The side effect behind a node failed (HTTP transport or status,
    /// SQL driver, malformed parameters)
    #[error("{0}")]
    Action(String),

    /// A node kept failing after its retry budget was spent
    #[error("node {node} failed after {attempts} attempts: {source}")]
    RetryExhausted {
        /// Human-readable name of the failing node
        node: String,
        /// Number of attempts made
        attempts: u32,
        /// The error from the final attempt
        #[source]
        source: Box<EngineError>,
    },

    /// The walker executed more nodes than the configured cap allows,
    /// which usually means the graph contains a cycle
    #[error("execution aborted after {steps} steps (possible cycle)")]
    StepLimitExceeded { steps: usize },
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
