//! Engine facade and graph walker
//!
//! The engine owns a parsed workflow document and the execution context for
//! one run. Execution is strictly sequential: the walker starts at the node
//! with position 1, runs each node through its retry schedule, and follows
//! one outgoing connection at a time until the graph runs out or a node
//! fails for good.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::context::ExecutionContext;
use crate::executors::{self, QueryRunner, SqlxQueryRunner};
use crate::model::{Node, Workflow};
use crate::retry::RetrySchedule;
use crate::{EngineError, Result};

/// Per-request timeout applied to the default HTTP client
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Default cap on node executions per run; cyclic graphs hit this instead
/// of spinning forever
pub const DEFAULT_STEP_LIMIT: usize = 1000;

/// Executes one workflow run and exposes the accumulated node results.
///
/// An engine instance is built from a workflow document plus the caller's
/// trigger payload, run to completion or failure, and then discarded;
/// nothing persists across runs.
pub struct WorkflowEngine {
    workflow: Workflow,
    context: ExecutionContext,
    http: reqwest::Client,
    queries: Arc<dyn QueryRunner>,
    step_limit: usize,
}

impl std::fmt::Debug for WorkflowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowEngine")
            .field("workflow", &self.workflow)
            .field("context", &self.context)
            .field("step_limit", &self.step_limit)
            .finish_non_exhaustive()
    }
}

impl WorkflowEngine {
    /// Create an engine from an already parsed workflow document
    pub fn new(workflow: Workflow, trigger_data: Value) -> Self {
        let context = ExecutionContext::new(workflow.config.clone(), trigger_data);
        Self {
            workflow,
            context,
            http: default_http_client(),
            queries: Arc::new(SqlxQueryRunner::new()),
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }

    /// Parse a workflow document and create an engine for it
    pub fn from_json(document: &str, trigger_data: Value) -> Result<Self> {
        let workflow = Workflow::from_json(document)?;
        Ok(Self::new(workflow, trigger_data))
    }

    /// Replace the HTTP client used by `httpRequest` nodes
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Replace the query runner used by `sqlQuery` nodes
    pub fn with_query_runner(mut self, runner: Arc<dyn QueryRunner>) -> Self {
        self.queries = runner;
        self
    }

    /// Override the per-run node execution cap
    pub fn with_step_limit(mut self, step_limit: usize) -> Self {
        self.step_limit = step_limit;
        self
    }

    /// Run the workflow to completion or the first fatal error
    pub async fn execute(&mut self) -> Result<()> {
        info!(workflow = %self.workflow.info.name, "starting workflow");

        let mut current = self
            .workflow
            .start_node()
            .cloned()
            .ok_or(EngineError::NoStartNode)?;
        let mut steps = 0usize;

        loop {
            steps += 1;
            if steps > self.step_limit {
                return Err(EngineError::StepLimitExceeded {
                    steps: self.step_limit,
                });
            }

            info!(node = %current.name, id = %current.id, "executing node");
            self.execute_node(&current).await?;

            let Some(next_id) = self.next_node_id(&current) else {
                break;
            };
            current = self
                .workflow
                .node_by_id(&next_id)
                .cloned()
                .ok_or(EngineError::NodeNotFound(next_id))?;
        }

        info!(workflow = %self.workflow.info.name, "workflow completed");
        Ok(())
    }

    /// Node results accumulated so far; after a failed run this still holds
    /// every node that completed before the failure
    pub fn results(&self) -> &Map<String, Value> {
        self.context.node_results()
    }

    /// Consume the engine, yielding the node results
    pub fn into_results(self) -> Map<String, Value> {
        self.context.into_node_results()
    }

    /// Run one node through its retry schedule
    async fn execute_node(&mut self, node: &Node) -> Result<()> {
        let schedule = RetrySchedule::for_policy(&node.retry);
        let mut last_error = None;

        for attempt in 1..=schedule.max_attempts {
            debug!(node = %node.name, attempt, max_attempts = schedule.max_attempts, "attempt");
            match self.dispatch(node).await {
                Ok(()) => {
                    debug!(node = %node.name, "node executed successfully");
                    return Ok(());
                }
                Err(error) => {
                    if attempt < schedule.max_attempts {
                        warn!(
                            node = %node.name,
                            attempt,
                            max_attempts = schedule.max_attempts,
                            error = %error,
                            delay_ms = schedule.delay.as_millis() as u64,
                            "node failed, retrying after delay"
                        );
                        tokio::time::sleep(schedule.delay).await;
                    }
                    last_error = Some(error);
                }
            }
        }

        Err(EngineError::RetryExhausted {
            node: node.name.clone(),
            attempts: schedule.max_attempts,
            source: Box::new(last_error.unwrap_or_else(|| {
                EngineError::Action("node produced no attempts".to_string())
            })),
        })
    }

    /// Dispatch a node to the executor for its type
    async fn dispatch(&mut self, node: &Node) -> Result<()> {
        match node.node_type.as_str() {
            "trigger" => executors::trigger::execute(node, &mut self.context),
            "httpRequest" => executors::http::execute(node, &mut self.context, &self.http).await,
            "sqlQuery" => {
                executors::sql::execute(node, &mut self.context, self.queries.as_ref()).await
            }
            "if" => executors::condition::execute(node, &mut self.context),
            other => Err(EngineError::UnsupportedNodeType(other.to_string())),
        }
    }

    /// Pick the next node to execute, if any.
    ///
    /// Outgoing connections are considered in declaration order. An `if`
    /// node follows the first connection whose branch tag matches its
    /// published `conditionResult`; when no branch matches, and for every
    /// other node type, the first connection wins.
    fn next_node_id(&self, current: &Node) -> Option<String> {
        let connections = self.workflow.connections_from(&current.id);
        if connections.is_empty() {
            return None;
        }

        if current.node_type == "if" {
            let outcome = self
                .context
                .node_result(&current.id)
                .and_then(|result| result.get("conditionResult"))
                .and_then(Value::as_bool);
            if let Some(outcome) = outcome {
                let wanted = if outcome { "true" } else { "false" };
                if let Some(connection) = connections
                    .iter()
                    .find(|c| c.branch.as_deref() == Some(wanted))
                {
                    return Some(connection.to.clone());
                }
            }
        }

        Some(connections[0].to.clone())
    }
}

fn default_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(DEFAULT_HTTP_TIMEOUT)
        .build()
        .expect("failed to build HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine_for(document: Value, trigger: Value) -> WorkflowEngine {
        WorkflowEngine::from_json(&document.to_string(), trigger).unwrap()
    }

    #[tokio::test]
    async fn trigger_only_workflow_publishes_payload() {
        let document = json!({
            "workflow": {"name": "single"},
            "nodes": [
                {"id": "t", "name": "Start", "type": "trigger", "parameters": {}, "position": 1,
                 "retry": {"enabled": false, "maxAttempts": 0, "delay": 0}}
            ],
            "connections": []
        });
        let mut engine = engine_for(document, json!({"q": "ping"}));
        engine.execute().await.unwrap();

        let results = engine.into_results();
        assert_eq!(results.len(), 1);
        assert_eq!(results["t"]["triggerData"], json!({"q": "ping"}));
    }

    #[tokio::test]
    async fn missing_start_node_fails() {
        let document = json!({
            "workflow": {"name": "no-start"},
            "nodes": [
                {"id": "t", "name": "Start", "type": "trigger", "parameters": {}, "position": 2,
                 "retry": {"enabled": false, "maxAttempts": 0, "delay": 0}}
            ],
            "connections": []
        });
        let mut engine = engine_for(document, Value::Null);
        assert!(matches!(
            engine.execute().await.unwrap_err(),
            EngineError::NoStartNode
        ));
    }

    #[tokio::test]
    async fn unsupported_node_type_fails_as_retry_exhausted() {
        let document = json!({
            "workflow": {"name": "bad-type"},
            "nodes": [
                {"id": "x", "name": "Mystery", "type": "teleport", "parameters": {}, "position": 1,
                 "retry": {"enabled": false, "maxAttempts": 0, "delay": 0}}
            ],
            "connections": []
        });
        let mut engine = engine_for(document, Value::Null);
        let err = engine.execute().await.unwrap_err();
        match err {
            EngineError::RetryExhausted { attempts, source, .. } => {
                assert_eq!(attempts, 1);
                assert!(matches!(*source, EngineError::UnsupportedNodeType(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn dangling_connection_fails_with_node_not_found() {
        let document = json!({
            "workflow": {"name": "dangling"},
            "nodes": [
                {"id": "t", "name": "Start", "type": "trigger", "parameters": {}, "position": 1,
                 "retry": {"enabled": false, "maxAttempts": 0, "delay": 0}}
            ],
            "connections": [{"from": "t", "to": "ghost"}]
        });
        let mut engine = engine_for(document, Value::Null);
        match engine.execute().await.unwrap_err() {
            EngineError::NodeNotFound(id) => assert_eq!(id, "ghost"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn cyclic_graph_hits_the_step_limit() {
        let document = json!({
            "workflow": {"name": "cycle"},
            "nodes": [
                {"id": "a", "name": "A", "type": "trigger", "parameters": {}, "position": 1,
                 "retry": {"enabled": false, "maxAttempts": 0, "delay": 0}},
                {"id": "b", "name": "B", "type": "trigger", "parameters": {}, "position": 2,
                 "retry": {"enabled": false, "maxAttempts": 0, "delay": 0}}
            ],
            "connections": [{"from": "a", "to": "b"}, {"from": "b", "to": "a"}]
        });
        let mut engine = engine_for(document, Value::Null).with_step_limit(10);
        assert!(matches!(
            engine.execute().await.unwrap_err(),
            EngineError::StepLimitExceeded { steps: 10 }
        ));
    }

    #[tokio::test]
    async fn malformed_document_is_a_parse_error() {
        let err = WorkflowEngine::from_json("{]", Value::Null).unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));
    }
}
