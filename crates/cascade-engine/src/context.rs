//! Runtime state accumulated during a single workflow run

use serde_json::{Map, Value};

/// Execution context for one run: node results, workflow config, and the
/// caller-supplied trigger payload.
///
/// Each node's result is written exactly once, on its final successful
/// attempt; the result map only grows during a run. Config is read-only.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    node_results: Map<String, Value>,
    config: Map<String, Value>,
    trigger_data: Value,
}

impl ExecutionContext {
    /// Create a fresh context for a run
    pub fn new(config: Map<String, Value>, trigger_data: Value) -> Self {
        Self {
            node_results: Map::new(),
            config,
            trigger_data,
        }
    }

    /// Look up a config value by key
    pub fn config(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }

    /// The trigger payload supplied alongside the run request
    pub fn trigger_data(&self) -> &Value {
        &self.trigger_data
    }

    /// The published result of a node, if it has executed
    pub fn node_result(&self, id: &str) -> Option<&Value> {
        self.node_results.get(id)
    }

    /// Publish a node's result
    pub fn record_result(&mut self, id: &str, result: Value) {
        self.node_results.insert(id.to_string(), result);
    }

    /// All node results accumulated so far
    pub fn node_results(&self) -> &Map<String, Value> {
        &self.node_results
    }

    /// Consume the context, yielding the result map
    pub fn into_node_results(self) -> Map<String, Value> {
        self.node_results
    }
}
