//! Workflow document model
//!
//! The types here mirror the JSON shape of a stored workflow document:
//! descriptive metadata, an ordered list of nodes, a set of directed
//! connections, and a free-form config map.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Descriptive metadata about a workflow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowInfo {
    /// Workflow name
    pub name: String,
    /// What the workflow does
    #[serde(default)]
    pub description: String,
}

/// Retry policy carried by each node
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    /// Whether retries are enabled for this node
    #[serde(default)]
    pub enabled: bool,
    /// Maximum number of attempts, including the first
    #[serde(default)]
    pub max_attempts: u32,
    /// Delay between attempts in milliseconds
    #[serde(default)]
    pub delay: u64,
}

/// A single node in the workflow graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier within the workflow
    pub id: String,
    /// Human-readable label
    pub name: String,
    /// Node type: `trigger`, `httpRequest`, `sqlQuery`, `if`, …
    #[serde(rename = "type")]
    pub node_type: String,
    /// Arbitrary parameter tree; strings may embed template expressions
    #[serde(default)]
    pub parameters: Value,
    /// The node with position 1 is where execution starts
    #[serde(default)]
    pub position: i64,
    /// Per-node retry policy
    #[serde(default)]
    pub retry: RetryPolicy,
}

/// A directed edge between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Source node id
    pub from: String,
    /// Destination node id
    pub to: String,
    /// Optional branch tag used by conditional routing (`"true"`/`"false"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// A complete workflow document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    /// Workflow metadata, stored under the top-level `workflow` key
    #[serde(rename = "workflow")]
    pub info: WorkflowInfo,
    /// Nodes in declaration order
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Connections between nodes
    #[serde(default)]
    pub connections: Vec<Connection>,
    /// Config map, readable from templates as `config.<key>`
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl Workflow {
    /// Parse a workflow document from JSON text
    pub fn from_json(document: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(document)
    }

    /// The node execution starts from: the first declared node with position 1
    pub fn start_node(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.position == 1)
    }

    /// Look up a node by id
    pub fn node_by_id(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Outgoing connections of a node, in declaration order
    pub fn connections_from(&self, id: &str) -> Vec<&Connection> {
        self.connections.iter().filter(|c| c.from == id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "workflow": {"name": "Order sync", "description": "Pulls orders"},
        "nodes": [
            {"id": "t1", "name": "Start", "type": "trigger", "parameters": {}, "position": 1,
             "retry": {"enabled": false, "maxAttempts": 0, "delay": 0}},
            {"id": "h1", "name": "Fetch", "type": "httpRequest",
             "parameters": {"url": "http://example.test", "method": "GET"}, "position": 2,
             "retry": {"enabled": true, "maxAttempts": 3, "delay": 100}}
        ],
        "connections": [{"from": "t1", "to": "h1"}],
        "config": {"region": "eu"}
    }"#;

    #[test]
    fn parse_document() {
        let workflow = Workflow::from_json(DOCUMENT).unwrap();
        assert_eq!(workflow.info.name, "Order sync");
        assert_eq!(workflow.nodes.len(), 2);
        assert_eq!(workflow.nodes[1].retry.max_attempts, 3);
        assert_eq!(workflow.nodes[1].retry.delay, 100);
        assert_eq!(workflow.config.get("region"), Some(&"eu".into()));
    }

    #[test]
    fn parse_rejects_malformed_document() {
        assert!(Workflow::from_json("not json {").is_err());
    }

    #[test]
    fn start_node_picks_position_one() {
        let workflow = Workflow::from_json(DOCUMENT).unwrap();
        assert_eq!(workflow.start_node().unwrap().id, "t1");
    }

    #[test]
    fn start_node_ties_break_by_declaration_order() {
        let mut workflow = Workflow::from_json(DOCUMENT).unwrap();
        workflow.nodes[1].position = 1;
        assert_eq!(workflow.start_node().unwrap().id, "t1");
    }

    #[test]
    fn missing_fields_default() {
        let workflow = Workflow::from_json(r#"{"workflow": {"name": "Minimal"}}"#).unwrap();
        assert!(workflow.nodes.is_empty());
        assert!(workflow.connections.is_empty());
        assert!(workflow.config.is_empty());
        assert!(workflow.start_node().is_none());
    }

    #[test]
    fn connections_from_preserves_declaration_order() {
        let mut workflow = Workflow::from_json(DOCUMENT).unwrap();
        workflow.connections.push(Connection {
            from: "t1".to_string(),
            to: "x".to_string(),
            branch: Some("true".to_string()),
        });

        let outgoing = workflow.connections_from("t1");
        assert_eq!(outgoing.len(), 2);
        assert_eq!(outgoing[0].to, "h1");
        assert_eq!(outgoing[1].to, "x");
    }
}
