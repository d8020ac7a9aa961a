//! API request and response shapes

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `GET /api/v1/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Body of a successful save or delete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowIdResponse {
    pub message: String,
    #[serde(rename = "workflowID")]
    pub workflow_id: String,
}

/// Body of `GET /api/v1/get_all`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowListResponse {
    #[serde(rename = "workflowIDs")]
    pub workflow_ids: Vec<String>,
    pub count: usize,
}

/// Body of a successful `POST /api/v1/run/:id`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResponse {
    pub message: String,
    #[serde(rename = "workflowID")]
    pub workflow_id: String,
    #[serde(rename = "nodeResults")]
    pub node_results: Map<String, Value>,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
