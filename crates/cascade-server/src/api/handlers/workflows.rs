//! Workflow storage and execution endpoint handlers

use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;

use cascade_engine::WorkflowEngine;

use crate::api::error::{ApiError, ApiResult};
use crate::api::models::{RunResponse, WorkflowIdResponse, WorkflowListResponse};
use crate::api::routes::AppState;
use crate::db::WorkflowStore;

/// Save or update a workflow document
///
/// POST /api/v1/save/:id
pub async fn save_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: String,
) -> ApiResult<Json<WorkflowIdResponse>> {
    let document = parse_body(&body)?;
    WorkflowStore::save(state.db.pool(), &id, &document).await?;

    tracing::info!(workflow_id = %id, "saved workflow");
    Ok(Json(WorkflowIdResponse {
        message: "Workflow saved successfully".to_string(),
        workflow_id: id,
    }))
}

/// Retrieve a workflow document
///
/// GET /api/v1/get/:id
pub async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let document = WorkflowStore::get(state.db.pool(), &id).await?;
    Ok(Json(document))
}

/// Delete a workflow document
///
/// DELETE /api/v1/delete/:id
pub async fn delete_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<WorkflowIdResponse>> {
    WorkflowStore::delete(state.db.pool(), &id).await?;

    tracing::info!(workflow_id = %id, "deleted workflow");
    Ok(Json(WorkflowIdResponse {
        message: "Workflow deleted successfully".to_string(),
        workflow_id: id,
    }))
}

/// List all stored workflow ids
///
/// GET /api/v1/get_all
pub async fn list_workflows(
    State(state): State<AppState>,
) -> ApiResult<Json<WorkflowListResponse>> {
    let workflow_ids = WorkflowStore::list_ids(state.db.pool()).await?;
    let count = workflow_ids.len();
    Ok(Json(WorkflowListResponse {
        workflow_ids,
        count,
    }))
}

/// Execute a stored workflow against the request body as trigger data
///
/// POST /api/v1/run/:id
pub async fn run_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: String,
) -> ApiResult<Json<RunResponse>> {
    let trigger_data = parse_body(&body)?;
    let document = WorkflowStore::get(state.db.pool(), &id).await?;
    let document_text = serde_json::to_string(&document)
        .map_err(|e| ApiError::Internal(format!("failed to serialize workflow document: {e}")))?;

    let mut engine = WorkflowEngine::from_json(&document_text, trigger_data)?
        .with_http_client(state.http.clone())
        .with_query_runner(state.queries.clone())
        .with_step_limit(state.step_limit);

    tracing::info!(workflow_id = %id, "running workflow");
    engine.execute().await?;

    Ok(Json(RunResponse {
        message: "Workflow executed successfully".to_string(),
        workflow_id: id,
        node_results: engine.into_results(),
    }))
}

fn parse_body(body: &str) -> ApiResult<Value> {
    serde_json::from_str(body).map_err(|e| ApiError::BadRequest(format!("Invalid JSON format: {e}")))
}
