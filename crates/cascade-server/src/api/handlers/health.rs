//! Health check endpoint handler

use axum::Json;

use crate::api::models::HealthResponse;

/// Handler for `GET /api/v1/health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "Workflow Engine API is running".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_healthy() {
        let Json(body) = health().await;
        assert_eq!(body.status, "healthy");
    }
}
