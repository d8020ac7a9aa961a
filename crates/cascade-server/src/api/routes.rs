//! API route definitions

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{delete, get, post};
use axum::Router;

use cascade_engine::{QueryRunner, SqlxQueryRunner, DEFAULT_STEP_LIMIT};

use crate::api::handlers;
use crate::db::DatabaseConnection;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Workflow document store
    pub db: DatabaseConnection,
    /// HTTP client shared across engine runs
    pub http: reqwest::Client,
    /// Query runner shared across engine runs
    pub queries: Arc<dyn QueryRunner>,
    /// Cap on node executions per workflow run
    pub step_limit: usize,
}

impl AppState {
    /// Build state around a database connection with the default engine
    /// collaborators
    pub fn new(db: DatabaseConnection) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            db,
            http,
            queries: Arc::new(SqlxQueryRunner::new()),
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }

    /// Override the per-run node execution cap
    pub fn with_step_limit(mut self, step_limit: usize) -> Self {
        self.step_limit = step_limit;
        self
    }
}

/// Build the complete API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/save/:id", post(handlers::save_workflow))
        .route("/api/v1/get/:id", get(handlers::get_workflow))
        .route("/api/v1/delete/:id", delete(handlers::delete_workflow))
        .route("/api/v1/get_all", get(handlers::list_workflows))
        .route("/api/v1/run/:id", post(handlers::run_workflow))
        .with_state(state)
}
