//! Cascade server binary
//!
//! Standalone REST host for the workflow engine: persists workflow
//! documents in SQLite and executes them on demand.

use std::net::SocketAddr;

use cascade_server::api::{create_router, AppState};
use cascade_server::config::ServerConfig;
use cascade_server::db::DatabaseConnection;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(rust_log).init();

    let config = ServerConfig::from_env();
    tracing::info!("Database URL: {}", config.database_url);

    tracing::info!("Connecting to database");
    let db = DatabaseConnection::new(&config.database_url).await?;

    tracing::info!("Initializing database schema");
    db.init_schema().await?;

    tracing::info!("Performing database health check");
    db.health_check().await?;

    let state = AppState::new(db).with_step_limit(config.step_limit);
    let app = create_router(state);

    let addr: SocketAddr = config.bind_addr().parse()?;
    tracing::info!("Starting cascade server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Cascade server shut down gracefully");
    Ok(())
}

/// Signal for graceful shutdown (Ctrl-C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL-C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received CTRL-C signal, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, shutting down");
        }
    }
}
