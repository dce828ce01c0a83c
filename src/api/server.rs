//! HTTP server for the CRM API
//!
//! ## Endpoints
//! - `POST /graphql` - run one [`Operation`]; `{"data": ...}` on success,
//!   `{"errors": [{"kind", "message"}]}` with a matching status on failure
//! - `GET /health` - liveness check

use super::{Operation, execute};
use crate::errors::{Error, ErrorKind, Result};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use tracing::{error, info, warn};

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = match kind {
            ErrorKind::ValidationFailed => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if kind == ErrorKind::Internal {
            error!("Request failed: {}", self);
        }
        let body = json!({ "errors": [{ "kind": kind, "message": self.to_string() }] });
        (status, Json(body)).into_response()
    }
}

/// Builds the API router.
pub fn router(db: DatabaseConnection) -> Router {
    Router::new()
        .route("/graphql", post(operation_handler))
        .route("/health", get(health_handler))
        .with_state(AppState { db })
}

/// Runs one operation from the request body
async fn operation_handler(State(state): State<AppState>, body: String) -> Response {
    let operation = match super::parse_operation(&body) {
        Ok(operation) => operation,
        Err(e) => {
            warn!("Rejected request body: {}", e);
            return e.into_response();
        }
    };
    run_operation(&state.db, operation).await
}

async fn run_operation(db: &DatabaseConnection, operation: Operation) -> Response {
    let name = operation.name();
    match execute(db, operation).await {
        Ok(data) => (StatusCode::OK, Json(json!({ "data": data }))).into_response(),
        Err(e) => {
            info!("Operation {} failed: {}", name, e);
            e.into_response()
        }
    }
}

/// Liveness check
async fn health_handler() -> &'static str {
    "ok"
}

/// Serves the API on `bind_address` until Ctrl-C.
pub async fn serve(bind_address: &str, db: DatabaseConnection) -> Result<()> {
    let app = router(db);
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    info!("API listening on http://{}/graphql", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
