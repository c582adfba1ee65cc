//! HTTP surface: `POST /api/solve`, a health probe, and the browser client.

mod assets;
pub mod error;

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::config::ServerConfig;
use crate::solver::{PipelineMode, SolveRequest, SolveResponse, Solver};
pub use error::{ApiError, ErrorBody};

/// Shared by all routes.
#[derive(Clone)]
pub struct AppState {
    pub solver: Arc<Solver>,
}

/// `GET /api/health` body.
#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub model: String,
    pub pipeline: PipelineMode,
}

/// Build the application router.
pub fn router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/api/solve", post(solve).fallback(method_not_allowed))
        .route("/api/health", get(health))
        .merge(assets::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Bind and serve until Ctrl+C.
#[instrument(skip_all, fields(addr = %config.addr()))]
pub async fn serve(config: &ServerConfig, solver: Arc<Solver>) -> Result<()> {
    let app = router(AppState { solver }, config.body_limit);

    let listener = TcpListener::bind(config.addr())
        .await
        .with_context(|| format!("failed to bind {}", config.addr()))?;
    let url = config.local_url();
    info!(url = %url, "listening");

    if config.open_browser {
        // Headless machines have no browser; that's fine.
        let _ = open::that(&url);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
        .context("server error")?;
    Ok(())
}

async fn solve(
    State(state): State<AppState>,
    payload: Result<Json<SolveRequest>, JsonRejection>,
) -> Result<Json<SolveResponse>, ApiError> {
    let Json(request) = payload?;
    let result = state.solver.handle(&request).await?;
    Ok(Json(SolveResponse { result }))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        model: state.solver.model().to_string(),
        pipeline: state.solver.mode(),
    })
}
