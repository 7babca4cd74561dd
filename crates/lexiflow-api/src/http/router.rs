//! Axum router configuration with middleware.
//!
//! Middleware: CORS, request tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Workflows
        .route("/workflows", get(handlers::workflow::list_workflows))
        .route("/workflows/trigger", post(handlers::workflow::trigger_workflow))
        .route(
            "/workflows/{run_id}/status",
            get(handlers::workflow::get_status),
        )
        .route(
            "/workflows/{run_id}/resume",
            post(handlers::workflow::resume_workflow),
        )
        // Analysis
        .route("/analyze", post(handlers::analyze::analyze))
        .route("/health", get(handlers::health::health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
