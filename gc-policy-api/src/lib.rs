//! GC Policy API Server
//!
//! REST API for building, planning and applying column family GC policies.

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use state::AppState;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Policy evaluation
        .route("/api/gc-policies/build", post(handlers::build_policy))
        .route("/api/gc-policies/plan", post(handlers::plan_max_age))
        .route("/api/gc-rules/compare", post(handlers::compare_gc_rules))
        // Column family resource
        .route(
            "/api/instances/:instance/tables/:table/column-families/:family/gc-policy",
            put(handlers::create_gc_policy)
                .get(handlers::get_gc_policy)
                .delete(handlers::delete_gc_policy),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
