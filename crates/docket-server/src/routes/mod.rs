//! HTTP route handlers.

pub mod prompts;
pub mod resources;
pub mod tools;

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(tools::routes())
        .merge(resources::routes())
        .merge(prompts::routes())
}

/// GET / — welcome message.
async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Research Server API!" }))
}
