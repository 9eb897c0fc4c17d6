//! Tool routes: search, lookup and save.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::state::AppState;
use crate::tools::{self, DEFAULT_MAX_RESULTS};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tools", get(list_tools))
        .route("/tools/search_papers", post(search_papers))
        .route("/tools/extract_info", post(extract_info))
        .route("/tools/search_fda", post(search_fda))
        .route("/tools/save_fda_data", post(save_fda_data))
        .route("/fda/documents/{id}", get(get_fda_document))
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub topic: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub paper_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    pub topic: String,
    #[serde(default)]
    pub data: Vec<Value>,
}

/// GET /api/tools — tool descriptors.
async fn list_tools() -> Json<Value> {
    Json(tools::descriptors())
}

/// POST /api/tools/search_papers — IDs of the papers stored.
async fn search_papers(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Json<Vec<String>> {
    Json(tools::search_papers(&state, &req.topic, req.max_results).await)
}

/// POST /api/tools/extract_info — one stored paper.
async fn extract_info(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExtractRequest>,
) -> Response {
    match tools::extract_info(&state, &req.paper_id).await {
        Some(doc) => Json(doc).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "message": format!(
                    "There's no saved information related to paper {}.",
                    req.paper_id
                )
            })),
        )
            .into_response(),
    }
}

/// POST /api/tools/search_fda — IDs of the FDA documents stored.
async fn search_fda(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Json<Vec<String>> {
    Json(tools::search_fda(&state, &req.topic, req.max_results).await)
}

/// POST /api/tools/save_fda_data — IDs of the submitted documents stored.
async fn save_fda_data(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SaveRequest>,
) -> Json<Vec<String>> {
    Json(tools::save_fda_data(&state, &req.topic, req.data).await)
}

/// GET /api/fda/documents/{id} — one stored FDA document and its topic.
async fn get_fda_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match tools::fda_document(&state, &id).await {
        Some(found) => Json(json!({ "topic": found.topic, "document": found.document }))
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("Document {} not found", id) })),
        )
            .into_response(),
    }
}
