//! Prompt template routes.

use std::sync::Arc;

use axum::extract::Query;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::prompts;
use crate::state::AppState;
use crate::tools::DEFAULT_MAX_RESULTS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/prompts/papers", get(papers_prompt))
        .route("/prompts/fda", get(fda_prompt))
}

#[derive(Debug, Deserialize)]
pub struct PapersPromptQuery {
    pub topic: String,
    pub num_papers: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct FdaPromptQuery {
    pub topic: String,
    pub max_results: Option<usize>,
}

/// GET /api/prompts/papers?topic=&num_papers=
async fn papers_prompt(Query(q): Query<PapersPromptQuery>) -> Json<Value> {
    let num = q.num_papers.unwrap_or(DEFAULT_MAX_RESULTS);
    Json(json!({
        "name": "generate_search_prompt",
        "prompt": prompts::research_prompt(&q.topic, num),
    }))
}

/// GET /api/prompts/fda?topic=&max_results=
async fn fda_prompt(Query(q): Query<FdaPromptQuery>) -> Json<Value> {
    let max = q.max_results.unwrap_or(DEFAULT_MAX_RESULTS);
    Json(json!({
        "name": "generate_fda_search_prompt",
        "prompt": prompts::fda_prompt(&q.topic, max),
    }))
}
