//! Markdown resources over the stored collections.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tracing::warn;

use docket_store::{LoadOutcome, TopicStore};

use crate::render;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/resources/papers/folders", get(paper_folders))
        .route("/resources/papers/{topic}", get(paper_topic))
        .route("/resources/fda/folders", get(fda_folders))
        .route("/resources/fda/{topic}", get(fda_topic))
}

fn markdown(body: String) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/markdown; charset=utf-8")], body)
}

/// Load a topic off the runtime; an invalid topic reads as missing.
async fn load(
    state: &Arc<AppState>,
    store: fn(&AppState) -> &TopicStore,
    topic: &str,
) -> LoadOutcome {
    let state = state.clone();
    let topic_owned = topic.to_string();
    let result = tokio::task::spawn_blocking(move || store(&*state).load(&topic_owned)).await;
    match result {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            warn!("Cannot load topic {:?}: {}", topic, e);
            LoadOutcome::Missing
        }
        Err(e) => {
            warn!("Load task for {:?} failed: {}", topic, e);
            LoadOutcome::Missing
        }
    }
}

async fn list(state: &Arc<AppState>, store: fn(&AppState) -> &TopicStore) -> Vec<String> {
    let state = state.clone();
    tokio::task::spawn_blocking(move || store(&*state).list_topics())
        .await
        .unwrap_or_default()
}

/// GET /api/resources/papers/folders
async fn paper_folders(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    markdown(render::paper_folders(&list(&state, |s| &s.papers).await))
}

/// GET /api/resources/papers/{topic}
async fn paper_topic(
    State(state): State<Arc<AppState>>,
    Path(topic): Path<String>,
) -> impl IntoResponse {
    let outcome = load(&state, |s| &s.papers, &topic).await;
    markdown(render::paper_topic(&topic, outcome))
}

/// GET /api/resources/fda/folders
async fn fda_folders(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    markdown(render::fda_folders(&list(&state, |s| &s.fda).await))
}

/// GET /api/resources/fda/{topic}
async fn fda_topic(
    State(state): State<Arc<AppState>>,
    Path(topic): Path<String>,
) -> impl IntoResponse {
    let outcome = load(&state, |s| &s.fda, &topic).await;
    markdown(render::fda_topic(&topic, outcome))
}
