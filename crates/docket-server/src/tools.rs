//! Tool operations behind the HTTP surface.
//!
//! Tools never fail outward: upstream errors, normalization failures and
//! write failures are logged and reported as an empty result.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{info, warn};

use docket_core::{Document, RawPayload};
use docket_ingest::Ingester;
use docket_store::{Found, TopicStore};

use crate::state::AppState;

pub const DEFAULT_MAX_RESULTS: usize = 5;
/// Upper bound on one upstream request.
pub const MAX_RESULTS_CAP: usize = 100;

fn clamp_results(max_results: usize) -> usize {
    max_results.clamp(1, MAX_RESULTS_CAP)
}

/// Run blocking store work off the async runtime.
async fn blocking<T, F>(what: &str, f: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{} task failed: {}", what, e);
            None
        }
    }
}

/// Normalize and merge `payloads` into one of the two store families.
async fn ingest(
    state: &Arc<AppState>,
    store: fn(&AppState) -> &TopicStore,
    topic: &str,
    payloads: Vec<RawPayload>,
) -> Vec<String> {
    let state = state.clone();
    let topic_owned = topic.to_string();
    let result = blocking("ingest", move || {
        Ingester::new(store(&*state)).ingest(&topic_owned, &payloads)
    })
    .await;

    match result {
        Some(Ok(ids)) => ids,
        Some(Err(e)) => {
            warn!("Ingest into topic {:?} failed: {}", topic, e);
            Vec::new()
        }
        None => Vec::new(),
    }
}

/// Search the paper index and store the results under `topic`.
pub async fn search_papers(state: &Arc<AppState>, topic: &str, max_results: usize) -> Vec<String> {
    let entries = match state
        .paper_index
        .search(topic, clamp_results(max_results))
        .await
    {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Paper search for {:?} failed: {}", topic, e);
            return Vec::new();
        }
    };
    let payloads = entries.into_iter().map(RawPayload::Paper).collect();
    ingest(state, |s| &s.papers, topic, payloads).await
}

/// A stored paper by ID, searched across every paper topic.
pub async fn extract_info(state: &Arc<AppState>, paper_id: &str) -> Option<Document> {
    let state = state.clone();
    let id = paper_id.to_string();
    blocking("lookup", move || state.papers.find_by_id(&id))
        .await
        .flatten()
        .map(|found| found.document)
}

/// Fetch regulatory data for `topic` from the configured source and store it.
pub async fn search_fda(state: &Arc<AppState>, topic: &str, max_results: usize) -> Vec<String> {
    let payloads = match state
        .regulatory
        .fetch(topic, clamp_results(max_results))
        .await
    {
        Ok(payloads) => payloads,
        Err(e) => {
            warn!(
                "{} fetch for {:?} failed: {}",
                state.regulatory.name(),
                topic,
                e
            );
            return Vec::new();
        }
    };
    info!(
        "{} returned {} items for {:?}",
        state.regulatory.name(),
        payloads.len(),
        topic
    );
    ingest(state, |s| &s.fda, topic, payloads).await
}

/// Store caller-provided regulatory documents under `topic`.
pub async fn save_fda_data(state: &Arc<AppState>, topic: &str, data: Vec<Value>) -> Vec<String> {
    let payloads = data.into_iter().map(RawPayload::Submitted).collect();
    ingest(state, |s| &s.fda, topic, payloads).await
}

/// A stored regulatory document by ID, with the topic holding it.
pub async fn fda_document(state: &Arc<AppState>, id: &str) -> Option<Found> {
    let state = state.clone();
    let id = id.to_string();
    blocking("lookup", move || state.fda.find_by_id(&id))
        .await
        .flatten()
}

/// Tool descriptors with JSON-schema inputs.
pub fn descriptors() -> Value {
    json!([
        {
            "name": "search_papers",
            "description": "Search arXiv for papers on a topic and store their information.",
            "input_schema": {
                "type": "object",
                "properties": {
                    "topic": { "type": "string" },
                    "max_results": { "type": "integer", "default": DEFAULT_MAX_RESULTS }
                },
                "required": ["topic"]
            }
        },
        {
            "name": "extract_info",
            "description": "Look up a stored paper by ID across all topics.",
            "input_schema": {
                "type": "object",
                "properties": { "paper_id": { "type": "string" } },
                "required": ["paper_id"]
            }
        },
        {
            "name": "search_fda",
            "description": "Fetch FDA information for a topic (recalls, drugs, food, clinical or free text) and store it.",
            "input_schema": {
                "type": "object",
                "properties": {
                    "topic": { "type": "string" },
                    "max_results": { "type": "integer", "default": DEFAULT_MAX_RESULTS }
                },
                "required": ["topic"]
            }
        },
        {
            "name": "save_fda_data",
            "description": "Save caller-provided FDA documents under a topic.",
            "input_schema": {
                "type": "object",
                "properties": {
                    "topic": { "type": "string" },
                    "data": { "type": "array", "items": { "type": "object" } }
                },
                "required": ["topic", "data"]
            }
        }
    ])
}
