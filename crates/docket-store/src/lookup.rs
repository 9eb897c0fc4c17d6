//! Cross-topic lookup of a single document by ID.
//!
//! Linear scan over every topic collection; meant for low-frequency
//! retrieval, not a hot path.

use std::path::Path;

use docket_core::Document;
use tracing::warn;

use crate::catalog::list_topics;
use crate::collection::{load_collection, LoadOutcome};

/// A document and the topic it was found under.
#[derive(Debug, Clone)]
pub struct Found {
    pub topic: String,
    pub document: Document,
}

/// Return the first document with `id` across all topics under `base_dir`.
///
/// Topics whose collection is missing or unreadable are skipped.
pub fn find_by_id(base_dir: &Path, file_name: &str, id: &str) -> Option<Found> {
    for topic in list_topics(base_dir, file_name) {
        let path = base_dir.join(&topic).join(file_name);
        let mut collection = match load_collection(&path) {
            Ok(LoadOutcome::Loaded(collection)) => collection,
            Ok(LoadOutcome::Missing) => continue,
            Ok(LoadOutcome::Corrupt { reason }) => {
                warn!("Skipping unreadable {}: {}", path.display(), reason);
                continue;
            }
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        if let Some(document) = collection.remove(id) {
            return Some(Found { topic, document });
        }
    }
    None
}
