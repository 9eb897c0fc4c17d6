//! Ingestion pipeline: raw payloads → normalized documents → topic store.

use tracing::{info, warn};

use docket_core::{RawPayload, Result};
use docket_store::TopicStore;

use crate::normalize::Normalizer;

/// Normalizes batches and merges them into one store family.
pub struct Ingester<'a> {
    store: &'a TopicStore,
    normalizer: Normalizer,
}

impl<'a> Ingester<'a> {
    pub fn new(store: &'a TopicStore) -> Self {
        Self {
            store,
            normalizer: Normalizer::new(),
        }
    }

    pub fn with_normalizer(store: &'a TopicStore, normalizer: Normalizer) -> Self {
        Self { store, normalizer }
    }

    /// Normalize `payloads` and merge them into `topic`.
    ///
    /// Items that fail to normalize are skipped. Returns the IDs written; a
    /// batch where nothing survives normalization writes nothing.
    pub fn ingest(&self, topic: &str, payloads: &[RawPayload]) -> Result<Vec<String>> {
        let documents = self.normalizer.normalize_batch(topic, payloads);
        let skipped = payloads.len() - documents.len();
        if skipped > 0 {
            warn!("{} of {} items for topic {} skipped", skipped, payloads.len(), topic);
        }

        let ids = self.store.merge(topic, documents)?;
        info!("Ingested {} documents into topic {}", ids.len(), topic);
        Ok(ids)
    }
}
