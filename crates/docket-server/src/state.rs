//! Shared application state.

use std::sync::Arc;

use docket_connectors::{regulatory_source, ArxivClient, PaperIndex, RegulatorySource};
use docket_core::config::{FDA_FILE, PAPERS_FILE};
use docket_core::{DocketConfig, Result};
use docket_store::TopicStore;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: DocketConfig,
    pub papers: TopicStore,
    pub fda: TopicStore,
    pub paper_index: Arc<dyn PaperIndex>,
    pub regulatory: Arc<dyn RegulatorySource>,
}

impl AppState {
    pub fn new(
        config: DocketConfig,
        paper_index: Arc<dyn PaperIndex>,
        regulatory: Arc<dyn RegulatorySource>,
    ) -> Self {
        let papers = TopicStore::new(&config.paths.papers, PAPERS_FILE)
            .with_corrupt_policy(config.corrupt_policy);
        let fda =
            TopicStore::new(&config.paths.fda, FDA_FILE).with_corrupt_policy(config.corrupt_policy);
        Self {
            config,
            papers,
            fda,
            paper_index,
            regulatory,
        }
    }

    /// State wired to the real upstream clients.
    pub fn from_config(config: DocketConfig) -> Result<Self> {
        let paper_index = Arc::new(ArxivClient::new(config.arxiv_timeout)?);
        let regulatory = regulatory_source(&config)?;
        Ok(Self::new(config, paper_index, regulatory))
    }
}
