//! Collaborator traits for upstream sources.

use std::sync::Arc;

use async_trait::async_trait;

use docket_core::{DocketConfig, PaperEntry, RawPayload, RegulatorySourceKind, Result};

use crate::firecrawl::FirecrawlScraper;
use crate::openfda::OpenFdaClient;

/// Academic paper search.
#[async_trait]
pub trait PaperIndex: Send + Sync {
    /// Up to `max_results` papers for `topic`, most relevant first.
    async fn search(&self, topic: &str, max_results: usize) -> Result<Vec<PaperEntry>>;
}

/// Regulatory data for a topic, as raw payloads ready for normalization.
#[async_trait]
pub trait RegulatorySource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, topic: &str, max_results: usize) -> Result<Vec<RawPayload>>;
}

/// The regulatory source selected by `config.fda_source`.
pub fn regulatory_source(config: &DocketConfig) -> Result<Arc<dyn RegulatorySource>> {
    Ok(match config.fda_source {
        RegulatorySourceKind::Api => Arc::new(OpenFdaClient::new(config.fda_timeout)?),
        RegulatorySourceKind::Scrape => Arc::new(FirecrawlScraper::new(
            &config.firecrawl_url,
            config.firecrawl_api_key.clone(),
            config.firecrawl_timeout,
        )?),
    })
}
