//! Docket Connectors — clients for the upstream paper index and regulatory sources.

pub mod arxiv;
pub mod firecrawl;
pub mod openfda;
pub mod source;

pub use arxiv::{parse_atom_feed, ArxivClient};
pub use firecrawl::FirecrawlScraper;
pub use openfda::OpenFdaClient;
pub use source::{regulatory_source, PaperIndex, RegulatorySource};
