//! Raw upstream payloads, before normalization.

use serde::{Deserialize, Serialize};

use crate::document::DocType;

/// A paper as returned by the paper index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperEntry {
    /// Index short ID, e.g. `2401.01234v1`.
    pub short_id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
    pub pdf_url: String,
    /// Publication timestamp as the index reports it.
    pub published: String,
}

/// A scraped web page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapedPage {
    pub url: String,
    pub title: String,
    pub snippet: String,
    /// Page body as markdown.
    pub markdown: String,
}

/// Where a raw payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    PaperIndex,
    RegulatoryApi,
    Scraper,
    Submitted,
}

/// One upstream item in the shape its source produced.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    Paper(PaperEntry),
    /// Structured regulatory JSON (openFDA enforcement or event record).
    FdaRecord {
        doc_type: DocType,
        record: serde_json::Value,
    },
    Scraped {
        doc_type: DocType,
        page: ScrapedPage,
    },
    /// Caller-provided document, canonical or flat.
    Submitted(serde_json::Value),
}

impl RawPayload {
    pub fn source_kind(&self) -> SourceKind {
        match self {
            Self::Paper(_) => SourceKind::PaperIndex,
            Self::FdaRecord { .. } => SourceKind::RegulatoryApi,
            Self::Scraped { .. } => SourceKind::Scraper,
            Self::Submitted(_) => SourceKind::Submitted,
        }
    }
}
