//! Docket Core — document model, topic slugs, configuration, error types.

pub mod config;
pub mod document;
pub mod error;
pub mod raw;
pub mod topic;

pub use config::{CorruptStorePolicy, DocketConfig, RegulatorySourceKind, StorePaths};
pub use document::{
    ClinicalInfo, DocType, Document, DocumentBody, DrugInfo, ProductInfo, parse_doc_date,
};
pub use error::{Error, Result};
pub use raw::{PaperEntry, RawPayload, ScrapedPage, SourceKind};
pub use topic::slugify;
