//! Docket Ingest — field extraction, document normalization, ingestion into topic stores.

pub mod extract;
pub mod ingest;
pub mod normalize;

pub use extract::{extract, extract_drug_info, extract_product_info, ExtractKind, PartialFields};
pub use ingest::Ingester;
pub use normalize::{synthetic_id, Normalizer};
