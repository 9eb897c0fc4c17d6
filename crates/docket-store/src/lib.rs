//! Docket Store — per-topic JSON collections, discovery and cross-topic lookup.
//!
//! Layout: `<base>/<topic-slug>/<file>` where `<file>` is a JSON object
//! mapping document ID → document. Writes go through a sibling `<file>.tmp`
//! and an atomic rename, so readers only ever see a complete collection.

pub mod catalog;
pub mod collection;
pub mod lookup;
pub mod topic_store;

pub use catalog::list_topics;
pub use collection::{Collection, LoadOutcome, load_collection};
pub use lookup::{Found, find_by_id};
pub use topic_store::TopicStore;
