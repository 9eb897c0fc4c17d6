//! On-disk collection file: loading and classification of its state.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;

use docket_core::{CorruptStorePolicy, Document, Error, Result};
use tracing::warn;

/// Document ID → document. Ordered so the persisted file is deterministic.
pub type Collection = BTreeMap<String, Document>;

/// State of a collection file at load time.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(Collection),
    /// No file yet.
    Missing,
    /// File exists but does not parse as a collection.
    Corrupt { reason: String },
}

impl LoadOutcome {
    /// Resolve to a collection, applying `policy` to a corrupt file.
    pub fn into_collection(self, policy: CorruptStorePolicy, path: &Path) -> Result<Collection> {
        match self {
            Self::Loaded(collection) => Ok(collection),
            Self::Missing => Ok(Collection::new()),
            Self::Corrupt { reason } => match policy {
                CorruptStorePolicy::Reset => {
                    warn!(
                        "Collection {} is unreadable ({}); starting from an empty collection",
                        path.display(),
                        reason
                    );
                    Ok(Collection::new())
                }
                CorruptStorePolicy::Fail => Err(Error::CorruptStore {
                    path: path.to_path_buf(),
                    reason,
                }),
            },
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}

/// Read and classify the collection at `path`.
///
/// I/O failures other than a missing file are returned as errors: a
/// permission problem is not evidence that the content is bad.
pub fn load_collection(path: &Path) -> Result<LoadOutcome> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(LoadOutcome::Missing),
        Err(e) if e.kind() == ErrorKind::InvalidData => {
            return Ok(LoadOutcome::Corrupt {
                reason: e.to_string(),
            })
        }
        Err(e) => return Err(e.into()),
    };

    match serde_json::from_str::<Collection>(&data) {
        Ok(collection) => Ok(LoadOutcome::Loaded(collection)),
        Err(e) => Ok(LoadOutcome::Corrupt {
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = load_collection(&dir.path().join("fda_info.json")).unwrap();
        assert!(matches!(outcome, LoadOutcome::Missing));
    }

    #[test]
    fn test_garbage_is_corrupt_not_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fda_info.json");
        std::fs::write(&path, "{ not json").unwrap();

        let outcome = load_collection(&path).unwrap();
        assert!(outcome.is_corrupt());
    }

    #[test]
    fn test_wrong_shape_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fda_info.json");
        std::fs::write(&path, r#"["a", "b"]"#).unwrap();

        assert!(load_collection(&path).unwrap().is_corrupt());
    }

    #[test]
    fn test_policy_applied_to_corrupt() {
        let path = Path::new("fda_info.json");
        let reset = LoadOutcome::Corrupt { reason: "bad".into() }
            .into_collection(CorruptStorePolicy::Reset, path)
            .unwrap();
        assert!(reset.is_empty());

        let fail = LoadOutcome::Corrupt { reason: "bad".into() }
            .into_collection(CorruptStorePolicy::Fail, path);
        assert!(matches!(fail, Err(Error::CorruptStore { .. })));
    }
}
