//! Topic store — idempotent upsert-merge with atomic persistence.

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use docket_core::{slugify, CorruptStorePolicy, Document, Error, Result};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::collection::{load_collection, Collection, LoadOutcome};
use crate::{catalog, lookup};

/// A family of per-topic collections under one base directory.
///
/// Each topic owns `<base>/<slug>/<file_name>`. Merges into the same topic
/// from this process are serialized; nothing guards against another process
/// writing the same file (last rename wins).
pub struct TopicStore {
    base_dir: PathBuf,
    file_name: String,
    corrupt_policy: CorruptStorePolicy,
    topic_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl TopicStore {
    pub fn new(base_dir: impl AsRef<Path>, file_name: &str) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            file_name: file_name.to_string(),
            corrupt_policy: CorruptStorePolicy::default(),
            topic_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_corrupt_policy(mut self, policy: CorruptStorePolicy) -> Self {
        self.corrupt_policy = policy;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Directory holding `topic`'s collection.
    pub fn topic_dir(&self, topic: &str) -> Result<PathBuf> {
        Ok(self.base_dir.join(slugify(topic)?))
    }

    /// Path of `topic`'s collection file.
    pub fn collection_path(&self, topic: &str) -> Result<PathBuf> {
        Ok(self.topic_dir(topic)?.join(&self.file_name))
    }

    /// Load `topic`'s collection without applying any policy.
    pub fn load(&self, topic: &str) -> Result<LoadOutcome> {
        load_collection(&self.collection_path(topic)?)
    }

    /// Merge a batch into `topic`'s collection.
    ///
    /// Every document replaces any existing entry with the same ID. The full
    /// updated collection is written to `<file>.tmp`, verified, and renamed
    /// over the collection file. On error the temp file is removed and the
    /// collection file is exactly as it was before the call.
    ///
    /// Returns the IDs written, in batch order without repeats.
    pub fn merge(&self, topic: &str, documents: Vec<Document>) -> Result<Vec<String>> {
        let slug = slugify(topic)?;
        let dir = self.base_dir.join(&slug);
        std::fs::create_dir_all(&dir)?;

        if documents.is_empty() {
            debug!("Empty batch for topic {}, nothing to write", slug);
            return Ok(Vec::new());
        }

        let lock = self.topic_lock(&slug);
        let _guard = lock.lock();

        let path = dir.join(&self.file_name);
        let mut collection = load_collection(&path)?.into_collection(self.corrupt_policy, &path)?;
        let existing = collection.len();

        let mut seen = HashSet::new();
        let mut written = Vec::with_capacity(documents.len());
        for doc in documents {
            if seen.insert(doc.id.clone()) {
                written.push(doc.id.clone());
            }
            collection.insert(doc.id.clone(), doc);
        }

        persist(&path, &collection)?;

        info!(
            "Merged {} documents into {} ({} before, {} after)",
            written.len(),
            path.display(),
            existing,
            collection.len()
        );
        Ok(written)
    }

    /// Topics with a persisted collection, in directory order.
    pub fn list_topics(&self) -> Vec<String> {
        catalog::list_topics(&self.base_dir, &self.file_name)
    }

    /// First document with `id` across all topics.
    pub fn find_by_id(&self, id: &str) -> Option<lookup::Found> {
        lookup::find_by_id(&self.base_dir, &self.file_name, id)
    }

    fn topic_lock(&self, slug: &str) -> Arc<Mutex<()>> {
        self.topic_locks
            .lock()
            .entry(slug.to_string())
            .or_default()
            .clone()
    }
}

/// Sibling temp path: `fda_info.json` → `fda_info.json.tmp`.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn persist(path: &Path, collection: &Collection) -> Result<()> {
    let tmp = temp_path(path);
    let result = write_verified(&tmp, collection)
        .and_then(|()| std::fs::rename(&tmp, path).map_err(Error::from));

    if let Err(e) = &result {
        warn!("Failed to persist {}: {}", path.display(), e);
        if tmp.is_file() {
            if let Err(rm) = std::fs::remove_file(&tmp) {
                warn!("Failed to remove {}: {}", tmp.display(), rm);
            }
        }
        return result;
    }

    // The rename has landed; a failed directory sync only weakens durability.
    if let Some(dir) = path.parent() {
        if let Err(e) = sync_dir(dir) {
            warn!("Failed to sync {}: {}", dir.display(), e);
        }
    }
    Ok(())
}

/// Flush a directory entry so a completed rename survives power loss.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::File::open(dir)?.sync_all()
}

/// Directory handles cannot be synced on this platform; the rename is as
/// durable as the filesystem makes it.
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

fn write_verified(tmp: &Path, collection: &Collection) -> Result<()> {
    let json = serde_json::to_vec_pretty(collection)?;
    {
        let mut file = std::fs::File::create(tmp)?;
        file.write_all(&json)?;
        file.sync_all()?;
    }

    let written: Collection = serde_json::from_slice(&std::fs::read(tmp)?)?;
    if written.is_empty() {
        return Err(Error::Storage(format!(
            "{} verified as an empty collection",
            tmp.display()
        )));
    }
    if written.len() != collection.len() {
        return Err(Error::Storage(format!(
            "{} holds {} documents, expected {}",
            tmp.display(),
            written.len(),
            collection.len()
        )));
    }
    Ok(())
}
