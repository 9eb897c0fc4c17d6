//! Store catalog — which topics have a persisted collection.

use std::path::Path;

use tracing::debug;

/// List topic directories under `base_dir` that contain `file_name`.
///
/// Order is whatever the directory listing yields. A missing base directory
/// is an empty catalog.
pub fn list_topics(base_dir: &Path, file_name: &str) -> Vec<String> {
    let entries = match std::fs::read_dir(base_dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("No catalog at {}: {}", base_dir.display(), e);
            return Vec::new();
        }
    };

    entries
        .flatten()
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter(|e| e.path().join(file_name).is_file())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect()
}
