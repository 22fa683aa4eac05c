use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

use crate::feed::FeedRecord;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access feed store: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON in feed store: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Feed Store
// ============================================================================

/// Extracted feed records keyed by feed URL, persisted as a JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedStore {
    #[serde(default)]
    feeds: BTreeMap<String, FeedRecord>,
}

impl FeedStore {
    /// Loads the store from `path`.
    ///
    /// - Missing file → empty store
    /// - Empty or whitespace-only file → empty store
    /// - Invalid JSON → `Err(StoreError::Json)`
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No feed store found, starting empty");
                return Ok(Self::default());
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let store: FeedStore = serde_json::from_str(&content)?;
        tracing::info!(path = %path.display(), feeds = store.feeds.len(), "Loaded feed store");
        Ok(store)
    }

    /// Writes the store to `path` through a temporary file and a rename, so
    /// the destination never holds a partial document.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec_pretty(self)?;
        let temp_path = path.with_extension("json.tmp");

        let result = (|| -> Result<(), std::io::Error> {
            let mut file = std::fs::File::create(&temp_path)?;
            file.write_all(&json)?;
            file.sync_all()?;
            drop(file);
            std::fs::rename(&temp_path, path)
        })();

        if let Err(e) = result {
            let _ = std::fs::remove_file(&temp_path);
            return Err(StoreError::Io(e));
        }

        tracing::info!(path = %path.display(), feeds = self.feeds.len(), "Saved feed store");
        Ok(())
    }

    pub fn get(&self, url: &str) -> Option<&FeedRecord> {
        self.feeds.get(url)
    }

    pub fn get_mut(&mut self, url: &str) -> Option<&mut FeedRecord> {
        self.feeds.get_mut(url)
    }

    /// Stored feed URLs in sorted order.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.feeds.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    /// Replaces the record for `url` with a freshly extracted one, carrying
    /// over read flags from the stored record first.
    pub fn upsert(&mut self, url: &str, mut fresh: FeedRecord) {
        if let Some(previous) = self.feeds.get(url) {
            fresh.merge_read_state(previous);
        }
        self.feeds.insert(url.to_string(), fresh);
    }

    pub fn remove(&mut self, url: &str) -> Option<FeedRecord> {
        self.feeds.remove(url)
    }
}
