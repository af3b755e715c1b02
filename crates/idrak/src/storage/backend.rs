//! Store Backends
//!
//! Where the store's entries live between runs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::fs;
use tracing::debug;

use super::StoreResult;

/// Entries of the store, ordered for stable files
pub type Entries = BTreeMap<String, String>;

/// Persistence for the store's entries
#[async_trait]
pub trait StoreBackend: Send + Sync + 'static {
    /// Read all entries
    async fn load(&self) -> StoreResult<Entries>;

    /// Replace all entries
    async fn persist(&self, entries: &Entries) -> StoreResult<()>;

    /// File backing this store, if any
    fn location(&self) -> Option<&Path> {
        None
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Backend
// ─────────────────────────────────────────────────────────────────────────────

/// Entries kept as a JSON object in a file
///
/// Writes go to a sibling temp file that is renamed over the target, so a
/// reader never sees a half-written file.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "store.json".to_string());
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}

#[async_trait]
impl StoreBackend for FileBackend {
    async fn load(&self) -> StoreResult<Entries> {
        if !fs::try_exists(&self.path).await? {
            debug!("Store file {} does not exist yet", self.path.display());
            return Ok(Entries::new());
        }

        let content = fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(Entries::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    async fn persist(&self, entries: &Entries) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(entries)?;
        let temp = self.temp_path();
        fs::write(&temp, json).await?;
        fs::rename(&temp, &self.path).await?;

        debug!("Persisted {} store entries to {}", entries.len(), self.path.display());
        Ok(())
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Backend
// ─────────────────────────────────────────────────────────────────────────────

/// Entries kept in memory
///
/// Clones share the same entries, so two stores opened on clones of one
/// backend behave like two processes sharing a file.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<Mutex<Entries>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> Entries {
        self.entries.lock().clone()
    }
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn load(&self) -> StoreResult<Entries> {
        Ok(self.entries.lock().clone())
    }

    async fn persist(&self, entries: &Entries) -> StoreResult<()> {
        *self.entries.lock() = entries.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_backend_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("nested").join("store.json"));

        assert!(backend.load().await.unwrap().is_empty());

        let mut entries = Entries::new();
        entries.insert("idrak:emergency-mode".into(), "incident".into());
        backend.persist(&entries).await.unwrap();

        let loaded = backend.load().await.unwrap();
        assert_eq!(loaded, entries);
        assert!(!backend.temp_path().exists());
    }

    #[tokio::test]
    async fn test_file_backend_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let backend = FileBackend::new(&path);
        assert!(matches!(backend.load().await, Err(super::super::StoreError::Json(_))));
    }

    #[tokio::test]
    async fn test_memory_backend_clones_share_entries() {
        let a = MemoryBackend::new();
        let b = a.clone();

        let mut entries = Entries::new();
        entries.insert("k".into(), "v".into());
        a.persist(&entries).await.unwrap();

        assert_eq!(b.load().await.unwrap().get("k").map(String::as_str), Some("v"));
    }
}
