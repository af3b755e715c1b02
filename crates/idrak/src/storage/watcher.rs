//! Store File Watcher
//!
//! Watches the store file for writes made by other processes and reconciles
//! them into `StorageEvent`s with an external origin.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::{Store, StoreError, StoreResult};

/// Quiet period before a burst of file events is reloaded
const DEBOUNCE: Duration = Duration::from_millis(50);

/// Store file watcher
pub struct StoreWatcher {
    store: Store,
    path: PathBuf,
    /// Coalesced "something changed" signals
    rx: mpsc::Receiver<()>,
    /// The underlying watcher (kept alive)
    _watcher: RecommendedWatcher,
}

impl StoreWatcher {
    /// Create a watcher for a file-backed store
    pub fn new(store: Store) -> StoreResult<Self> {
        let path = store.location().ok_or(StoreError::NotWatchable)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_os_string())
            .ok_or(StoreError::NotWatchable)?;

        // The file is replaced by rename, so watch its directory
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let (tx, rx) = mpsc::channel(1);
        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    if Self::touches(&file_name, &event) {
                        // A pending signal already covers this event
                        let _ = tx.try_send(());
                    }
                }
                Err(e) => error!("Store watcher error: {}", e),
            }
        })?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        info!("Watching store file: {}", path.display());

        Ok(Self {
            store,
            path,
            rx,
            _watcher: watcher,
        })
    }

    fn touches(file_name: &OsString, event: &Event) -> bool {
        match event.kind {
            EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_) => {}
            _ => return false,
        }
        event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
    }

    /// Run the watcher loop until the watcher is dropped
    pub async fn run(mut self) {
        info!("Starting store watcher loop");

        while self.rx.recv().await.is_some() {
            tokio::time::sleep(DEBOUNCE).await;
            while self.rx.try_recv().is_ok() {}

            match self.store.reload().await {
                Ok(0) => debug!("Store file touched, no external changes"),
                Ok(n) => debug!("Reconciled {} external store changes", n),
                Err(e) => warn!("Failed to reload store {}: {}", self.path.display(), e),
            }
        }

        info!("Store watcher loop ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind};

    #[test]
    fn test_in_memory_store_is_not_watchable() {
        let result = StoreWatcher::new(Store::in_memory());
        assert!(matches!(result, Err(StoreError::NotWatchable)));
    }

    #[test]
    fn test_touches_filters_by_file_name() {
        let name = OsString::from("store.json");

        let hit = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/tmp/x/store.json"));
        let other = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/tmp/x/other.json"));
        let access = Event::new(EventKind::Access(notify::event::AccessKind::Any))
            .add_path(PathBuf::from("/tmp/x/store.json"));

        assert!(StoreWatcher::touches(&name, &hit));
        assert!(!StoreWatcher::touches(&name, &other));
        assert!(!StoreWatcher::touches(&name, &access));
    }
}
