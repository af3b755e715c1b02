//! Store
//!
//! In-memory view of the persisted entries plus the change broadcast.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    Entries, MemoryBackend, Origin, StorageEvent, StoreBackend, StoreResult, StoreSubscription,
};

/// Capacity of the change broadcast; slow subscribers beyond this lag
const EVENT_BUFFER: usize = 256;

/// Shared handle to the persisted store
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    /// Current entries, readable without awaiting
    entries: RwLock<Entries>,

    /// Serializes writes so the backend sees them in memory order
    write_lock: Mutex<()>,

    backend: Box<dyn StoreBackend>,

    events_tx: broadcast::Sender<StorageEvent>,
}

impl Store {
    /// Open a store, loading its current entries from the backend
    pub async fn open(backend: impl StoreBackend) -> StoreResult<Self> {
        let entries = backend.load().await?;
        if let Some(path) = backend.location() {
            info!("Opened store {} ({} entries)", path.display(), entries.len());
        }
        Ok(Self::with_entries(Box::new(backend), entries))
    }

    /// A store with no persistence beyond this process
    pub fn in_memory() -> Self {
        Self::with_entries(Box::new(MemoryBackend::new()), Entries::new())
    }

    fn with_entries(backend: Box<dyn StoreBackend>, entries: Entries) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            inner: Arc::new(StoreInner {
                entries: RwLock::new(entries),
                write_lock: Mutex::new(()),
                backend,
                events_tx,
            }),
        }
    }

    /// Get the value of a key
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.entries.read().get(key).cloned()
    }

    /// Get and parse the value of a key. Unparseable values read as absent.
    pub fn get_parsed<T>(&self, key: &str) -> Option<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.get(key)?;
        match raw.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, value = %raw, "Ignoring unparseable store value: {}", e);
                None
            }
        }
    }

    /// File backing this store, if any
    pub fn location(&self) -> Option<PathBuf> {
        self.inner.backend.location().map(|p| p.to_path_buf())
    }

    /// Set a key. Returns whether the value changed.
    ///
    /// Writing the value a key already holds is a no-op and publishes nothing.
    /// A change is applied in memory and announced before it is persisted; if
    /// persisting fails the in-memory value stays.
    pub async fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
        origin: Origin,
    ) -> StoreResult<bool> {
        let key = key.into();
        let value = value.into();
        let _guard = self.inner.write_lock.lock().await;

        let (old_value, snapshot) = {
            let mut entries = self.inner.entries.write();
            if entries.get(&key) == Some(&value) {
                return Ok(false);
            }
            let old = entries.insert(key.clone(), value.clone());
            (old, entries.clone())
        };

        debug!(key = %key, value = %value, ?origin, "Store set");
        self.publish(StorageEvent::new(key, old_value, Some(value), origin));
        self.inner.backend.persist(&snapshot).await?;
        Ok(true)
    }

    /// Remove a key. Returns whether it was present.
    pub async fn remove(&self, key: &str, origin: Origin) -> StoreResult<bool> {
        let _guard = self.inner.write_lock.lock().await;

        let (old_value, snapshot) = {
            let mut entries = self.inner.entries.write();
            match entries.remove(key) {
                Some(old) => (old, entries.clone()),
                None => return Ok(false),
            }
        };

        debug!(key, ?origin, "Store remove");
        self.publish(StorageEvent::new(key, Some(old_value), None, origin));
        self.inner.backend.persist(&snapshot).await?;
        Ok(true)
    }

    /// Re-read the backend and announce every difference as an external change
    ///
    /// Returns the number of keys that changed.
    pub async fn reload(&self) -> StoreResult<usize> {
        let _guard = self.inner.write_lock.lock().await;
        let fresh = self.inner.backend.load().await?;

        let events: Vec<StorageEvent> = {
            let mut entries = self.inner.entries.write();
            let mut events = Vec::new();

            for (key, value) in &fresh {
                let old = entries.get(key);
                if old != Some(value) {
                    events.push(StorageEvent::new(
                        key.clone(),
                        old.cloned(),
                        Some(value.clone()),
                        Origin::External,
                    ));
                }
            }
            for (key, value) in entries.iter() {
                if !fresh.contains_key(key) {
                    events.push(StorageEvent::new(
                        key.clone(),
                        Some(value.clone()),
                        None,
                        Origin::External,
                    ));
                }
            }

            *entries = fresh;
            events
        };

        let changed = events.len();
        for event in events {
            self.publish(event);
        }
        if changed > 0 {
            info!("Store reloaded, {} keys changed externally", changed);
        }
        Ok(changed)
    }

    /// Subscribe to changes of keys matching any of the patterns
    pub fn subscribe<I, S>(&self, patterns: I) -> StoreSubscription
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subscription(patterns, None)
    }

    /// Subscribe on behalf of a session, skipping the session's own writes
    pub fn subscribe_as<I, S>(&self, session_id: Uuid, patterns: I) -> StoreSubscription
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subscription(patterns, Some(session_id))
    }

    fn subscription<I, S>(&self, patterns: I, own_session: Option<Uuid>) -> StoreSubscription
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StoreSubscription::new(
            self.inner.events_tx.subscribe(),
            patterns.into_iter().map(Into::into).collect(),
            own_session,
        )
    }

    fn publish(&self, event: StorageEvent) {
        // No receivers is fine
        let _ = self.inner.events_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{EMERGENCY_MODE_KEY, FileBackend};
    use idrak_types::EmergencyMode;

    #[tokio::test]
    async fn test_set_get_and_noop_write() {
        let store = Store::in_memory();
        let origin = Origin::Session(Uuid::new_v4());

        let changed = tokio_test::assert_ok!(store.set("k", "v", origin).await);
        assert!(changed);
        assert_eq!(store.get("k").as_deref(), Some("v"));
        assert!(!tokio_test::assert_ok!(store.set("k", "v", origin).await));
        assert!(store.remove("k", origin).await.unwrap());
        assert!(!store.remove("k", origin).await.unwrap());
        assert!(store.get("k").is_none());
    }

    #[tokio::test]
    async fn test_get_parsed() {
        let store = Store::in_memory();
        let origin = Origin::External;
        store.set(EMERGENCY_MODE_KEY, "incident", origin).await.unwrap();
        assert_eq!(
            store.get_parsed::<EmergencyMode>(EMERGENCY_MODE_KEY),
            Some(EmergencyMode::Incident)
        );

        store.set(EMERGENCY_MODE_KEY, "bogus", origin).await.unwrap();
        assert_eq!(store.get_parsed::<EmergencyMode>(EMERGENCY_MODE_KEY), None);
    }

    #[tokio::test]
    async fn test_events_reach_other_sessions_only() {
        let store = Store::in_memory();
        let writer = Uuid::new_v4();
        let reader = Uuid::new_v4();

        let mut writer_sub = store.subscribe_as(writer, ["idrak:*"]);
        let mut reader_sub = store.subscribe_as(reader, ["idrak:*"]);

        store
            .set(EMERGENCY_MODE_KEY, "emergency", Origin::Session(writer))
            .await
            .unwrap();

        let event = reader_sub.recv().await.unwrap();
        assert_eq!(event.key, EMERGENCY_MODE_KEY);
        assert_eq!(event.old_value, None);
        assert_eq!(event.new_value.as_deref(), Some("emergency"));

        let own =
            tokio::time::timeout(std::time::Duration::from_millis(50), writer_sub.recv()).await;
        assert!(own.is_err(), "writer must not see its own change");
    }

    #[tokio::test]
    async fn test_reload_publishes_external_changes() {
        let shared = MemoryBackend::new();
        let here = Store::open(shared.clone()).await.unwrap();
        let there = Store::open(shared.clone()).await.unwrap();

        let mut sub = here.subscribe(["*"]);

        there.set("a", "1", Origin::Session(Uuid::new_v4())).await.unwrap();
        there.set("b", "2", Origin::Session(Uuid::new_v4())).await.unwrap();

        assert_eq!(here.reload().await.unwrap(), 2);
        let first = sub.recv().await.unwrap();
        assert_eq!(first.origin, Origin::External);
        assert_eq!(here.get("b").as_deref(), Some("2"));

        // Nothing new on disk
        assert_eq!(here.reload().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_last_write_wins_across_stores() {
        let shared = MemoryBackend::new();
        let a = Store::open(shared.clone()).await.unwrap();
        let b = Store::open(shared.clone()).await.unwrap();

        a.set("mode", "incident", Origin::External).await.unwrap();
        b.set("mode", "emergency", Origin::External).await.unwrap();

        assert_eq!(shared.snapshot().get("mode").map(String::as_str), Some("emergency"));
        a.reload().await.unwrap();
        assert_eq!(a.get("mode").as_deref(), Some("emergency"));
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = Store::open(FileBackend::new(&path)).await.unwrap();
        store
            .set(EMERGENCY_MODE_KEY, "incident", Origin::External)
            .await
            .unwrap();
        drop(store);

        let reopened = Store::open(FileBackend::new(&path)).await.unwrap();
        assert_eq!(reopened.get(EMERGENCY_MODE_KEY).as_deref(), Some("incident"));
        assert_eq!(reopened.location(), Some(path));
    }
}
