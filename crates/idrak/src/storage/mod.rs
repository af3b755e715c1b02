//! Persisted Store
//!
//! An origin-scoped key-value store shared by every session of the server,
//! the counterpart of a browser's local storage. Writes are mirrored to a
//! backend and announced to subscribers as `StorageEvent`s.
//!
//! Conflict policy is last-write-wins. Writers in different processes sharing
//! one store file are not linearized: a read-modify-write in one process can
//! overwrite a concurrent write from another.

mod backend;
mod event;
mod store;
mod watcher;

pub use backend::*;
pub use event::*;
pub use store::*;
pub use watcher::*;

/// Key holding `"true"` once the landing page has been passed
pub const LANDING_PASSED_KEY: &str = "idrak:landing-passed";

/// Key holding the stringified emergency mode
pub const EMERGENCY_MODE_KEY: &str = "idrak:emergency-mode";

// ─────────────────────────────────────────────────────────────────────────────
// Store Error
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur while reading or writing the store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store file is not a JSON object of strings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store watcher failed: {0}")]
    Watch(#[from] notify::Error),

    #[error("Store has no file location to watch")]
    NotWatchable,
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
