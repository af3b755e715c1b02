//! Server Application State
//!
//! Shared state accessible by all WebSocket handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::session::SessionConfig;
use crate::storage::Store;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Facility seed data, read-only after startup
    catalog: Arc<Catalog>,

    /// Persisted store shared by every session
    store: Store,

    session_config: SessionConfig,

    /// Connected clients
    clients: DashMap<Uuid, ClientInfo>,
}

/// Per-client bookkeeping
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub session_id: Uuid,
    pub connected_at: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(catalog: Catalog, store: Store, session_config: SessionConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                catalog: Arc::new(catalog),
                store,
                session_config,
                clients: DashMap::new(),
            }),
        }
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        self.inner.catalog.clone()
    }

    pub fn store(&self) -> Store {
        self.inner.store.clone()
    }

    pub fn session_config(&self) -> SessionConfig {
        self.inner.session_config.clone()
    }

    /// Register a new client and return its session ID
    pub fn register_client(&self) -> Uuid {
        let session_id = Uuid::new_v4();
        self.inner.clients.insert(
            session_id,
            ClientInfo {
                session_id,
                connected_at: Utc::now(),
            },
        );
        tracing::info!("Client connected: {}", session_id);
        session_id
    }

    /// Remove a client
    pub fn remove_client(&self, session_id: Uuid) {
        if let Some((_, info)) = self.inner.clients.remove(&session_id) {
            let duration = Utc::now() - info.connected_at;
            tracing::info!(
                "Client disconnected: {} (connected {}s)",
                session_id,
                duration.num_seconds()
            );
        }
    }

    /// Get connected client count
    pub fn client_count(&self) -> usize {
        self.inner.clients.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_registry() {
        let state = AppState::new(Catalog::default(), Store::in_memory(), SessionConfig::default());
        let a = state.register_client();
        let b = state.register_client();
        assert_ne!(a, b);
        assert_eq!(state.client_count(), 2);

        state.remove_client(a);
        state.remove_client(a);
        assert_eq!(state.client_count(), 1);
    }
}
