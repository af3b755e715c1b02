//! Storage Events
//!
//! Change notifications published by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::warn;
use uuid::Uuid;
use wildmatch::WildMatch;

// ─────────────────────────────────────────────────────────────────────────────
// Origin
// ─────────────────────────────────────────────────────────────────────────────

/// Who wrote a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Origin {
    /// A session of this process
    Session(Uuid),
    /// Another process, detected by reloading the backend
    External,
}

// ─────────────────────────────────────────────────────────────────────────────
// Storage Event
// ─────────────────────────────────────────────────────────────────────────────

/// A change of one key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageEvent {
    pub key: String,

    /// Value before the change, `None` if the key was absent
    pub old_value: Option<String>,

    /// Value after the change, `None` if the key was removed
    pub new_value: Option<String>,

    pub origin: Origin,

    pub timestamp: DateTime<Utc>,
}

impl StorageEvent {
    /// Create a new event stamped with the current time
    pub fn new(
        key: impl Into<String>,
        old_value: Option<String>,
        new_value: Option<String>,
        origin: Origin,
    ) -> Self {
        Self {
            key: key.into(),
            old_value,
            new_value,
            origin,
            timestamp: Utc::now(),
        }
    }

    /// Check if the key matches a subscription pattern
    ///
    /// Patterns are globs: `"*"` matches every key, `"idrak:*"` every key with
    /// that prefix, anything else must match exactly.
    pub fn matches(&self, pattern: &str) -> bool {
        if pattern == "*" {
            return true;
        }
        if pattern.contains('*') || pattern.contains('?') {
            return WildMatch::new(pattern).matches(&self.key);
        }
        self.key == pattern
    }

    /// Whether the given session wrote this change
    pub fn is_from(&self, session_id: Uuid) -> bool {
        self.origin == Origin::Session(session_id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Subscription
// ─────────────────────────────────────────────────────────────────────────────

/// A filtered receiver of storage events
///
/// Events written by `own_session` are skipped, the way a browser tab never
/// sees `storage` events for its own writes.
pub struct StoreSubscription {
    rx: broadcast::Receiver<StorageEvent>,
    patterns: Vec<String>,
    own_session: Option<Uuid>,
}

impl StoreSubscription {
    pub(crate) fn new(
        rx: broadcast::Receiver<StorageEvent>,
        patterns: Vec<String>,
        own_session: Option<Uuid>,
    ) -> Self {
        Self {
            rx,
            patterns,
            own_session,
        }
    }

    /// Wait for the next matching event. Returns `None` once the store is gone.
    pub async fn recv(&mut self) -> Option<StorageEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Storage subscriber lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    fn accepts(&self, event: &StorageEvent) -> bool {
        if let Some(own) = self.own_session {
            if event.is_from(own) {
                return false;
            }
        }
        self.patterns.iter().any(|p| event.matches(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_matching() {
        let event = StorageEvent::new(
            "idrak:emergency-mode",
            None,
            Some("incident".into()),
            Origin::External,
        );

        assert!(event.matches("idrak:emergency-mode"));
        assert!(event.matches("idrak:*"));
        assert!(event.matches("*"));
        assert!(!event.matches("idrak:landing-passed"));
        assert!(!event.matches("other:*"));
    }

    #[test]
    fn test_event_origin() {
        let session = Uuid::new_v4();
        let event = StorageEvent::new("k", None, Some("v".into()), Origin::Session(session));
        assert!(event.is_from(session));
        assert!(!event.is_from(Uuid::new_v4()));
    }

    #[tokio::test]
    async fn test_subscription_skips_own_writes() {
        let (tx, rx) = broadcast::channel(8);
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut sub = StoreSubscription::new(rx, vec!["idrak:*".into()], Some(me));

        tx.send(StorageEvent::new("idrak:a", None, Some("1".into()), Origin::Session(me)))
            .unwrap();
        tx.send(StorageEvent::new("unrelated", None, Some("2".into()), Origin::Session(other)))
            .unwrap();
        tx.send(StorageEvent::new(
            "idrak:a",
            Some("1".into()),
            Some("3".into()),
            Origin::Session(other),
        ))
        .unwrap();

        let event = sub.recv().await.unwrap();
        assert_eq!(event.new_value.as_deref(), Some("3"));
        assert!(event.is_from(other));
    }
}
