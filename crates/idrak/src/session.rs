//! Session
//!
//! One connected client, the server-side counterpart of a dashboard tab. A
//! session owns its `ShellState` outright; the shell is only touched from the
//! task that drives the session, so no locking is involved.

use std::sync::Arc;
use std::time::Duration;

use idrak_types::{EmergencyMode, Phase};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::shell::{BootContext, ShellCommand, ShellSnapshot, ShellState};
use crate::simulation::{ClockParams, ClockTick, SimulationClock};
use crate::storage::{
    EMERGENCY_MODE_KEY, LANDING_PASSED_KEY, Origin, StorageEvent, Store, StoreError,
    StoreSubscription,
};

/// Store keys a session reacts to
const WATCHED_KEYS: &str = "idrak:*";

/// Errors surfaced to the client whose command caused them
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to persist shell state: {0}")]
    Store(#[from] StoreError),
}

/// Per-session settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub tick_interval: Duration,
    pub loading_delay: Duration,
    pub default_floor: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            loading_delay: Duration::from_millis(2500),
            default_floor: "floor-a-2".to_string(),
        }
    }
}

/// Something that happened to a session outside of client commands
#[derive(Debug)]
pub enum SessionEvent {
    Tick,
    Storage(StorageEvent),
    LoadingFinished,
}

pub struct Session {
    id: Uuid,
    shell: ShellState,
    catalog: Arc<Catalog>,
    store: Store,
    clock: SimulationClock,
    ticks: mpsc::Receiver<ClockTick>,
    storage: StoreSubscription,
    loading_until: Option<Instant>,
    config: SessionConfig,
}

impl Session {
    /// Create a session and boot its shell from the persisted flags
    ///
    /// Must be called from within a tokio runtime.
    pub fn boot(id: Uuid, catalog: Arc<Catalog>, store: Store, config: SessionConfig) -> Self {
        // Subscribe before reading so no change slips between the two
        let storage = store.subscribe_as(id, [WATCHED_KEYS]);

        let shell = ShellState::boot(BootContext {
            persisted_mode: store.get_parsed(EMERGENCY_MODE_KEY).unwrap_or_default(),
            landing_passed: store.get(LANDING_PASSED_KEY).as_deref() == Some("true"),
            default_floor: config.default_floor.clone(),
            case_statuses: catalog.initial_case_statuses(),
        });

        let (ticks_tx, ticks) = mpsc::channel(16);
        let clock = SimulationClock::spawn(config.tick_interval, ticks_tx);

        info!(session_id = %id, mode = %shell.emergency_mode(), "Session booted");

        Self {
            id,
            shell,
            catalog,
            store,
            clock,
            ticks,
            storage,
            loading_until: None,
            config,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn shell(&self) -> &ShellState {
        &self.shell
    }

    pub fn snapshot(&self) -> ShellSnapshot {
        ShellSnapshot::capture(&self.shell, &self.catalog)
    }

    /// Apply a client command
    ///
    /// The shell transition always happens. A store failure while mirroring
    /// the result is returned, but the new state is kept.
    pub async fn apply(&mut self, command: ShellCommand) -> Result<(), SessionError> {
        debug!(session_id = %self.id, command = command.name(), "Applying command");

        let mode_before = self.shell.emergency_mode();
        let phase_before = self.shell.phase();

        command.apply(&mut self.shell, &self.catalog);

        self.sync_clock();
        if phase_before != self.shell.phase() {
            self.on_phase_change().await?;
        }
        if mode_before != self.shell.emergency_mode() {
            self.persist_mode(self.shell.emergency_mode()).await?;
        }
        Ok(())
    }

    /// Wait for the next background event
    ///
    /// Cancel safe. Returns `None` once every event source is gone.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        let loading = self.loading_until;
        tokio::select! {
            Some(ClockTick) = self.ticks.recv() => Some(SessionEvent::Tick),
            Some(event) = self.storage.recv() => Some(SessionEvent::Storage(event)),
            _ = tokio::time::sleep_until(loading.unwrap_or_else(Instant::now)),
                if loading.is_some() =>
            {
                Some(SessionEvent::LoadingFinished)
            }
            else => None,
        }
    }

    /// Apply a background event. Returns whether the shell changed.
    pub fn handle_event(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::Tick => self.shell.tick(),
            SessionEvent::Storage(event) => self.on_storage_event(event),
            SessionEvent::LoadingFinished => {
                self.loading_until = None;
                self.shell.finish_loading()
            }
        }
    }

    fn on_storage_event(&mut self, event: StorageEvent) -> bool {
        if event.key != EMERGENCY_MODE_KEY {
            return false;
        }

        let mode = match event.new_value.as_deref().map(str::parse::<EmergencyMode>) {
            None => EmergencyMode::Off,
            Some(Ok(mode)) => mode,
            Some(Err(e)) => {
                warn!(session_id = %self.id, "Ignoring remote emergency mode: {}", e);
                return false;
            }
        };

        if mode == self.shell.emergency_mode() {
            return false;
        }
        debug!(
            session_id = %self.id,
            origin = ?event.origin,
            mode = %mode,
            "Remote emergency mode"
        );
        self.shell.apply_remote_emergency_mode(mode);
        self.sync_clock();
        true
    }

    async fn on_phase_change(&mut self) -> Result<(), StoreError> {
        match self.shell.phase() {
            Phase::Loading => {
                self.loading_until = Some(Instant::now() + self.config.loading_delay);
                self.store
                    .set(LANDING_PASSED_KEY, "true", Origin::Session(self.id))
                    .await?;
            }
            Phase::Ready | Phase::Landing => self.loading_until = None,
        }
        Ok(())
    }

    async fn persist_mode(&self, mode: EmergencyMode) -> Result<(), StoreError> {
        self.store
            .set(EMERGENCY_MODE_KEY, mode.as_persisted(), Origin::Session(self.id))
            .await?;
        Ok(())
    }

    fn sync_clock(&self) {
        let params = ClockParams::from_simulation(self.shell.simulation());
        if self.clock.update(params) {
            debug!(session_id = %self.id, ?params, "Simulation clock reset");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        info!(session_id = %self.id, "Session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogLoader;
    use crate::storage::MemoryBackend;
    use idrak_types::{CaseStatus, MainSection, ViewLevel};

    fn catalog() -> Arc<Catalog> {
        Arc::new(CatalogLoader::builtin().unwrap())
    }

    async fn passed_store() -> Store {
        let store = Store::in_memory();
        store
            .set(LANDING_PASSED_KEY, "true", Origin::External)
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_mode_change_reaches_other_session() {
        let store = passed_store().await;
        let catalog = catalog();
        let mut a = Session::boot(
            Uuid::new_v4(),
            catalog.clone(),
            store.clone(),
            SessionConfig::default(),
        );
        let mut b =
            Session::boot(Uuid::new_v4(), catalog, store.clone(), SessionConfig::default());

        a.apply(ShellCommand::SetEmergencyMode {
            mode: EmergencyMode::Incident,
        })
        .await
        .unwrap();
        assert_eq!(store.get(EMERGENCY_MODE_KEY).as_deref(), Some("incident"));

        let event = b.next_event().await.unwrap();
        assert!(b.handle_event(event));
        assert_eq!(b.shell().emergency_mode(), EmergencyMode::Incident);
        assert_eq!(b.shell().view(), ViewLevel::Emergency);

        let own = tokio::time::timeout(Duration::from_millis(50), a.next_event()).await;
        assert!(own.is_err(), "origin session must not see its own write");

        b.apply(ShellCommand::SetEmergencyMode {
            mode: EmergencyMode::Off,
        })
        .await
        .unwrap();
        let event = a.next_event().await.unwrap();
        assert!(a.handle_event(event));
        assert_eq!(a.shell().view(), ViewLevel::Summary);
    }

    #[tokio::test]
    async fn test_persisted_mode_survives_fresh_boot() {
        let backend = MemoryBackend::new();
        let store = Store::open(backend.clone()).await.unwrap();
        let mut first = Session::boot(Uuid::new_v4(), catalog(), store, SessionConfig::default());
        first.apply(ShellCommand::Enter).await.unwrap();
        first
            .apply(ShellCommand::StartSimulation {
                case_id: "3".into(),
                name: "Chemical Agent Attack Response".into(),
            })
            .await
            .unwrap();
        drop(first);

        let store = Store::open(backend).await.unwrap();
        let second = Session::boot(Uuid::new_v4(), catalog(), store, SessionConfig::default());
        let shell = second.shell();
        assert_eq!(shell.phase(), Phase::Ready);
        assert_eq!(shell.emergency_mode(), EmergencyMode::Emergency);
        assert_eq!(shell.view(), ViewLevel::Emergency);
        assert_eq!(shell.selection().floor.as_deref(), Some("floor-a-2"));
        // The simulation itself is not persisted
        assert!(shell.simulation().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_advances_session_simulation() {
        let store = passed_store().await;
        let mut session = Session::boot(Uuid::new_v4(), catalog(), store, SessionConfig::default());

        session
            .apply(ShellCommand::StartSimulation {
                case_id: "3".into(),
                name: "Drill".into(),
            })
            .await
            .unwrap();
        session.apply(ShellCommand::CycleSpeed).await.unwrap();

        let started = Instant::now();
        for _ in 0..3 {
            let event = session.next_event().await.unwrap();
            assert!(matches!(event, SessionEvent::Tick));
            session.handle_event(event);
        }
        assert!(started.elapsed() >= Duration::from_secs(3));
        assert_eq!(session.shell().simulation().unwrap().current_time, 6);

        session.apply(ShellCommand::TogglePause).await.unwrap();
        let quiet = tokio::time::timeout(Duration::from_secs(5), session.next_event()).await;
        assert!(quiet.is_err());
        assert_eq!(session.shell().simulation().unwrap().current_time, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enter_runs_loading_screen() {
        let store = Store::in_memory();
        let mut session =
            Session::boot(Uuid::new_v4(), catalog(), store.clone(), SessionConfig::default());
        assert_eq!(session.shell().phase(), Phase::Landing);

        session.apply(ShellCommand::Enter).await.unwrap();
        assert_eq!(session.shell().phase(), Phase::Loading);
        assert_eq!(store.get(LANDING_PASSED_KEY).as_deref(), Some("true"));

        let started = Instant::now();
        let event = session.next_event().await.unwrap();
        assert!(matches!(event, SessionEvent::LoadingFinished));
        assert!(session.handle_event(event));
        assert!(started.elapsed() >= Duration::from_millis(2500));
        assert_eq!(session.shell().phase(), Phase::Ready);
    }

    #[tokio::test]
    async fn test_close_simulation_round_trip() {
        let store = passed_store().await;
        let mut session =
            Session::boot(Uuid::new_v4(), catalog(), store.clone(), SessionConfig::default());

        session
            .apply(ShellCommand::SectionChange {
                section: MainSection::TacticalCases,
            })
            .await
            .unwrap();
        session
            .apply(ShellCommand::StartSimulation {
                case_id: "3".into(),
                name: "Drill".into(),
            })
            .await
            .unwrap();
        assert!(session.clock.params().is_ticking());

        session.apply(ShellCommand::CloseSimulation).await.unwrap();
        assert!(!session.clock.params().is_ticking());
        assert_eq!(store.get(EMERGENCY_MODE_KEY).as_deref(), Some("false"));
        assert_eq!(session.shell().section(), MainSection::TacticalCases);
        assert_eq!(session.shell().case_status("3"), Some(CaseStatus::Active));
    }

    #[tokio::test]
    async fn test_external_write_is_applied() {
        let store = passed_store().await;
        let mut session =
            Session::boot(Uuid::new_v4(), catalog(), store.clone(), SessionConfig::default());

        store
            .set(EMERGENCY_MODE_KEY, "emergency", Origin::External)
            .await
            .unwrap();
        let event = session.next_event().await.unwrap();
        assert!(session.handle_event(event));
        assert_eq!(session.shell().view(), ViewLevel::Emergency);

        // Garbage is ignored
        store
            .set(EMERGENCY_MODE_KEY, "maybe", Origin::External)
            .await
            .unwrap();
        let event = session.next_event().await.unwrap();
        assert!(!session.handle_event(event));
        assert_eq!(session.shell().emergency_mode(), EmergencyMode::Emergency);
    }

    #[tokio::test]
    async fn test_remote_off_stops_simulation_away_from_emergency_view() {
        let store = passed_store().await;
        let mut session =
            Session::boot(Uuid::new_v4(), catalog(), store.clone(), SessionConfig::default());

        session
            .apply(ShellCommand::StartSimulation {
                case_id: "3".into(),
                name: "Drill".into(),
            })
            .await
            .unwrap();
        session
            .apply(ShellCommand::Navigate {
                view: ViewLevel::Floors,
            })
            .await
            .unwrap();
        assert_eq!(session.shell().view(), ViewLevel::Floors);
        assert!(session.clock.params().is_ticking());

        store
            .set(EMERGENCY_MODE_KEY, "false", Origin::External)
            .await
            .unwrap();
        let event = session.next_event().await.unwrap();
        assert!(matches!(event, SessionEvent::Storage(_)));
        assert!(session.handle_event(event));

        assert_eq!(session.shell().emergency_mode(), EmergencyMode::Off);
        assert_eq!(session.shell().view(), ViewLevel::Floors);
        assert!(session.shell().simulation().is_none());
        assert!(!session.clock.params().is_ticking());
        assert!(!session.snapshot().chrome.emergency_bar);
    }
}
