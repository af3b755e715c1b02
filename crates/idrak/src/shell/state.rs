//! Shell State
//!
//! The whole transient view state of one session and the named transitions
//! that mutate it. Transitions are synchronous and total: a lookup that
//! misses never fails a transition, it only leaves the selection unresolved
//! for `resolve` to report.

use std::collections::BTreeMap;

use idrak_types::{
    CaseStatus, EmergencyMode, Language, MainSection, Phase, SimulationState, ViewLevel, ViewMode,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::catalog::Catalog;

/// Selected entity ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Selection {
    pub floor: Option<String>,
    pub room: Option<String>,
    pub incident: Option<String>,
    pub sensor: Option<String>,
    pub drill: Option<String>,
    pub floor_plan: Option<String>,
    pub creating_floor_plan: bool,
}

impl Selection {
    /// Clear the selections strictly deeper than `level`
    fn clear_below(&mut self, level: ViewLevel) {
        let Some(depth) = level.depth() else {
            return;
        };
        if depth < 1 {
            self.floor = None;
        }
        if depth < 2 {
            self.room = None;
        }
        if depth < 3 {
            self.incident = None;
        }
        if depth < 4 {
            self.sensor = None;
        }
    }

    fn clear_location(&mut self) {
        self.floor = None;
        self.room = None;
        self.incident = None;
        self.sensor = None;
    }
}

/// Persisted flags a shell is booted from
#[derive(Debug, Clone, Default)]
pub struct BootContext {
    pub persisted_mode: EmergencyMode,
    pub landing_passed: bool,
    /// Floor selected when booting straight into an emergency
    pub default_floor: String,
    pub case_statuses: BTreeMap<String, CaseStatus>,
}

/// View state of one session
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ShellState {
    phase: Phase,
    section: MainSection,
    view: ViewLevel,
    view_mode: ViewMode,
    language: Language,
    selection: Selection,
    emergency_mode: EmergencyMode,
    simulation: Option<SimulationState>,
    case_statuses: BTreeMap<String, CaseStatus>,
    /// Bumped on every return to the dashboard so the summary remounts
    summary_epoch: u64,
    sidebar_open: bool,
    architectural_view_open: bool,
}

impl Default for ShellState {
    fn default() -> Self {
        Self {
            phase: Phase::Landing,
            section: MainSection::Dashboard,
            view: ViewLevel::Summary,
            view_mode: ViewMode::Dashboard,
            language: Language::En,
            selection: Selection::default(),
            emergency_mode: EmergencyMode::Off,
            simulation: None,
            case_statuses: BTreeMap::new(),
            summary_epoch: 0,
            sidebar_open: false,
            architectural_view_open: false,
        }
    }
}

impl ShellState {
    /// Build the initial state of a session from persisted flags
    pub fn boot(ctx: BootContext) -> Self {
        let mut state = Self {
            case_statuses: ctx.case_statuses,
            emergency_mode: ctx.persisted_mode,
            ..Self::default()
        };

        if state.emergency_mode.is_active() && state.section == MainSection::Dashboard {
            state.view = ViewLevel::Emergency;
        }
        if state.emergency_mode == EmergencyMode::Emergency && state.selection.floor.is_none() {
            state.selection.floor = Some(ctx.default_floor);
        }
        if ctx.landing_passed {
            state.phase = Phase::Ready;
        }

        debug!(
            mode = %state.emergency_mode,
            phase = ?state.phase,
            view = %state.view,
            "Shell booted"
        );
        state
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn section(&self) -> MainSection {
        self.section
    }

    pub fn view(&self) -> ViewLevel {
        self.view
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn emergency_mode(&self) -> EmergencyMode {
        self.emergency_mode
    }

    pub fn simulation(&self) -> Option<&SimulationState> {
        self.simulation.as_ref()
    }

    pub fn case_statuses(&self) -> &BTreeMap<String, CaseStatus> {
        &self.case_statuses
    }

    pub fn case_status(&self, case_id: &str) -> Option<CaseStatus> {
        self.case_statuses.get(case_id).copied()
    }

    pub fn summary_epoch(&self) -> u64 {
        self.summary_epoch
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    pub fn architectural_view_open(&self) -> bool {
        self.architectural_view_open
    }

    // ─────────────────────────────────────────────────────────────────────
    // Phase
    // ─────────────────────────────────────────────────────────────────────

    /// Leave the landing page. Returns whether the phase changed.
    pub fn enter(&mut self) -> bool {
        if self.phase != Phase::Landing {
            return false;
        }
        self.phase = Phase::Loading;
        true
    }

    /// Finish the loading screen. Returns whether the phase changed.
    pub fn finish_loading(&mut self) -> bool {
        if self.phase != Phase::Loading {
            return false;
        }
        self.phase = Phase::Ready;
        true
    }

    // ─────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────

    pub fn handle_section_change(&mut self, section: MainSection) {
        self.section = section;
        if section == MainSection::Dashboard {
            self.view = ViewLevel::Summary;
            self.summary_epoch += 1;
        }
        self.selection.clear_location();
    }

    pub fn navigate_to_floor(&mut self, floor_id: impl Into<String>) {
        self.selection.floor = Some(floor_id.into());
        self.view = ViewLevel::Floor;
    }

    /// Select a room and, when the room resolves, its parent floor
    pub fn navigate_to_room(&mut self, room_id: impl Into<String>, catalog: &Catalog) {
        let room_id = room_id.into();
        if let Some(room) = catalog.find_room(&room_id) {
            self.selection.floor = Some(room.floor_id.clone());
        }
        self.selection.room = Some(room_id);
        self.view = ViewLevel::Room;
    }

    pub fn navigate_to_incident(&mut self, incident_id: impl Into<String>) {
        self.selection.incident = Some(incident_id.into());
        self.view = ViewLevel::Incident;
    }

    pub fn navigate_to_sensor(&mut self, sensor_id: impl Into<String>) {
        self.selection.sensor = Some(sensor_id.into());
        self.view = ViewLevel::Sensor;
    }

    /// Jump to a view level, clearing every deeper selection
    pub fn navigate_back(&mut self, level: ViewLevel) {
        self.view = level;
        self.selection.clear_below(level);
    }

    /// Breadcrumb navigation; same as `navigate_back`
    pub fn handle_navigate(&mut self, level: ViewLevel) {
        self.navigate_back(level);
    }

    /// Back from a facility screen to the dashboard summary
    pub fn return_to_summary(&mut self) {
        self.section = MainSection::Dashboard;
        self.navigate_back(ViewLevel::Summary);
    }

    pub fn close_incident_detail(&mut self) {
        self.selection.incident = None;
        self.view = ViewLevel::Incidents;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Layout
    // ─────────────────────────────────────────────────────────────────────

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    pub fn open_architectural_view(&mut self) {
        self.architectural_view_open = true;
    }

    pub fn close_architectural_view(&mut self) {
        self.architectural_view_open = false;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Drills and floor plans
    // ─────────────────────────────────────────────────────────────────────

    /// Open a drill from the case list, or pass `None` to go back to it
    pub fn select_drill(&mut self, drill_id: Option<String>) {
        self.selection.drill = drill_id;
    }

    pub fn update_case_status(&mut self, case_id: impl Into<String>, status: CaseStatus) {
        let case_id = case_id.into();
        debug!(case_id = %case_id, status = %status, "Case status updated");
        self.case_statuses.insert(case_id, status);
    }

    pub fn create_floor_plan(&mut self) {
        self.selection.creating_floor_plan = true;
    }

    pub fn edit_floor_plan(&mut self, plan_id: impl Into<String>) {
        self.selection.floor_plan = Some(plan_id.into());
    }

    pub fn close_floor_plan_editor(&mut self) {
        self.selection.creating_floor_plan = false;
        self.selection.floor_plan = None;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Emergency mode
    // ─────────────────────────────────────────────────────────────────────

    /// Demo control bar toggle
    ///
    /// An active mode forces the emergency dashboard. Switching off stops any
    /// simulation and leaves the emergency view.
    pub fn set_emergency_mode(&mut self, mode: EmergencyMode) {
        debug!(from = %self.emergency_mode, to = %mode, "Emergency mode set");
        self.emergency_mode = mode;
        if mode.is_active() {
            self.section = MainSection::Dashboard;
            self.view = ViewLevel::Emergency;
        } else {
            self.simulation = None;
            if self.view == ViewLevel::Emergency {
                self.view = ViewLevel::Summary;
            }
        }
    }

    /// React to a mode written by another session
    pub fn apply_remote_emergency_mode(&mut self, mode: EmergencyMode) {
        if mode == self.emergency_mode {
            return;
        }
        debug!(from = %self.emergency_mode, to = %mode, "Remote emergency mode applied");
        self.emergency_mode = mode;
        if mode.is_active() {
            if self.section == MainSection::Dashboard {
                self.view = ViewLevel::Emergency;
            }
        } else {
            self.simulation = None;
            if self.view == ViewLevel::Emergency {
                self.view = ViewLevel::Summary;
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Simulation
    // ─────────────────────────────────────────────────────────────────────

    pub fn start_simulation(&mut self, case_id: impl Into<String>, name: impl Into<String>) {
        let case_id = case_id.into();
        self.simulation = Some(SimulationState::started(name, Some(case_id.clone())));
        self.emergency_mode = EmergencyMode::Emergency;
        self.section = MainSection::Dashboard;
        self.view = ViewLevel::Emergency;
        self.selection.drill = Some(case_id);
    }

    /// Replace the simulation from a drill screen
    ///
    /// A running simulation shows the emergency dashboard. Clearing it while a
    /// drill is selected marks that case active and returns to the case.
    pub fn change_simulation_state(&mut self, simulation: Option<SimulationState>) {
        let running = simulation.as_ref().is_some_and(|s| s.is_running);
        let cleared = simulation.is_none();
        self.simulation = simulation;

        if running {
            self.section = MainSection::Dashboard;
            self.view = ViewLevel::Emergency;
        } else if cleared {
            if let Some(drill) = self.selection.drill.clone() {
                self.update_case_status(drill, CaseStatus::Active);
                self.section = MainSection::TacticalCases;
            }
        }
    }

    /// Emergency bar close button
    pub fn close_simulation(&mut self) {
        self.set_emergency_mode(EmergencyMode::Off);
        self.change_simulation_state(None);
    }

    pub fn toggle_pause(&mut self) {
        if let Some(sim) = self.simulation.as_mut() {
            sim.is_paused = !sim.is_paused;
        }
    }

    pub fn cycle_speed(&mut self) {
        if let Some(sim) = self.simulation.as_mut() {
            sim.speed = sim.speed.next();
        }
    }

    /// Move the simulation to an absolute scenario time
    pub fn seek(&mut self, seconds: u32) {
        if let Some(sim) = self.simulation.as_mut() {
            sim.current_time = seconds;
        }
    }

    /// Apply one clock period. Returns whether the time advanced.
    pub fn tick(&mut self) -> bool {
        self.simulation.as_mut().is_some_and(|sim| sim.tick())
    }
}
