//! Shell commands sent by clients

use idrak_types::{
    CaseStatus, EmergencyMode, Language, MainSection, SimulationState, ViewLevel, ViewMode,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::ShellState;
use crate::catalog::Catalog;

/// A user action against the shell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ShellCommand {
    /// Landing page "enter" button
    Enter,
    FinishLoading,

    SectionChange { section: MainSection },
    NavigateToFloor { floor_id: String },
    NavigateToRoom { room_id: String },
    NavigateToIncident { incident_id: String },
    NavigateToSensor { sensor_id: String },
    /// Breadcrumb or back button
    Navigate { view: ViewLevel },
    ReturnToSummary,
    CloseIncidentDetail,

    SetViewMode { mode: ViewMode },
    SetLanguage { language: Language },
    ToggleSidebar,
    OpenArchitecturalView,
    CloseArchitecturalView,

    SelectDrill { drill_id: Option<String> },
    UpdateCaseStatus { case_id: String, status: CaseStatus },
    CreateFloorPlan,
    EditFloorPlan { plan_id: String },
    CloseFloorPlanEditor,

    SetEmergencyMode { mode: EmergencyMode },
    StartSimulation { case_id: String, name: String },
    ChangeSimulationState { state: Option<SimulationState> },
    CloseSimulation,
    TogglePause,
    CycleSpeed,
    Seek { seconds: u32 },
}

impl ShellCommand {
    /// Apply the command to a shell
    pub fn apply(self, shell: &mut ShellState, catalog: &Catalog) {
        match self {
            ShellCommand::Enter => {
                shell.enter();
            }
            ShellCommand::FinishLoading => {
                shell.finish_loading();
            }
            ShellCommand::SectionChange { section } => shell.handle_section_change(section),
            ShellCommand::NavigateToFloor { floor_id } => shell.navigate_to_floor(floor_id),
            ShellCommand::NavigateToRoom { room_id } => shell.navigate_to_room(room_id, catalog),
            ShellCommand::NavigateToIncident { incident_id } => {
                shell.navigate_to_incident(incident_id)
            }
            ShellCommand::NavigateToSensor { sensor_id } => shell.navigate_to_sensor(sensor_id),
            ShellCommand::Navigate { view } => shell.handle_navigate(view),
            ShellCommand::ReturnToSummary => shell.return_to_summary(),
            ShellCommand::CloseIncidentDetail => shell.close_incident_detail(),
            ShellCommand::SetViewMode { mode } => shell.set_view_mode(mode),
            ShellCommand::SetLanguage { language } => shell.set_language(language),
            ShellCommand::ToggleSidebar => shell.toggle_sidebar(),
            ShellCommand::OpenArchitecturalView => shell.open_architectural_view(),
            ShellCommand::CloseArchitecturalView => shell.close_architectural_view(),
            ShellCommand::SelectDrill { drill_id } => shell.select_drill(drill_id),
            ShellCommand::UpdateCaseStatus { case_id, status } => {
                shell.update_case_status(case_id, status)
            }
            ShellCommand::CreateFloorPlan => shell.create_floor_plan(),
            ShellCommand::EditFloorPlan { plan_id } => shell.edit_floor_plan(plan_id),
            ShellCommand::CloseFloorPlanEditor => shell.close_floor_plan_editor(),
            ShellCommand::SetEmergencyMode { mode } => shell.set_emergency_mode(mode),
            ShellCommand::StartSimulation { case_id, name } => {
                shell.start_simulation(case_id, name)
            }
            ShellCommand::ChangeSimulationState { state } => shell.change_simulation_state(state),
            ShellCommand::CloseSimulation => shell.close_simulation(),
            ShellCommand::TogglePause => shell.toggle_pause(),
            ShellCommand::CycleSpeed => shell.cycle_speed(),
            ShellCommand::Seek { seconds } => shell.seek(seconds),
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            ShellCommand::Enter => "enter",
            ShellCommand::FinishLoading => "finish_loading",
            ShellCommand::SectionChange { .. } => "section_change",
            ShellCommand::NavigateToFloor { .. } => "navigate_to_floor",
            ShellCommand::NavigateToRoom { .. } => "navigate_to_room",
            ShellCommand::NavigateToIncident { .. } => "navigate_to_incident",
            ShellCommand::NavigateToSensor { .. } => "navigate_to_sensor",
            ShellCommand::Navigate { .. } => "navigate",
            ShellCommand::ReturnToSummary => "return_to_summary",
            ShellCommand::CloseIncidentDetail => "close_incident_detail",
            ShellCommand::SetViewMode { .. } => "set_view_mode",
            ShellCommand::SetLanguage { .. } => "set_language",
            ShellCommand::ToggleSidebar => "toggle_sidebar",
            ShellCommand::OpenArchitecturalView => "open_architectural_view",
            ShellCommand::CloseArchitecturalView => "close_architectural_view",
            ShellCommand::SelectDrill { .. } => "select_drill",
            ShellCommand::UpdateCaseStatus { .. } => "update_case_status",
            ShellCommand::CreateFloorPlan => "create_floor_plan",
            ShellCommand::EditFloorPlan { .. } => "edit_floor_plan",
            ShellCommand::CloseFloorPlanEditor => "close_floor_plan_editor",
            ShellCommand::SetEmergencyMode { .. } => "set_emergency_mode",
            ShellCommand::StartSimulation { .. } => "start_simulation",
            ShellCommand::ChangeSimulationState { .. } => "change_simulation_state",
            ShellCommand::CloseSimulation => "close_simulation",
            ShellCommand::TogglePause => "toggle_pause",
            ShellCommand::CycleSpeed => "cycle_speed",
            ShellCommand::Seek { .. } => "seek",
        }
    }
}
