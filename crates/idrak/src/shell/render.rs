//! View Resolution
//!
//! Maps `{phase, section, view, selections}` onto the screen a client should
//! render. Configuration sections are checked first; only the dashboard
//! section falls through to the drill-down view level.

use idrak_types::{
    Building, CaseStatus, EmergencyMode, Floor, Incident, MainSection, Phase, Room,
    SimulationState, TacticalCase, Threat, ViewLevel, ViewMode,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::ShellState;
use crate::catalog::{Catalog, FloorStats, SensorRecord};

/// Kind of entity a selection refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Floor,
    Room,
    Incident,
    Sensor,
    Case,
}

/// A floor with its aggregated room statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FloorOverview {
    pub floor: Floor,
    pub stats: FloorStats,
}

/// A tactical case with its current status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CaseOverview {
    #[serde(rename = "case")]
    pub tactical_case: TacticalCase,
    pub status: CaseStatus,
}

/// The screen to render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum ViewDescriptor {
    Landing,
    Loading,

    // Dashboard drill-down
    Summary {
        epoch: u64,
        view_mode: ViewMode,
        buildings: Vec<Building>,
        floors: Vec<FloorOverview>,
        open_incidents: Vec<Incident>,
    },
    EmergencyDashboard {
        mode: EmergencyMode,
        simulation: Option<SimulationState>,
        incidents: Vec<Incident>,
    },
    BuildingDiagram {
        mode: EmergencyMode,
        floors: Vec<FloorOverview>,
    },
    FloorList {
        floors: Vec<FloorOverview>,
    },
    IncidentList {
        incidents: Vec<Incident>,
    },
    SensorList {
        sensors: Vec<SensorRecord>,
    },
    FacilityMap {
        buildings: Vec<Building>,
    },
    FloorPlan {
        floor: Floor,
        stats: FloorStats,
        rooms: Vec<Room>,
        incidents: Vec<Incident>,
    },
    RoomList {
        floor: Floor,
        stats: FloorStats,
        rooms: Vec<Room>,
    },
    RoomDetail {
        room: Room,
        floor: Option<Floor>,
        view_mode: ViewMode,
        incidents: Vec<Incident>,
    },
    IncidentDetail {
        incident: Incident,
    },
    SensorDetail {
        sensor: SensorRecord,
    },

    // Sections
    CaseList {
        cases: Vec<CaseOverview>,
        mode: EmergencyMode,
    },
    DraftScenario {
        #[serde(rename = "case")]
        tactical_case: TacticalCase,
        threats: Vec<Threat>,
    },
    ScenarioDetail {
        #[serde(rename = "case")]
        tactical_case: TacticalCase,
        status: CaseStatus,
        threats: Vec<Threat>,
    },
    FloorPlanList,
    FloorPlanEditor {
        plan_id: Option<String>,
    },
    Automation,
    CbrneAttacks,
    Equipment,
    Settings {
        section: MainSection,
    },

    /// A selected id that does not resolve in the catalog
    NotFound {
        kind: EntityKind,
        id: String,
    },

    /// A detail view level without its selection
    Empty {
        view: ViewLevel,
    },
}

/// Resolve the screen for the current state
pub fn resolve(state: &ShellState, catalog: &Catalog) -> ViewDescriptor {
    match state.phase() {
        Phase::Landing => return ViewDescriptor::Landing,
        Phase::Loading => return ViewDescriptor::Loading,
        Phase::Ready => {}
    }

    match state.section() {
        MainSection::Dashboard => resolve_dashboard(state, catalog),
        MainSection::Automation => ViewDescriptor::Automation,
        MainSection::FacilityFloors | MainSection::FacilityRooms => ViewDescriptor::FloorList {
            floors: floor_overviews(catalog),
        },
        MainSection::FacilitySensors => ViewDescriptor::SensorList {
            sensors: all_sensors(catalog),
        },
        MainSection::FacilityEquipment => ViewDescriptor::Equipment,
        MainSection::Incidents => match &state.selection().incident {
            Some(id) => incident_detail(catalog, id),
            None => ViewDescriptor::IncidentList {
                incidents: catalog.incidents.clone(),
            },
        },
        MainSection::CbrneAttacks => ViewDescriptor::CbrneAttacks,
        MainSection::TacticalCases => resolve_cases(state, catalog),
        MainSection::LayoutTests => {
            let selection = state.selection();
            if selection.creating_floor_plan || selection.floor_plan.is_some() {
                ViewDescriptor::FloorPlanEditor {
                    plan_id: selection.floor_plan.clone(),
                }
            } else {
                ViewDescriptor::FloorPlanList
            }
        }
        section @ (MainSection::Thresholds
        | MainSection::Alarms
        | MainSection::Escalation
        | MainSection::Users
        | MainSection::Notifications
        | MainSection::Preferences) => ViewDescriptor::Settings { section },
    }
}

fn resolve_dashboard(state: &ShellState, catalog: &Catalog) -> ViewDescriptor {
    let selection = state.selection();
    let architectural = state.view_mode() == ViewMode::Architectural;

    match state.view() {
        ViewLevel::Summary => ViewDescriptor::Summary {
            epoch: state.summary_epoch(),
            view_mode: state.view_mode(),
            buildings: catalog.buildings.clone(),
            floors: floor_overviews(catalog),
            open_incidents: catalog
                .incidents
                .iter()
                .filter(|i| i.is_open())
                .cloned()
                .collect(),
        },
        ViewLevel::Emergency if architectural => ViewDescriptor::BuildingDiagram {
            mode: state.emergency_mode(),
            floors: floor_overviews(catalog),
        },
        ViewLevel::Emergency => ViewDescriptor::EmergencyDashboard {
            mode: state.emergency_mode(),
            simulation: state.simulation().cloned(),
            incidents: catalog.incidents.clone(),
        },
        ViewLevel::Floors => ViewDescriptor::FloorList {
            floors: floor_overviews(catalog),
        },
        ViewLevel::Incidents => ViewDescriptor::IncidentList {
            incidents: catalog.incidents.clone(),
        },
        ViewLevel::Sensors => ViewDescriptor::SensorList {
            sensors: all_sensors(catalog),
        },
        ViewLevel::Map => ViewDescriptor::FacilityMap {
            buildings: catalog.buildings.clone(),
        },
        ViewLevel::Floor => {
            let Some(id) = &selection.floor else {
                return ViewDescriptor::Empty { view: ViewLevel::Floor };
            };
            let Some(floor) = catalog.get_floor(id) else {
                return not_found(EntityKind::Floor, id);
            };
            let stats = catalog.get_floor_stats(id);
            let rooms = catalog.get_rooms_by_floor(id).into_iter().cloned().collect();
            if architectural {
                ViewDescriptor::FloorPlan {
                    floor: floor.clone(),
                    stats,
                    rooms,
                    incidents: catalog.incidents_on_floor(id).into_iter().cloned().collect(),
                }
            } else {
                ViewDescriptor::RoomList {
                    floor: floor.clone(),
                    stats,
                    rooms,
                }
            }
        }
        ViewLevel::Room => {
            let Some(id) = &selection.room else {
                return ViewDescriptor::Empty { view: ViewLevel::Room };
            };
            let Some(room) = catalog.find_room(id) else {
                return not_found(EntityKind::Room, id);
            };
            ViewDescriptor::RoomDetail {
                room: room.clone(),
                floor: catalog.get_floor(&room.floor_id).cloned(),
                view_mode: state.view_mode(),
                incidents: catalog
                    .incidents
                    .iter()
                    .filter(|i| i.room_id.as_deref() == Some(id.as_str()))
                    .cloned()
                    .collect(),
            }
        }
        ViewLevel::Incident => match &selection.incident {
            Some(id) => incident_detail(catalog, id),
            None => ViewDescriptor::Empty { view: ViewLevel::Incident },
        },
        ViewLevel::Sensor => {
            let Some(id) = &selection.sensor else {
                return ViewDescriptor::Empty { view: ViewLevel::Sensor };
            };
            match catalog.find_sensor(id) {
                Some(sensor) => ViewDescriptor::SensorDetail { sensor },
                None => not_found(EntityKind::Sensor, id),
            }
        }
    }
}

fn resolve_cases(state: &ShellState, catalog: &Catalog) -> ViewDescriptor {
    let Some(drill) = &state.selection().drill else {
        return ViewDescriptor::CaseList {
            cases: catalog
                .cases
                .iter()
                .map(|c| CaseOverview {
                    status: state.case_status(&c.id).unwrap_or(c.status),
                    tactical_case: c.clone(),
                })
                .collect(),
            mode: state.emergency_mode(),
        };
    };

    let Some(tactical_case) = catalog.get_case(drill) else {
        return not_found(EntityKind::Case, drill);
    };
    let status = state.case_status(drill).unwrap_or(tactical_case.status);
    let threats = catalog.get_scenario_threats(drill);

    if status == CaseStatus::Draft {
        ViewDescriptor::DraftScenario {
            tactical_case: tactical_case.clone(),
            threats,
        }
    } else {
        ViewDescriptor::ScenarioDetail {
            tactical_case: tactical_case.clone(),
            status,
            threats,
        }
    }
}

fn incident_detail(catalog: &Catalog, id: &str) -> ViewDescriptor {
    match catalog.get_incident(id) {
        Some(incident) => ViewDescriptor::IncidentDetail {
            incident: incident.clone(),
        },
        None => not_found(EntityKind::Incident, id),
    }
}

fn not_found(kind: EntityKind, id: &str) -> ViewDescriptor {
    ViewDescriptor::NotFound {
        kind,
        id: id.to_string(),
    }
}

fn floor_overviews(catalog: &Catalog) -> Vec<FloorOverview> {
    catalog
        .floors
        .iter()
        .map(|floor| FloorOverview {
            stats: catalog.get_floor_stats(&floor.id),
            floor: floor.clone(),
        })
        .collect()
}

fn all_sensors(catalog: &Catalog) -> Vec<SensorRecord> {
    catalog
        .sensors
        .iter()
        .cloned()
        .map(SensorRecord::Sensor)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogLoader;
    use crate::shell::BootContext;

    fn setup() -> (ShellState, Catalog) {
        let catalog = CatalogLoader::builtin().unwrap();
        let state = ShellState::boot(BootContext {
            landing_passed: true,
            default_floor: "floor-a-2".into(),
            case_statuses: catalog.initial_case_statuses(),
            ..Default::default()
        });
        (state, catalog)
    }

    #[test]
    fn test_phases_render_before_anything_else() {
        let catalog = CatalogLoader::builtin().unwrap();
        let mut state = ShellState::default();
        assert_eq!(resolve(&state, &catalog), ViewDescriptor::Landing);
        state.enter();
        assert_eq!(resolve(&state, &catalog), ViewDescriptor::Loading);
    }

    #[test]
    fn test_sections_short_circuit_view_level() {
        let (mut state, catalog) = setup();
        state.navigate_to_floor("floor-a-2");
        state.handle_section_change(MainSection::Preferences);
        state.navigate_to_floor("floor-a-2");
        assert_eq!(
            resolve(&state, &catalog),
            ViewDescriptor::Settings {
                section: MainSection::Preferences
            }
        );
    }

    #[test]
    fn test_floor_view_follows_view_mode() {
        let (mut state, catalog) = setup();
        state.navigate_to_floor("floor-a-2");
        match resolve(&state, &catalog) {
            ViewDescriptor::RoomList { rooms, stats, .. } => {
                assert_eq!(rooms.len(), 19);
                assert_eq!(stats.total_rooms, 19);
            }
            other => panic!("unexpected view {other:?}"),
        }

        state.set_view_mode(ViewMode::Architectural);
        assert!(matches!(
            resolve(&state, &catalog),
            ViewDescriptor::FloorPlan { .. }
        ));
    }

    #[test]
    fn test_unresolved_ids_are_not_found() {
        let (mut state, catalog) = setup();
        state.navigate_to_floor("floor-z-9");
        assert_eq!(
            resolve(&state, &catalog),
            ViewDescriptor::NotFound {
                kind: EntityKind::Floor,
                id: "floor-z-9".into()
            }
        );

        state.navigate_to_sensor("NOPE-1");
        assert!(matches!(
            resolve(&state, &catalog),
            ViewDescriptor::NotFound {
                kind: EntityKind::Sensor,
                ..
            }
        ));

        state.navigate_back(ViewLevel::Summary);
        state.navigate_back(ViewLevel::Room);
        assert_eq!(
            resolve(&state, &catalog),
            ViewDescriptor::Empty {
                view: ViewLevel::Room
            }
        );
    }

    #[test]
    fn test_affected_sensor_resolves() {
        let (mut state, catalog) = setup();
        state.navigate_to_sensor("CHEM-12");
        assert!(matches!(
            resolve(&state, &catalog),
            ViewDescriptor::SensorDetail { .. }
        ));
    }

    #[test]
    fn test_drill_selection_uses_case_status() {
        let (mut state, catalog) = setup();
        state.handle_section_change(MainSection::TacticalCases);
        assert!(matches!(
            resolve(&state, &catalog),
            ViewDescriptor::CaseList { .. }
        ));

        state.select_drill(Some("3".into()));
        match resolve(&state, &catalog) {
            ViewDescriptor::DraftScenario { threats, .. } => assert_eq!(threats.len(), 2),
            other => panic!("unexpected view {other:?}"),
        }

        state.update_case_status("3", CaseStatus::Active);
        assert!(matches!(
            resolve(&state, &catalog),
            ViewDescriptor::ScenarioDetail {
                status: CaseStatus::Active,
                ..
            }
        ));
    }

    #[test]
    fn test_incidents_section_detail_overrides_list() {
        let (mut state, catalog) = setup();
        state.handle_section_change(MainSection::Incidents);
        assert!(matches!(
            resolve(&state, &catalog),
            ViewDescriptor::IncidentList { .. }
        ));
        state.navigate_to_incident("INC-001");
        match resolve(&state, &catalog) {
            ViewDescriptor::IncidentDetail { incident } => {
                assert_eq!(incident.affected_sensors.len(), 2)
            }
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn test_emergency_view_architectural() {
        let (mut state, catalog) = setup();
        state.set_emergency_mode(EmergencyMode::Emergency);
        assert!(matches!(
            resolve(&state, &catalog),
            ViewDescriptor::EmergencyDashboard { .. }
        ));
        state.set_view_mode(ViewMode::Architectural);
        assert!(matches!(
            resolve(&state, &catalog),
            ViewDescriptor::BuildingDiagram { .. }
        ));
    }

    #[test]
    fn test_descriptor_wire_tag() {
        let json = serde_json::to_value(ViewDescriptor::Empty {
            view: ViewLevel::Sensor,
        })
        .unwrap();
        assert_eq!(json["screen"], "empty");
        assert_eq!(json["view"], "sensor");
    }
}
