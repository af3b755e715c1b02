//! Navigation tags
//!
//! `MainSection` is the top-level tab, `ViewLevel` the drill-down depth inside
//! the dashboard section.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Top-level navigation tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "kebab-case")]
pub enum MainSection {
    #[default]
    Dashboard,
    Incidents,
    CbrneAttacks,
    Automation,
    TacticalCases,
    LayoutTests,
    Thresholds,
    Alarms,
    Escalation,
    Users,
    Notifications,
    Preferences,
    FacilityFloors,
    FacilityRooms,
    FacilitySensors,
    FacilityEquipment,
}

impl MainSection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MainSection::Dashboard => "dashboard",
            MainSection::Incidents => "incidents",
            MainSection::CbrneAttacks => "cbrne-attacks",
            MainSection::Automation => "automation",
            MainSection::TacticalCases => "tactical-cases",
            MainSection::LayoutTests => "layout-tests",
            MainSection::Thresholds => "thresholds",
            MainSection::Alarms => "alarms",
            MainSection::Escalation => "escalation",
            MainSection::Users => "users",
            MainSection::Notifications => "notifications",
            MainSection::Preferences => "preferences",
            MainSection::FacilityFloors => "facility-floors",
            MainSection::FacilityRooms => "facility-rooms",
            MainSection::FacilitySensors => "facility-sensors",
            MainSection::FacilityEquipment => "facility-equipment",
        }
    }
}

impl std::fmt::Display for MainSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drill-down level of the dashboard section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum ViewLevel {
    #[default]
    Summary,
    Emergency,
    Floors,
    Incidents,
    Sensors,
    Map,
    Floor,
    Room,
    Incident,
    Sensor,
}

impl ViewLevel {
    /// Position in the drill-down hierarchy.
    ///
    /// Dashboard lists sit at depth 0, then floor (1), room (2), incident (3)
    /// and sensor (4). The emergency dashboard is outside the hierarchy.
    pub fn depth(&self) -> Option<u8> {
        match self {
            ViewLevel::Summary
            | ViewLevel::Floors
            | ViewLevel::Incidents
            | ViewLevel::Sensors
            | ViewLevel::Map => Some(0),
            ViewLevel::Floor => Some(1),
            ViewLevel::Room => Some(2),
            ViewLevel::Incident => Some(3),
            ViewLevel::Sensor => Some(4),
            ViewLevel::Emergency => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewLevel::Summary => "summary",
            ViewLevel::Emergency => "emergency",
            ViewLevel::Floors => "floors",
            ViewLevel::Incidents => "incidents",
            ViewLevel::Sensors => "sensors",
            ViewLevel::Map => "map",
            ViewLevel::Floor => "floor",
            ViewLevel::Room => "room",
            ViewLevel::Incident => "incident",
            ViewLevel::Sensor => "sensor",
        }
    }
}

impl std::fmt::Display for ViewLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation style of dashboard screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Dashboard,
    Architectural,
}

/// UI language tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    pub fn is_rtl(&self) -> bool {
        matches!(self, Language::Ar)
    }
}

/// Startup phase of a shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Landing page, waiting for the user to enter
    #[default]
    Landing,
    /// Entered, loading screen shown for a fixed delay
    Loading,
    /// Main application
    Ready,
}
