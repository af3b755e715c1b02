//! Facility records: buildings, floors, rooms, sensors and incidents.
//!
//! These are seed data. Nothing in the dashboard creates or destroys them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Operational status shared by rooms, floors and buildings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum OperationalStatus {
    Operational,
    Warning,
    Critical,
}

/// A building of the facility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Building {
    pub id: String,
    pub name: String,
    pub floors: u32,
    pub sensors: u32,
    pub incidents: u32,
    pub status: OperationalStatus,
}

/// A floor of a building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Floor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub building_id: Option<String>,
    pub rooms: u32,
    pub sensors: u32,
    pub incidents: u32,
}

/// A room on a floor plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Room {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub room_type: String,
    pub status: OperationalStatus,
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity, percent
    pub humidity: f64,
    pub occupancy: u32,
    pub floor_id: String,
    #[serde(default)]
    pub sensors: Option<u32>,
}

impl Room {
    /// Sensor count, absent counts as zero
    pub fn sensor_count(&self) -> u32 {
        self.sensors.unwrap_or(0)
    }
}

/// A standalone sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Sensor {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub sensor_type: String,
    pub floor_id: String,
    pub room_id: String,
    pub status: OperationalStatus,
    pub reading: String,
}

/// Incident severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Incident lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    Active,
    Resolving,
    Resolved,
}

/// A sensor reading that contributed to an incident
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AffectedSensor {
    pub id: String,
    pub name: String,
    pub location: String,
    pub floor_id: String,
    pub room_id: String,
    pub reading: String,
    pub normal_range: String,
    pub deviation: String,
    #[serde(rename = "type")]
    pub sensor_type: String,
}

/// A facility incident
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Incident {
    pub id: String,
    pub title: String,
    pub severity: Severity,
    /// Free-text location shown in lists
    pub location: String,
    #[serde(default)]
    pub building_id: Option<String>,
    #[serde(default)]
    pub floor_id: Option<String>,
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub sensor_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub status: IncidentStatus,
    #[serde(default)]
    pub ai_prediction: Option<String>,
    #[serde(default)]
    pub suggested_action: Option<String>,
    #[serde(default)]
    pub auto_action_applied: bool,
    #[serde(default)]
    pub matched_rule: Option<String>,
    #[serde(default)]
    pub rule_action: Option<String>,
    #[serde(default)]
    pub affected_sensors: Vec<AffectedSensor>,
}

impl Incident {
    /// Whether the incident still needs attention
    pub fn is_open(&self) -> bool {
        self.status != IncidentStatus::Resolved
    }
}
