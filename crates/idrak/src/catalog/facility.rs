//! Catalog Types
//!
//! Defines the shape of the facility seed file and its lookups.

use std::collections::BTreeMap;

use idrak_types::{
    AffectedSensor, Building, CaseStatus, Floor, Incident, OperationalStatus, Room,
    ScenarioSetup, Sensor, TacticalCase, Threat,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Loaded facility catalog (facility.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub buildings: Vec<Building>,
    #[serde(default)]
    pub floors: Vec<Floor>,
    /// Floor-plan rooms, the primary room table
    #[serde(default)]
    pub rooms: Vec<Room>,
    /// Older room table still referenced by some records
    #[serde(default)]
    pub legacy_rooms: Vec<Room>,
    #[serde(default)]
    pub sensors: Vec<Sensor>,
    #[serde(default)]
    pub incidents: Vec<Incident>,
    #[serde(default)]
    pub cases: Vec<TacticalCase>,
    #[serde(default)]
    pub scenarios: BTreeMap<String, ScenarioSetup>,
}

/// Aggregated statistics of a floor's floor-plan rooms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FloorStats {
    pub total_rooms: u32,
    pub critical_count: u32,
    pub warning_count: u32,
    /// Rounded to one decimal, 0.0 when the floor has no rooms
    pub avg_temperature: f64,
    pub total_occupancy: u32,
    pub total_sensors: u32,
    pub status: OperationalStatus,
}

/// A sensor resolved either from the sensor table or from an incident
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SensorRecord {
    Sensor(Sensor),
    Affected(AffectedSensor),
}

impl Catalog {
    /// Get a floor by ID
    pub fn get_floor(&self, id: &str) -> Option<&Floor> {
        self.floors.iter().find(|f| f.id == id)
    }

    /// Get a floor-plan room by ID
    pub fn get_room_by_id(&self, id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    /// Get a room by ID, trying the floor-plan table first and the legacy
    /// table second
    pub fn find_room(&self, id: &str) -> Option<&Room> {
        self.get_room_by_id(id)
            .or_else(|| self.legacy_rooms.iter().find(|r| r.id == id))
    }

    /// Floor-plan rooms of a floor
    pub fn get_rooms_by_floor(&self, floor_id: &str) -> Vec<&Room> {
        self.rooms.iter().filter(|r| r.floor_id == floor_id).collect()
    }

    /// Statistics over the floor-plan rooms of a floor
    pub fn get_floor_stats(&self, floor_id: &str) -> FloorStats {
        let rooms = self.get_rooms_by_floor(floor_id);

        let critical_count = rooms
            .iter()
            .filter(|r| r.status == OperationalStatus::Critical)
            .count() as u32;
        let warning_count = rooms
            .iter()
            .filter(|r| r.status == OperationalStatus::Warning)
            .count() as u32;

        let avg_temperature = if rooms.is_empty() {
            0.0
        } else {
            let sum: f64 = rooms.iter().map(|r| r.temperature).sum();
            (sum / rooms.len() as f64 * 10.0).round() / 10.0
        };

        let status = if critical_count > 0 {
            OperationalStatus::Critical
        } else if warning_count > 0 {
            OperationalStatus::Warning
        } else {
            OperationalStatus::Operational
        };

        FloorStats {
            total_rooms: rooms.len() as u32,
            critical_count,
            warning_count,
            avg_temperature,
            total_occupancy: rooms.iter().map(|r| r.occupancy).sum(),
            total_sensors: rooms.iter().map(|r| r.sensor_count()).sum(),
            status,
        }
    }

    /// Get an incident by ID
    pub fn get_incident(&self, id: &str) -> Option<&Incident> {
        self.incidents.iter().find(|i| i.id == id)
    }

    /// Incidents located on a floor
    pub fn incidents_on_floor(&self, floor_id: &str) -> Vec<&Incident> {
        self.incidents
            .iter()
            .filter(|i| i.floor_id.as_deref() == Some(floor_id))
            .collect()
    }

    /// Resolve a sensor id from the sensor table, then from incident readings
    pub fn find_sensor(&self, id: &str) -> Option<SensorRecord> {
        if let Some(sensor) = self.sensors.iter().find(|s| s.id == id) {
            return Some(SensorRecord::Sensor(sensor.clone()));
        }

        self.incidents
            .iter()
            .flat_map(|i| i.affected_sensors.iter())
            .find(|s| s.id == id)
            .cloned()
            .map(SensorRecord::Affected)
    }

    /// Get a tactical case by ID
    pub fn get_case(&self, id: &str) -> Option<&TacticalCase> {
        self.cases.iter().find(|c| c.id == id)
    }

    /// Case statuses a fresh shell starts with
    pub fn initial_case_statuses(&self) -> BTreeMap<String, CaseStatus> {
        self.cases.iter().map(|c| (c.id.clone(), c.status)).collect()
    }

    /// Threat timeline of a scenario, empty for unknown scenarios
    pub fn get_scenario_threats(&self, scenario_id: &str) -> Vec<Threat> {
        self.scenarios
            .get(scenario_id)
            .map(|s| s.threats.clone())
            .unwrap_or_default()
    }
}
