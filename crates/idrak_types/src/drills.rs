//! Tactical cases (drills) and their scenario setups

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Lifecycle tag of a tactical case, independent of whether a simulation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Draft,
    Active,
    Completed,
    Archived,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Draft => "draft",
            CaseStatus::Active => "active",
            CaseStatus::Completed => "completed",
            CaseStatus::Archived => "archived",
        }
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tactical case listed on the drills screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TacticalCase {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Status the case starts with when a shell boots
    pub status: CaseStatus,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub results: Option<String>,
}

/// One threat injected into a scenario at a point of its timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Threat {
    pub id: String,
    #[serde(rename = "type")]
    pub threat_type: String,
    pub severity: String,
    pub location: String,
    /// Display label, e.g. "15m"
    pub time: String,
    /// Minutes from scenario start
    pub time_value: u32,
    pub description: String,
}

/// Setup of a drillable scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ScenarioSetup {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub threats: Vec<Threat>,
}
