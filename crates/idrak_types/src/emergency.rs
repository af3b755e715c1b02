//! Emergency mode and drill simulation state

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ─────────────────────────────────────────────────────────────────────────────
// Emergency Mode
// ─────────────────────────────────────────────────────────────────────────────

/// Tri-state emergency flag: off, incident or full emergency
///
/// Any state can be reached from any other. The persisted form is the string
/// `false`, `incident` or `emergency`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EmergencyMode {
    #[default]
    #[serde(rename = "false")]
    Off,
    #[serde(rename = "incident")]
    Incident,
    #[serde(rename = "emergency")]
    Emergency,
}

impl EmergencyMode {
    /// True for `incident` and `emergency`
    pub fn is_active(&self) -> bool {
        !matches!(self, EmergencyMode::Off)
    }

    /// Stringified form written to the persisted store
    pub fn as_persisted(&self) -> &'static str {
        match self {
            EmergencyMode::Off => "false",
            EmergencyMode::Incident => "incident",
            EmergencyMode::Emergency => "emergency",
        }
    }
}

impl std::fmt::Display for EmergencyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_persisted())
    }
}

/// Error returned when a persisted emergency mode cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown emergency mode: {0:?}")]
pub struct ParseEmergencyModeError(pub String);

impl FromStr for EmergencyMode {
    type Err = ParseEmergencyModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_matches('"') {
            "false" | "" => Ok(EmergencyMode::Off),
            "incident" => Ok(EmergencyMode::Incident),
            // Older builds stored a plain boolean
            "emergency" | "true" => Ok(EmergencyMode::Emergency),
            other => Err(ParseEmergencyModeError(other.to_string())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Simulation
// ─────────────────────────────────────────────────────────────────────────────

/// Simulation speed multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Speed {
    #[default]
    X1,
    X2,
    X4,
}

impl Speed {
    /// Seconds of scenario time per clock tick
    pub fn factor(&self) -> u32 {
        match self {
            Speed::X1 => 1,
            Speed::X2 => 2,
            Speed::X4 => 4,
        }
    }

    /// Next speed in the 1 → 2 → 4 → 1 cycle
    pub fn next(&self) -> Speed {
        match self {
            Speed::X1 => Speed::X2,
            Speed::X2 => Speed::X4,
            Speed::X4 => Speed::X1,
        }
    }
}

impl From<Speed> for u8 {
    fn from(speed: Speed) -> u8 {
        speed.factor() as u8
    }
}

impl TryFrom<u8> for Speed {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Speed::X1),
            2 => Ok(Speed::X2),
            4 => Ok(Speed::X4),
            other => Err(format!("invalid simulation speed {other}, expected 1, 2 or 4")),
        }
    }
}

/// Running state of a drill simulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SimulationState {
    pub drill_name: String,
    #[serde(default)]
    pub scenario_id: Option<String>,
    pub is_running: bool,
    pub is_paused: bool,
    /// Scenario seconds elapsed
    pub current_time: u32,
    #[ts(type = "1 | 2 | 4")]
    pub speed: Speed,
}

impl SimulationState {
    /// A freshly started simulation at time zero and normal speed
    pub fn started(drill_name: impl Into<String>, scenario_id: Option<String>) -> Self {
        Self {
            drill_name: drill_name.into(),
            scenario_id,
            is_running: true,
            is_paused: false,
            current_time: 0,
            speed: Speed::X1,
        }
    }

    /// Whether the clock should currently advance
    pub fn is_ticking(&self) -> bool {
        self.is_running && !self.is_paused
    }

    /// Advance one clock tick. Returns true if time moved.
    pub fn tick(&mut self) -> bool {
        if !self.is_ticking() {
            return false;
        }
        self.current_time = self.current_time.saturating_add(self.speed.factor());
        true
    }
}
