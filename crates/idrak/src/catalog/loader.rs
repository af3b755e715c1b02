//! Catalog Loader
//!
//! Loads the facility catalog from disk, or from the seed embedded in the
//! binary.

use std::path::Path;

use tokio::fs;
use tracing::info;

use super::facility::Catalog;

/// Seed catalog compiled into the binary
const BUILTIN_SEED: &str = include_str!("../../seed/facility.toml");

/// Error type for catalog loading
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Facility data not found: {0}")]
    PathNotFound(std::path::PathBuf),

    #[error("Failed to read file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParseError(#[from] toml::de::Error),
}

/// Catalog loader
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load a catalog from a facility TOML file
    pub async fn load(path: impl AsRef<Path>) -> Result<Catalog, CatalogError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(CatalogError::PathNotFound(path.to_path_buf()));
        }

        info!("Loading facility data from: {}", path.display());

        let content = fs::read_to_string(path).await?;
        let catalog = Self::parse(&content)?;
        Self::log_summary(&catalog);

        Ok(catalog)
    }

    /// Parse the embedded seed catalog
    pub fn builtin() -> Result<Catalog, CatalogError> {
        let catalog = Self::parse(BUILTIN_SEED)?;
        Self::log_summary(&catalog);
        Ok(catalog)
    }

    /// Parse a catalog from TOML text
    pub fn parse(content: &str) -> Result<Catalog, CatalogError> {
        Ok(toml::from_str(content)?)
    }

    fn log_summary(catalog: &Catalog) {
        info!(
            "Loaded {} floors, {} rooms ({} legacy), {} sensors, {} incidents, {} cases",
            catalog.floors.len(),
            catalog.rooms.len(),
            catalog.legacy_rooms.len(),
            catalog.sensors.len(),
            catalog.incidents.len(),
            catalog.cases.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idrak_types::{CaseStatus, OperationalStatus};

    #[test]
    fn test_builtin_seed_parses() {
        let catalog = CatalogLoader::builtin().unwrap();
        assert_eq!(catalog.floors.len(), 3);
        assert_eq!(catalog.get_rooms_by_floor("floor-a-2").len(), 19);
        assert_eq!(catalog.get_rooms_by_floor("floor-a-1").len(), 18);
        assert!(catalog.get_incident("INC-001").is_some());
    }

    #[test]
    fn test_builtin_lookups() {
        let catalog = CatalogLoader::builtin().unwrap();

        let lab = catalog.get_room_by_id("F2-R6").unwrap();
        assert_eq!(lab.name, "Sector B - Lab");
        assert_eq!(lab.floor_id, "floor-a-2");

        let legacy = catalog.find_room("room-a-301").unwrap();
        assert_eq!(legacy.floor_id, "floor-a-3");

        let stats = catalog.get_floor_stats("floor-a-2");
        assert_eq!(stats.total_rooms, 19);
        assert_eq!(stats.critical_count, 1);
        assert_eq!(stats.warning_count, 1);
        assert_eq!(stats.total_sensors, 141);
        assert_eq!(stats.status, OperationalStatus::Critical);

        let threats = catalog.get_scenario_threats("3");
        assert_eq!(threats.len(), 2);
        assert_eq!(threats[1].time_value, 15);
    }

    #[test]
    fn test_builtin_case_statuses() {
        let catalog = CatalogLoader::builtin().unwrap();
        let statuses = catalog.initial_case_statuses();
        assert_eq!(statuses.get("1"), Some(&CaseStatus::Completed));
        assert_eq!(statuses.get("2"), Some(&CaseStatus::Completed));
        assert_eq!(statuses.get("3"), Some(&CaseStatus::Draft));
    }

    #[test]
    fn test_sensor_resolution_order() {
        let catalog = CatalogLoader::builtin().unwrap();
        assert!(matches!(
            catalog.find_sensor("CHEM-12"),
            Some(super::super::SensorRecord::Sensor(_))
        ));
        assert!(catalog.find_sensor("missing-sensor").is_none());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facility.toml");
        std::fs::write(
            &path,
            r#"
[[floors]]
id = "floor-b-1"
name = "Annex"
rooms = 1
sensors = 2
incidents = 0

[[rooms]]
id = "B1-R1"
name = "Annex Office"
type = "Office"
status = "warning"
temperature = 23.0
humidity = 41.0
occupancy = 3
floor_id = "floor-b-1"
"#,
        )
        .unwrap();

        let catalog = CatalogLoader::load(&path).await.unwrap();
        assert_eq!(catalog.floors.len(), 1);
        assert_eq!(catalog.get_floor_stats("floor-b-1").status, OperationalStatus::Warning);
        assert!(catalog.incidents.is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = CatalogLoader::load("/definitely/not/here/facility.toml").await;
        assert!(matches!(result, Err(CatalogError::PathNotFound(_))));
    }

    #[test]
    fn test_parse_error() {
        let result = CatalogLoader::parse("[[floors]]\nid = ");
        assert!(matches!(result, Err(CatalogError::TomlParseError(_))));
    }
}
