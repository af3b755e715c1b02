//! Server Configuration
//!
//! Layered as built-in defaults, then the TOML file, then `IDRAK_`
//! environment variables (`IDRAK_SERVER__PORT=9700`), then command line
//! overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::session::SessionConfig;

/// Config file read when none is given explicitly
pub const DEFAULT_CONFIG_FILE: &str = "idrak.toml";

/// Errors that can occur while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] figment::Error),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdrakConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub facility: FacilityConfig,
    pub shell: ShellConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding the persisted store
    pub path: PathBuf,
    /// Reconcile writes made to the store file by other processes
    pub watch: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("idrak-store.json"),
            watch: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilityConfig {
    /// Replacement seed catalog; the embedded one is used when unset
    pub data: Option<PathBuf>,
    /// Floor selected when a session boots into an emergency
    pub default_floor: String,
}

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            data: None,
            default_floor: "floor-a-2".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub tick_interval_ms: u64,
    pub loading_delay_ms: u64,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            loading_delay_ms: 2500,
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub storage: Option<PathBuf>,
    pub facility: Option<PathBuf>,
}

impl IdrakConfig {
    /// Load configuration
    ///
    /// An explicit `path` must exist; without one `idrak.toml` is read from
    /// the working directory if present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) if !p.exists() => return Err(ConfigError::NotFound(p.to_path_buf())),
            Some(p) => p.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };
        Ok(Self::figment(&file).extract()?)
    }

    fn figment(file: &Path) -> Figment {
        Figment::from(Serialized::defaults(IdrakConfig::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed("IDRAK_").split("__"))
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(path) = overrides.storage {
            self.storage.path = path;
        }
        if overrides.facility.is_some() {
            self.facility.data = overrides.facility;
        }
        self
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            tick_interval: Duration::from_millis(self.shell.tick_interval_ms.max(1)),
            loading_delay: Duration::from_millis(self.shell.loading_delay_ms),
            default_floor: self.facility.default_floor.clone(),
        }
    }
}
