//! Launcher configuration.
//!
//! Loaded from `rollcall.json` in the data directory. Every field has a serde
//! default, so a partial file only overrides what it names and a missing file
//! yields the compiled-in defaults.

use crate::error::config::ConfigError;

use common::ErrorLocation;
use models::PortRange;

use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "rollcall.json";
const CONFIG_VERSION: u32 = 1;

pub const ENV_PORT_START: &str = "ROLLCALL_PORT_START";
pub const ENV_PORT_END: &str = "ROLLCALL_PORT_END";
pub const ENV_OPEN_BROWSER: &str = "ROLLCALL_OPEN_BROWSER";

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortConfig {
    #[serde(default)]
    pub range: PortRange,
    #[serde(default = "default_scan_probe_timeout_ms")]
    pub scan_probe_timeout_ms: u64,
    #[serde(default = "default_marker_timeout_ms")]
    pub marker_timeout_ms: u64,
    #[serde(default = "default_handshake_timeout_ms")]
    pub handshake_timeout_ms: u64,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            range: PortRange::default(),
            scan_probe_timeout_ms: default_scan_probe_timeout_ms(),
            marker_timeout_ms: default_marker_timeout_ms(),
            handshake_timeout_ms: default_handshake_timeout_ms(),
        }
    }
}

impl PortConfig {
    /// Bulk scan connect timeout.
    pub fn scan_probe_timeout(&self) -> Duration {
        Duration::from_millis(self.scan_probe_timeout_ms)
    }

    /// Timeout for the authoritative check of the port named by the marker.
    pub fn marker_timeout(&self) -> Duration {
        Duration::from_millis(self.marker_timeout_ms)
    }

    /// Timeout for handshakes against occupied ports found while scanning.
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_marker_file")]
    pub marker_file: String,
    #[serde(default = "default_roster_file")]
    pub roster_file: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            marker_file: default_marker_file(),
            roster_file: default_roster_file(),
            static_dir: default_static_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_open_on_start")]
    pub open_on_start: bool,
    #[serde(default = "default_browser_delay_ms")]
    pub delay_ms: u64,
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            open_on_start: default_open_on_start(),
            delay_ms: default_browser_delay_ms(),
            ready_timeout_ms: default_ready_timeout_ms(),
        }
    }
}

impl BrowserConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub ports: PortConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub browser: BrowserConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            ports: PortConfig::default(),
            storage: StorageConfig::default(),
            browser: BrowserConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_scan_probe_timeout_ms() -> u64 {
    150
}
fn default_marker_timeout_ms() -> u64 {
    800
}
fn default_handshake_timeout_ms() -> u64 {
    500
}
fn default_marker_file() -> String {
    "rollcall.port".to_string()
}
fn default_roster_file() -> String {
    "students.json".to_string()
}
fn default_static_dir() -> String {
    "static".to_string()
}
fn default_open_on_start() -> bool {
    true
}
fn default_browser_delay_ms() -> u64 {
    2500
}
fn default_ready_timeout_ms() -> u64 {
    10_000
}

// ============================================
// IMPLEMENTATION
// ============================================

impl AppConfig {
    /// Load config from {data_dir}/rollcall.json.
    ///
    /// A missing file yields defaults. A file that exists but cannot be read,
    /// parsed or validated is an error; the caller decides whether to fall back.
    pub fn load(data_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = data_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: AppConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {data_dir}/rollcall.json using temp file + rename.
    pub fn save(&self, data_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(data_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: data_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = data_dir.join(CONFIG_FILE_NAME);
        let temp_path = data_dir.join(format!("{}.tmp", CONFIG_FILE_NAME));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid version: {} (expected 1-{})",
                    self.version, CONFIG_VERSION
                ),
            });
        }

        self.ports
            .range
            .validate()
            .map_err(|e| ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: e.to_string(),
            })?;

        let timeouts = [
            ("scan_probe_timeout_ms", self.ports.scan_probe_timeout_ms),
            ("marker_timeout_ms", self.ports.marker_timeout_ms),
            ("handshake_timeout_ms", self.ports.handshake_timeout_ms),
        ];
        for (name, value) in timeouts {
            if value == 0 {
                return Err(ConfigError::ValidationError {
                    location: ErrorLocation::from(Location::caller()),
                    reason: format!("{name} must be greater than 0"),
                });
            }
        }

        let files = [
            ("marker_file", &self.storage.marker_file),
            ("roster_file", &self.storage.roster_file),
            ("static_dir", &self.storage.static_dir),
        ];
        for (name, value) in files {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    location: ErrorLocation::from(Location::caller()),
                    reason: format!("{name} cannot be empty"),
                });
            }
        }

        Ok(())
    }

    /// Apply `ROLLCALL_*` overrides through `lookup` and re-validate.
    ///
    /// `lookup` is normally `|key| std::env::var(key).ok()`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut start = self.ports.range.start();
        let mut end = self.ports.range.end();

        if let Some(value) = lookup(ENV_PORT_START) {
            start = parse_env_port(ENV_PORT_START, &value)?;
            debug!("{ENV_PORT_START} override: {start}");
        }

        if let Some(value) = lookup(ENV_PORT_END) {
            end = parse_env_port(ENV_PORT_END, &value)?;
            debug!("{ENV_PORT_END} override: {end}");
        }

        self.ports.range = PortRange::new(start, end).map_err(|e| ConfigError::ValidationError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        if let Some(value) = lookup(ENV_OPEN_BROWSER) {
            self.browser.open_on_start = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::EnvironmentError {
                        location: ErrorLocation::from(Location::caller()),
                        variable: ENV_OPEN_BROWSER.to_string(),
                        value,
                        reason: "expected true or false".to_string(),
                    });
                }
            };
        }

        self.validate()
    }

    pub fn marker_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.storage.marker_file)
    }

    pub fn roster_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.storage.roster_file)
    }

    pub fn static_dir(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.storage.static_dir)
    }
}

#[track_caller]
fn parse_env_port(variable: &str, value: &str) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|e| ConfigError::EnvironmentError {
            location: ErrorLocation::from(Location::caller()),
            variable: variable.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}
