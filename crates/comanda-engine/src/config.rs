//! # Engine Configuration
//!
//! Configuration management for the tab engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     COMANDA_DATA_SOURCE=fixture                                        │
//! │     COMANDA_SERVICE_RATE_BPS=1200                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/comanda/comanda.toml (Linux)                             │
//! │     ~/Library/Application Support/br.comanda.comanda/comanda.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     20 tables, 10% service, 2 s timeout, live data source              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # comanda.toml
//! [floor]
//! table_count = 20
//!
//! [billing]
//! service_rate_bps = 1000  # 10%
//!
//! [transport]
//! timeout_ms = 2000
//! max_retries = 3
//! initial_backoff_ms = 100
//! max_backoff_ms = 2000
//!
//! [data_source]
//! mode = "live"  # live | fixture
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use comanda_core::validation::validate_service_rate_bps;
use comanda_core::ServiceRate;

use crate::error::{EngineError, EngineResult};

// =============================================================================
// Data Source Mode
// =============================================================================

/// Which backend the engine talks to. Fixed for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceMode {
    /// Caller-supplied collaborators.
    #[default]
    Live,

    /// In-memory backend with the demo menu.
    Fixture,
}

impl std::fmt::Display for DataSourceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSourceMode::Live => write!(f, "live"),
            DataSourceMode::Fixture => write!(f, "fixture"),
        }
    }
}

impl std::str::FromStr for DataSourceMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "live" | "remote" => Ok(DataSourceMode::Live),
            "fixture" | "mock" | "demo" => Ok(DataSourceMode::Fixture),
            other => Err(EngineError::InvalidConfig(format!(
                "Unknown data source: '{}'. Valid options: live, fixture",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// Dining room layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorConfig {
    /// Tables 1..=table_count are registered as FREE at startup.
    #[serde(default = "default_table_count")]
    pub table_count: u32,
}

fn default_table_count() -> u32 {
    20
}

impl Default for FloorConfig {
    fn default() -> Self {
        FloorConfig {
            table_count: default_table_count(),
        }
    }
}

/// Billing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingConfig {
    /// Service charge in basis points (1000 = 10%).
    #[serde(default = "default_service_rate_bps")]
    pub service_rate_bps: u32,
}

fn default_service_rate_bps() -> u32 {
    comanda_core::DEFAULT_SERVICE_RATE_BPS
}

impl Default for BillingConfig {
    fn default() -> Self {
        BillingConfig {
            service_rate_bps: default_service_rate_bps(),
        }
    }
}

/// Collaborator call settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Upper bound for any single collaborator call (milliseconds).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Extra attempts for idempotent calls. 0 disables retrying.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First retry delay (milliseconds).
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Ceiling for the retry delay (milliseconds).
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_timeout_ms() -> u64 {
    2000
}
fn default_max_retries() -> u32 {
    3
}
fn default_initial_backoff_ms() -> u64 {
    100
}
fn default_max_backoff_ms() -> u64 {
    2000
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl TransportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

/// Backend selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSourceConfig {
    #[serde(default)]
    pub mode: DataSourceMode,
}

// =============================================================================
// Main Engine Configuration
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub floor: FloorConfig,

    #[serde(default)]
    pub billing: BillingConfig,

    #[serde(default)]
    pub transport: TransportConfig,

    #[serde(default)]
    pub data_source: DataSourceConfig,
}

impl EngineConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (comanda.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> EngineResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading engine config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load engine config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a TOML document. Missing sections and keys take defaults.
    pub fn from_toml(contents: &str) -> EngineResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> EngineResult<()> {
        if self.floor.table_count == 0 {
            return Err(EngineError::InvalidConfig(
                "floor.table_count must be greater than 0".into(),
            ));
        }

        validate_service_rate_bps(self.billing.service_rate_bps)
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))?;

        if self.transport.timeout_ms == 0 {
            return Err(EngineError::InvalidConfig(
                "transport.timeout_ms must be greater than 0".into(),
            ));
        }

        if self.transport.initial_backoff_ms > self.transport.max_backoff_ms {
            return Err(EngineError::InvalidConfig(format!(
                "transport.initial_backoff_ms ({}) exceeds max_backoff_ms ({})",
                self.transport.initial_backoff_ms, self.transport.max_backoff_ms
            )));
        }

        Ok(())
    }

    /// Applies `COMANDA_*` overrides read through `lookup`.
    ///
    /// Unparseable values are logged and ignored.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(count) = lookup("COMANDA_TABLE_COUNT") {
            match count.parse() {
                Ok(n) => self.floor.table_count = n,
                Err(_) => warn!(value = %count, "Ignoring invalid COMANDA_TABLE_COUNT"),
            }
        }

        if let Some(bps) = lookup("COMANDA_SERVICE_RATE_BPS") {
            match bps.parse() {
                Ok(n) => {
                    debug!(bps = n, "Overriding service rate from environment");
                    self.billing.service_rate_bps = n;
                }
                Err(_) => warn!(value = %bps, "Ignoring invalid COMANDA_SERVICE_RATE_BPS"),
            }
        }

        if let Some(ms) = lookup("COMANDA_TIMEOUT_MS") {
            match ms.parse() {
                Ok(n) => self.transport.timeout_ms = n,
                Err(_) => warn!(value = %ms, "Ignoring invalid COMANDA_TIMEOUT_MS"),
            }
        }

        if let Some(retries) = lookup("COMANDA_MAX_RETRIES") {
            match retries.parse() {
                Ok(n) => self.transport.max_retries = n,
                Err(_) => warn!(value = %retries, "Ignoring invalid COMANDA_MAX_RETRIES"),
            }
        }

        if let Some(mode) = lookup("COMANDA_DATA_SOURCE") {
            match mode.parse() {
                Ok(parsed) => {
                    debug!(mode = %mode, "Overriding data source from environment");
                    self.data_source.mode = parsed;
                }
                Err(_) => warn!(mode = %mode, "Unknown data source in environment"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("br", "comanda", "comanda")
            .map(|dirs| dirs.config_dir().join("comanda.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn service_rate(&self) -> ServiceRate {
        ServiceRate::from_bps(self.billing.service_rate_bps)
    }

    pub fn mode(&self) -> DataSourceMode {
        self.data_source.mode
    }
}
