/// Service configuration loader - parses ingest.toml
///
/// Separates the source list, store connection and rain gauge calibration
/// from code, so a sensor can be added or a gauge recalibrated without
/// recompiling the service. Store credentials can be overridden from the
/// environment (or a `.env` file) so they stay out of the TOML file.

use serde::Deserialize;
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::ingest::RainGauge;
use crate::model::SourceDescriptor;

pub const DEFAULT_CONFIG_PATH: &str = "ingest.toml";

/// Root configuration structure for TOML parsing
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Minutes between ingestion cycles (the logger rotates every 20 minutes).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_minutes: u64,

    /// Sources ingested concurrently within one cycle.
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,

    pub store: StoreSettings,

    #[serde(default)]
    pub rain: RainGauge,

    #[serde(rename = "source")]
    pub sources: Vec<SourceDescriptor>,
}

/// Which time-series store the writer delivers points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Influx,
    Postgres,
    Stdout,
}

/// Store connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,
    /// InfluxDB base URL (e.g. `http://localhost:8086`).
    #[serde(default = "default_url")]
    pub url: String,
    /// Target database identifier.
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_poll_interval() -> u64 {
    20
}

fn default_worker_threads() -> usize {
    3
}

fn default_backend() -> StoreBackend {
    StoreBackend::Influx
}

fn default_url() -> String {
    "http://localhost:8086".to_string()
}

fn default_timeout() -> u64 {
    10
}

impl IngestConfig {
    /// Parses and validates configuration from TOML text.
    pub fn from_toml_str(contents: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: IngestConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Looks up a configured source by name.
    pub fn source(&self, name: &str) -> Option<&SourceDescriptor> {
        self.sources.iter().find(|s| s.name == name)
    }

    /// Applies `INFLUX_URL`, `INFLUX_DATABASE`, `INFLUX_USERNAME` and
    /// `INFLUX_PASSWORD` on top of the file settings.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("INFLUX_URL") {
            self.store.url = url;
        }
        if let Some(database) = lookup("INFLUX_DATABASE") {
            self.store.database = database;
        }
        if let Some(username) = lookup("INFLUX_USERNAME") {
            self.store.username = Some(username);
        }
        if let Some(password) = lookup("INFLUX_PASSWORD") {
            self.store.password = Some(password);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::Invalid("no [[source]] entries configured".into()));
        }

        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(ConfigError::Invalid("source name must not be empty".into()));
            }
            if !seen.insert(source.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate source name '{}'",
                    source.name
                )));
            }
        }

        if self.poll_interval_minutes == 0 {
            return Err(ConfigError::Invalid("poll_interval_minutes must be positive".into()));
        }
        if self.worker_threads == 0 {
            return Err(ConfigError::Invalid("worker_threads must be positive".into()));
        }
        if self.store.database.trim().is_empty() {
            return Err(ConfigError::Invalid("store.database must not be empty".into()));
        }
        if !(self.rain.volume_per_tip.is_finite() && self.rain.volume_per_tip > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "rain.volume_per_tip must be a positive number, got {}",
                self.rain.volume_per_tip
            )));
        }

        Ok(())
    }
}

/// Loads configuration from a TOML file, then applies environment overrides
/// (after loading `.env` if present).
pub fn load_config(path: impl AsRef<Path>) -> Result<IngestConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut config = IngestConfig::from_toml_str(&contents, path)?;

    dotenv::dotenv().ok();
    config.apply_env_overrides();
    config.validate()?;

    Ok(config)
}
