//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Offset of the log's civil timestamps, seconds east of UTC.
    pub utc_offset_secs: i32,

    /// Cadence of the latency series in seconds.
    pub sample_interval_secs: i64,

    /// p95 latency above this many microseconds violates the service
    /// objective.
    pub slo_threshold_us: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            utc_offset_secs: 0,
            sample_interval_secs: 20,
            slo_threshold_us: schedrec_core::DEFAULT_SLO_THRESHOLD_US,
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (SCHEDREC_*)
        figment = figment.merge(Env::prefixed("SCHEDREC_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for schedrec.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("schedrec"))
}
