//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use wl_core::AnalysisOptions;
use wl_core::gaps::DEFAULT_MIN_GAP_SECS;

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// File extensions treated as log files, without the dot.
    pub log_extensions: Vec<String>,
    /// Minimum idle interval, in seconds, reported as a time gap.
    pub gap_threshold_secs: i64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("log_extensions", &self.log_extensions)
            .field("gap_threshold_secs", &self.gap_threshold_secs)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_extensions: vec!["log".to_string()],
            gap_threshold_secs: DEFAULT_MIN_GAP_SECS,
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

        // Load from environment variables (WL_*)
        figment = figment.merge(Env::prefixed("WL_"));

        figment.extract()
    }

    /// Options for file and folder analysis.
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            extensions: self.log_extensions.clone(),
            min_gap_secs: self.gap_threshold_secs,
        }
    }
}

/// Returns the platform-specific config directory for wl.
///
/// On Linux: `~/.config/worklog`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("worklog"))
}
