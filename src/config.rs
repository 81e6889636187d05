//! Engine configuration.
//!
//! The engine only reads a handful of settings; the rest of an application's
//! configuration lives elsewhere. Settings are stored as YAML:
//!
//! ```yaml
//! snippet_file: /home/me/snippets/snippets.yaml
//! max_results: 10
//! fuzzy_threshold: 60
//! reload_debounce_ms: 500
//! auto_reload: true
//! ```
//!
//! Missing keys take their defaults, so a partial file is fine.

use crate::domain::write_atomic;
use crate::search::SearchOptions;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MAX_RESULTS: usize = 10;
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 60.0;
pub const DEFAULT_RELOAD_DEBOUNCE_MS: u64 = 500;

pub const MAX_RESULTS_RANGE: RangeInclusive<usize> = 5..=20;
pub const FUZZY_THRESHOLD_RANGE: RangeInclusive<f64> = 40.0..=80.0;
pub const RELOAD_DEBOUNCE_RANGE: RangeInclusive<u64> = 50..=5000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Backing YAML file of the snippet store.
    pub snippet_file: PathBuf,

    /// Maximum number of search hits.
    pub max_results: usize,

    /// Minimum search score, 0 to 100.
    pub fuzzy_threshold: f64,

    /// Quiet period before a burst of file changes triggers one reload.
    pub reload_debounce_ms: u64,

    /// Whether the store watches its backing file.
    pub auto_reload: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            snippet_file: home.join("snippets").join("snippets.yaml"),
            max_results: DEFAULT_MAX_RESULTS,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            reload_debounce_ms: DEFAULT_RELOAD_DEBOUNCE_MS,
            auto_reload: true,
        }
    }
}

impl EngineConfig {
    /// `<config dir>/snip-core/config.yaml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("snip-core").join("config.yaml"))
    }

    /// Loads the configuration at `path`.
    ///
    /// Never fails: a missing file is created with defaults, a malformed one
    /// is logged and replaced by defaults in memory (the file is left alone
    /// so the user can fix it).
    pub fn load(path: &Path) -> EngineConfig {
        if !path.exists() {
            let config = EngineConfig::default();
            match config.save(path) {
                Ok(()) => info!("config: created default config at {}", path.display()),
                Err(e) => error!("config: failed to create default config: {e}"),
            }
            return config;
        }

        match Self::read(path) {
            Ok(config) => {
                info!("config: loaded {}", path.display());
                config
            }
            Err(e) => {
                error!("config: {e}, using defaults");
                EngineConfig::default()
            }
        }
    }

    /// Reads and parses `path` without any fallback.
    pub fn read(path: &Path) -> Result<EngineConfig, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if text.trim().is_empty() {
            warn!("config: {} is empty", path.display());
            return Ok(EngineConfig::default());
        }
        Ok(serde_yaml::from_str(&text)?)
    }

    /// Writes the configuration atomically, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = serde_yaml::to_string(self)?;
        write_atomic(path, text.as_bytes()).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Checks every setting and reports all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.snippet_file.as_os_str().is_empty() {
            errors.push("snippet_file cannot be empty".to_string());
        }
        if !MAX_RESULTS_RANGE.contains(&self.max_results) {
            errors.push(format!(
                "max_results value {} out of range [{}, {}]",
                self.max_results,
                MAX_RESULTS_RANGE.start(),
                MAX_RESULTS_RANGE.end()
            ));
        }
        if !FUZZY_THRESHOLD_RANGE.contains(&self.fuzzy_threshold) {
            errors.push(format!(
                "fuzzy_threshold value {} out of range [{}, {}]",
                self.fuzzy_threshold,
                FUZZY_THRESHOLD_RANGE.start(),
                FUZZY_THRESHOLD_RANGE.end()
            ));
        }
        if !RELOAD_DEBOUNCE_RANGE.contains(&self.reload_debounce_ms) {
            errors.push(format!(
                "reload_debounce_ms value {} out of range [{}, {}]",
                self.reload_debounce_ms,
                RELOAD_DEBOUNCE_RANGE.start(),
                RELOAD_DEBOUNCE_RANGE.end()
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            threshold: self.fuzzy_threshold,
            max_results: self.max_results,
        }
    }

    pub fn reload_debounce(&self) -> Duration {
        Duration::from_millis(self.reload_debounce_ms)
    }
}
