//! Configuration for the board and its placement endpoint, loaded with figment.
//!
//! Sources are merged in precedence order (later sources override earlier ones):
//!
//! 1. Built-in defaults
//! 2. An optional configuration file (TOML, YAML or JSON by extension)
//! 3. Environment variables with the `REPAIRDESK_` prefix; nested keys are
//!    separated by a double underscore (`REPAIRDESK_SYNC__BASE_URL`)
//!
//! ```toml
//! stages = ["assigned", "in_progress", "completed"]
//!
//! [sync]
//! base_url = "https://erp.example.com"
//! placement_path = "/job-assignments/{id}/position"
//! timeout_ms = 8000
//! ```

use crate::types::{StageSet, DEFAULT_STAGES};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace};

/// Default environment variable prefix
pub const ENV_PREFIX: &str = "REPAIRDESK_";

/// Result type for configuration loading
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Configuration file format not supported
    #[error("Unsupported configuration file format: {format}")]
    UnsupportedFormat { format: String },

    /// Configuration parsing failed
    #[error("Failed to parse configuration: {source}")]
    ParseError {
        #[source]
        source: Box<figment::Error>,
    },

    /// Configuration validation failed
    #[error("Configuration validation failed: {message}")]
    ValidationError { message: String },
}

impl ConfigError {
    fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::ParseError {
            source: Box::new(error),
        }
    }
}

/// Everything the board needs from the outside world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Workflow stages in board order
    pub stages: Vec<String>,
    pub sync: SyncConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            stages: DEFAULT_STAGES.iter().map(|s| s.to_string()).collect(),
            sync: SyncConfig::default(),
        }
    }
}

impl BoardConfig {
    /// The configured stages as a stage set
    pub fn stage_set(&self) -> StageSet {
        StageSet::new(self.stages.iter().map(String::as_str))
    }

    /// Check values figment cannot check by type alone
    pub fn validate(&self) -> ConfigResult<()> {
        if self.stages.is_empty() {
            return Err(ConfigError::validation("at least one stage is required"));
        }
        let mut seen = HashSet::new();
        for stage in &self.stages {
            if stage.trim().is_empty() {
                return Err(ConfigError::validation("stage names must not be blank"));
            }
            if !seen.insert(stage.as_str()) {
                return Err(ConfigError::validation(format!(
                    "stage '{}' is listed twice",
                    stage
                )));
            }
        }
        self.sync.validate()
    }
}

/// Where and how moves are persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// ERP server URL, including any path prefix the API is mounted under
    pub base_url: String,
    /// Path of the placement resource below `base_url`; `{id}` is replaced by
    /// the assignment id
    pub placement_path: String,
    /// A call with no answer after this long counts as failed
    pub timeout_ms: u64,
    /// Bearer token sent with every request. Never serialized, so it stays
    /// out of logged configuration.
    #[serde(skip_serializing)]
    pub token: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            placement_path: "/job-assignments/{id}/position".to_string(),
            timeout_ms: 10_000,
            token: None,
        }
    }
}

impl SyncConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::validation("sync.timeout_ms must be positive"));
        }
        if !self.placement_path.contains("{id}") {
            return Err(ConfigError::validation(
                "sync.placement_path must contain an {id} placeholder",
            ));
        }
        url::Url::parse(&self.base_url).map_err(|e| {
            ConfigError::validation(format!("sync.base_url '{}': {}", self.base_url, e))
        })?;
        Ok(())
    }
}

/// Builds a [`BoardConfig`] from defaults, an optional file and the environment.
///
/// Nothing is cached; every [`load`](Self::load) reads the sources fresh.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            file: None,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Also read this file; it must exist.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load and validate the configuration
    pub fn load(&self) -> ConfigResult<BoardConfig> {
        let config: BoardConfig = self.build_figment()?.extract()?;
        config.validate()?;
        debug!(
            stages = config.stages.len(),
            base_url = %config.sync.base_url,
            "loaded board configuration"
        );
        Ok(config)
    }

    fn build_figment(&self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(BoardConfig::default()));

        if let Some(path) = &self.file {
            figment = figment.merge(Self::file_provider(path)?);
        }

        trace!(prefix = %self.env_prefix, "merging environment overrides");
        Ok(figment.merge(Env::prefixed(&self.env_prefix).split("__")))
    }

    fn file_provider(path: &Path) -> ConfigResult<Figment> {
        if !path.is_file() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        debug!("Loading config file: {}", path.display());
        match extension.as_str() {
            "toml" => Ok(Figment::from(Toml::file(path))),
            "yaml" | "yml" => Ok(Figment::from(Yaml::file(path))),
            "json" => Ok(Figment::from(Json::file(path))),
            other => Err(ConfigError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
