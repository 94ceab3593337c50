//! Configuration management for docgraph.
//!
//! Configuration is read from a YAML file. Every key is optional; missing
//! keys fall back to the defaults below.
//!
//! ```yaml
//! database:
//!   path: .docgraph/index.db
//!   pool-size: 8
//!   pool-min-idle: 1
//!   busy-timeout-ms: 30000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the docgraph directory
pub const DOCGRAPH_DIR_NAME: &str = ".docgraph";

/// Name of the database file inside the docgraph directory
pub const DATABASE_FILE_NAME: &str = "index.db";

/// Name of the configuration file inside the docgraph directory
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store configuration
    pub database: DatabaseConfig,
}

/// Store configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DatabaseConfig {
    /// Path to the `SQLite` database file
    pub path: PathBuf,

    /// Maximum number of pooled connections
    pub pool_size: u32,

    /// Connections kept open while idle
    pub pool_min_idle: u32,

    /// How long a connection waits on a locked database
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: Path::new(DOCGRAPH_DIR_NAME).join(DATABASE_FILE_NAME),
            pool_size: 8,
            pool_min_idle: 1,
            busy_timeout_ms: 30_000,
        }
    }
}

impl DatabaseConfig {
    /// Busy timeout as a [`Duration`].
    #[must_use]
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(Error::Config("database.path must not be empty".to_string()));
        }
        if self.pool_size == 0 {
            return Err(Error::Config(
                "database.pool-size must be at least 1".to_string(),
            ));
        }
        if self.busy_timeout_ms == 0 {
            return Err(Error::Config(
                "database.busy-timeout-ms must be at least 1".to_string(),
            ));
        }
        if self.pool_min_idle > self.pool_size {
            return Err(Error::Config(format!(
                "database.pool-min-idle ({}) exceeds database.pool-size ({})",
                self.pool_min_idle, self.pool_size
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Default configuration with the database at `path`.
    #[must_use]
    pub fn with_database_path(path: impl Into<PathBuf>) -> Self {
        let mut config = Self::default();
        config.database.path = path.into();
        config
    }

    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and [`Error::Config`]
    /// if it is not valid YAML or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Save configuration to a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        self.database.validate()
    }
}
