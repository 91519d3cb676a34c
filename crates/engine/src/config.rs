//! Store configuration.
//!
//! [`StoreConfig`] controls how a [`Database`](crate::Database) is built and
//! how bulk loading treats bad records. It can be built in code with the
//! builder-style setters or read from a TOML file:
//!
//! ```toml
//! load_policy = "lenient"
//! reference_instant = 1503695452
//! initial_capacity = 200000
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tripstore_core::ReferenceInstant;

/// Default pre-allocated table capacity per entity kind.
pub const DEFAULT_CAPACITY: usize = 100_000;

/// What bulk loading does with a record that fails admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPolicy {
    /// Abort the load on the first rejected record (default).
    #[default]
    Strict,
    /// Skip the record and log a warning.
    Lenient,
}

/// Errors reading or applying a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`StoreConfig`].
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// `reference_instant` cannot be placed on the calendar.
    #[error("reference_instant {0} is outside the supported range")]
    ReferenceInstant(i64),
}

/// Options for building a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Treatment of rejected records during bulk load.
    pub load_policy: LoadPolicy,
    /// Frozen "now" for age computations, in epoch seconds.
    /// `None` captures the current time when the database is built.
    pub reference_instant: Option<i64>,
    /// Pre-allocated capacity of each entity table.
    pub initial_capacity: usize,
}

impl StoreConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the load policy.
    pub fn load_policy(mut self, policy: LoadPolicy) -> Self {
        self.load_policy = policy;
        self
    }

    /// Pin the reference instant instead of capturing the current time.
    pub fn reference_instant(mut self, epoch_seconds: i64) -> Self {
        self.reference_instant = Some(epoch_seconds);
        self
    }

    /// Set the pre-allocated table capacity.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Parse a config from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a config from a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Resolve the reference instant, capturing the current time if unset.
    pub fn resolve_reference(&self) -> Result<ReferenceInstant, ConfigError> {
        match self.reference_instant {
            Some(secs) => ReferenceInstant::from_epoch_seconds(secs)
                .ok_or(ConfigError::ReferenceInstant(secs)),
            None => Ok(ReferenceInstant::now()),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            load_policy: LoadPolicy::Strict,
            reference_instant: None,
            initial_capacity: DEFAULT_CAPACITY,
        }
    }
}
