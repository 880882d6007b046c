#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Run configuration for the daily crime CSV splitter.
//!
//! Values resolve in layers, lowest priority first:
//!
//! 1. Built-in defaults ([`SplitConfig::default`])
//! 2. A TOML file ([`SplitConfig::from_toml_file`])
//! 3. Environment variables ([`SplitConfig::apply_env`])
//! 4. CLI flags (applied by the binary)
//!
//! # Environment Variables
//!
//! | Variable | Field |
//! |---|---|
//! | `CRIME_SPLIT_SOURCE_PATH` | `source_path` |
//! | `CRIME_SPLIT_OUTPUT_DIR` | `output_dir` |
//! | `CRIME_SPLIT_FILE_PREFIX` | `file_prefix` |
//! | `CRIME_SPLIT_BUCKET` | `bucket_name` |
//! | `CRIME_SPLIT_KEY_PREFIX` | `key_prefix` |
//! | `CRIME_SPLIT_REGION` | `region` |
//! | `CRIME_SPLIT_ENDPOINT_URL` | `endpoint_url` |

use std::path::{Path, PathBuf};

use crime_split_partition_models::DEFAULT_FILE_PREFIX;
use serde::{Deserialize, Serialize};

/// Default location of the source dataset.
pub const DEFAULT_SOURCE_PATH: &str = "data/Crime_Data_from_2020_to_Present.csv";

/// Default directory for daily output files.
pub const DEFAULT_OUTPUT_DIR: &str = "data/output";

/// Default destination bucket.
pub const DEFAULT_BUCKET: &str = "la-crime-snowflake-df";

/// Default object key prefix.
pub const DEFAULT_KEY_PREFIX: &str = "raw";

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`SplitConfig`].
    #[error("Invalid config TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// An environment variable was set to an unusable value.
    #[error("Invalid value for environment variable {name}: {reason}")]
    InvalidEnv {
        /// Name of the variable.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A field holds a value the splitter cannot use.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Name of the field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Paths, naming, and object-store settings for a split run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitConfig {
    /// Source CSV dataset.
    pub source_path: PathBuf,
    /// Directory that receives the daily files.
    pub output_dir: PathBuf,
    /// Daily file name prefix; also the cleanup and upload scan pattern.
    pub file_prefix: String,
    /// Destination bucket for uploads.
    pub bucket_name: String,
    /// Object key prefix; files land at `<key_prefix>/<file name>`.
    pub key_prefix: String,
    /// Region override. `None` defers to the SDK's default resolution.
    pub region: Option<String>,
    /// Endpoint override for S3-compatible stores (R2, `MinIO`).
    pub endpoint_url: Option<String>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(DEFAULT_SOURCE_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            bucket_name: DEFAULT_BUCKET.to_string(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            region: None,
            endpoint_url: None,
        }
    }
}

impl SplitConfig {
    /// Parses a config from TOML. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] on malformed TOML or unknown keys, or
    /// [`ConfigError::InvalidValue`] if a required value is blank.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::de::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the naming and destination fields are usable.
    ///
    /// A blank `file_prefix` would make the cleanup pattern match every
    /// file in the output directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first blank field among
    /// `file_prefix`, `bucket_name`, `source_path` and `output_dir`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let blank = |field: &'static str| ConfigError::InvalidValue {
            field,
            reason: "value is empty".to_string(),
        };

        if self.file_prefix.trim().is_empty() {
            return Err(blank("file_prefix"));
        }
        if self.bucket_name.trim().is_empty() {
            return Err(blank("bucket_name"));
        }
        if self.source_path.as_os_str().is_empty() {
            return Err(blank("source_path"));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(blank("output_dir"));
        }
        Ok(())
    }

    /// Reads and parses a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Toml`] if it cannot be parsed.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Applies `CRIME_SPLIT_*` overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if a variable is set but empty.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if a variable is set but empty.
    pub fn apply_vars(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(v) = non_empty(&lookup, "CRIME_SPLIT_SOURCE_PATH")? {
            self.source_path = PathBuf::from(v);
        }
        if let Some(v) = non_empty(&lookup, "CRIME_SPLIT_OUTPUT_DIR")? {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = non_empty(&lookup, "CRIME_SPLIT_FILE_PREFIX")? {
            self.file_prefix = v;
        }
        if let Some(v) = non_empty(&lookup, "CRIME_SPLIT_BUCKET")? {
            self.bucket_name = v;
        }
        if let Some(v) = non_empty(&lookup, "CRIME_SPLIT_KEY_PREFIX")? {
            self.key_prefix = v;
        }
        if let Some(v) = non_empty(&lookup, "CRIME_SPLIT_REGION")? {
            self.region = Some(v);
        }
        if let Some(v) = non_empty(&lookup, "CRIME_SPLIT_ENDPOINT_URL")? {
            self.endpoint_url = Some(v);
        }
        Ok(self)
    }
}

/// Reads a variable, rejecting values that are set but blank.
fn non_empty(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<String>, ConfigError> {
    match lookup(name) {
        Some(value) if value.trim().is_empty() => Err(ConfigError::InvalidEnv {
            name: name.to_string(),
            reason: "value is empty".to_string(),
        }),
        other => Ok(other),
    }
}
