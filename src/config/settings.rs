use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::serialize::SerializationOptions;
use crate::util::paths::config_path;

/// Example configuration file contents (bundled with the binary)
pub const EXAMPLE_CONFIG: &str = include_str!("config.toml.example");

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Bounds used when serializing captured values
    pub serializer: SerializationOptions,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlSerializerConfig {
    pub key_limit: Option<usize>,
    pub depth_limit: Option<usize>,
    pub string_length_limit: Option<usize>,
}

/// TOML representation of the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Serializer bounds
    pub serializer: Option<TomlSerializerConfig>,
}

impl Config {
    /// Load configuration from the default location, merging with defaults.
    ///
    /// Never fails: an unreadable or invalid file is logged and ignored.
    pub fn load() -> Self {
        let config_file = config_path();

        // Create example config on first run
        if !config_file.exists() {
            Self::create_default_config(&config_file);
        }

        match Self::load_from_path(&config_file) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    path = %config_file.display(),
                    error = %e,
                    "Ignoring config file, using defaults"
                );
                Config::default()
            }
        }
    }

    /// Load configuration from an explicit path. A missing file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let toml_config: TomlConfig = toml::from_str(contents)?;
        let mut config = Config::default();
        config.merge(toml_config);
        Ok(config)
    }

    fn merge(&mut self, toml_config: TomlConfig) {
        if let Some(serializer) = toml_config.serializer {
            if let Some(key_limit) = serializer.key_limit {
                self.serializer.key_limit = key_limit;
            }
            if let Some(depth_limit) = serializer.depth_limit {
                self.serializer.depth_limit = depth_limit;
            }
            if let Some(limit) = serializer.string_length_limit {
                self.serializer.string_length_limit = Some(limit);
            }
        }
    }

    /// Create the default config file from the bundled example
    fn create_default_config(path: &Path) {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                if let Err(e) = fs::create_dir_all(parent) {
                    tracing::warn!(error = %e, "Failed to create config directory");
                    return;
                }
            }
        }

        if let Err(e) = fs::write(path, EXAMPLE_CONFIG) {
            tracing::warn!(error = %e, "Failed to write default config");
        }
    }

    pub fn with_serializer(mut self, serializer: SerializationOptions) -> Self {
        self.serializer = serializer;
        self
    }
}
