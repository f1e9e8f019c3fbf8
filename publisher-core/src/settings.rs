//! Persisted endpoint settings.
//!
//! The host, user and password are stored as a small TOML file under the platform
//! configuration directory (`<config>/wp-native-post/upload.toml`). The file is read once
//! at startup and written only when the user explicitly saves the configuration.

use crate::error::{ConfigError, CoreError};
use crate::types::EndpointConfig;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const ORGANIZATION_DIR: &str = "wp-native-post";
const SETTINGS_FILE: &str = "upload.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store located in the platform configuration directory.
    pub fn default_location() -> Result<Self, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDirectory)?;
        Ok(Self::at(config_dir.join(ORGANIZATION_DIR).join(SETTINGS_FILE)))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the saved settings; a store that was never saved yields empty fields.
    pub fn load(&self) -> Result<EndpointConfig, CoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", self.path.display());
                return Ok(EndpointConfig::default());
            }
            Err(e) => return Err(self.map_io_error(e)),
        };

        let config: EndpointConfig = toml::from_str(&contents).map_err(ConfigError::from)?;
        info!("Loaded settings from {}", self.path.display());
        Ok(config)
    }

    pub fn save(&self, config: &EndpointConfig) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.map_io_error(e))?;
        }

        let contents = toml::to_string(config).map_err(ConfigError::from)?;
        std::fs::write(&self.path, contents).map_err(|e| self.map_io_error(e))?;
        info!("Saved settings to {}", self.path.display());
        Ok(())
    }

    fn map_io_error(&self, error: io::Error) -> CoreError {
        match error.kind() {
            io::ErrorKind::PermissionDenied => CoreError::Config(ConfigError::PermissionDenied {
                path: self.path.display().to_string(),
            }),
            io::ErrorKind::InvalidData => CoreError::Config(ConfigError::InvalidFormat {
                details: error.to_string(),
            }),
            _ => CoreError::Io(error),
        }
    }
}
