//! Infrastructure implementation of the `SettingsStore` port.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::application::ports::SettingsStore;
use crate::domain::config::InstallerSettings;
use crate::domain::error::ConfigError;

/// Environment variable overriding the settings file location.
pub const SETTINGS_ENV: &str = "OTELCOL_INSTALLER_SETTINGS";

/// Settings location when [`SETTINGS_ENV`] is unset.
pub const DEFAULT_SETTINGS_PATH: &str = "/etc/otelcol-installer/settings.yaml";

/// Production implementation of `SettingsStore` that reads a YAML file.
pub struct YamlSettingsStore;

impl SettingsStore for YamlSettingsStore {
    fn load(&self) -> Result<InstallerSettings> {
        let path = self.path();
        if !path.exists() {
            log::debug!("no settings file at {}", path.display());
            return Ok(InstallerSettings::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(InstallerSettings::default());
        }
        let settings = serde_yaml::from_str(&content).map_err(|e| ConfigError::InvalidSettings {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    fn path(&self) -> PathBuf {
        std::env::var_os(SETTINGS_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH), PathBuf::from)
    }
}
