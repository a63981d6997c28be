//! Application service: configuration replacement use-case.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::{Clock, FileSystem};
use crate::domain::InstallLayout;
use crate::domain::backup::first_free_backup_name;
use crate::domain::error::ConfigError;

/// Permission bits of the installed configuration file.
pub const CONFIG_MODE: u32 = 0o644;

/// Where a file already at the configuration path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistingConfig {
    /// Present before this run started; backed up before it is replaced.
    Preserve,
    /// Laid down by this run's package install after the remover had
    /// already cleared the path; replaced without a backup.
    Packaged,
}

/// What [`apply`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigApplyReport {
    /// Backup of the previous file, if there was one and it could be taken.
    pub backup: Option<PathBuf>,
    pub installed_path: PathBuf,
    /// The package's default configuration was overwritten.
    pub replaced_packaged_default: bool,
    pub warnings: Vec<String>,
}

/// Copy the current configuration file to a fresh timestamped backup next
/// to it. Existing backups are never overwritten.
///
/// # Errors
///
/// Returns an error if the copy fails.
pub fn backup_existing_config(
    fs: &impl FileSystem,
    clock: &impl Clock,
    layout: &InstallLayout,
) -> Result<PathBuf> {
    let name = first_free_backup_name(clock.now(), |candidate| {
        fs.exists(&layout.config_dir.join(candidate))
    });
    let backup = layout.config_dir.join(name);
    fs.copy(&layout.config_path, &backup)
        .with_context(|| format!("backing up {}", layout.config_path.display()))?;
    log::debug!("configuration backed up to {}", backup.display());
    Ok(backup)
}

/// Install `source` as the collector configuration.
///
/// An existing file is backed up first unless `existing` says the package
/// put it there during this run. A failed backup is reported as a warning
/// and the replacement goes ahead.
///
/// # Errors
///
/// Returns [`ConfigError`] when the directory cannot be created, the copy
/// fails, or the permissions cannot be set.
pub fn apply(
    fs: &impl FileSystem,
    clock: &impl Clock,
    layout: &InstallLayout,
    source: &Path,
    existing: ExistingConfig,
) -> Result<ConfigApplyReport> {
    let mut report = ConfigApplyReport {
        installed_path: layout.config_path.clone(),
        ..ConfigApplyReport::default()
    };

    if !fs.exists(&layout.config_dir) {
        fs.create_dir_all(&layout.config_dir)
            .map_err(|e| ConfigError::CreateDir {
                path: layout.config_dir.clone(),
                reason: format!("{e:#}"),
            })?;
    }

    if fs.exists(&layout.config_path) {
        match existing {
            ExistingConfig::Preserve => match backup_existing_config(fs, clock, layout) {
                Ok(path) => report.backup = Some(path),
                Err(e) => report
                    .warnings
                    .push(format!("could not back up existing configuration: {e:#}")),
            },
            ExistingConfig::Packaged => {
                log::debug!(
                    "replacing packaged default at {}",
                    layout.config_path.display()
                );
                report.replaced_packaged_default = true;
            }
        }
    }

    fs.copy(source, &layout.config_path)
        .map_err(|e| ConfigError::Copy {
            path: layout.config_path.clone(),
            reason: format!("{e:#}"),
        })?;
    fs.set_mode(&layout.config_path, CONFIG_MODE)
        .map_err(|e| ConfigError::Permissions {
            path: layout.config_path.clone(),
            reason: format!("{e:#}"),
        })?;

    Ok(report)
}
