//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use crate::app::{AppContext, AppFlags};
use crate::application::ports::SettingsStore;
use crate::commands;
use crate::domain::config::InstallerSettings;
use crate::domain::error::ConfigError;
use crate::domain::options::normalize_version;
use crate::domain::platform::{DEFAULT_DOWNLOAD_BASE_URL, DEFAULT_VERSION};
use crate::domain::{ConfigSource, Mode, RunOptions};

/// Install the OpenTelemetry Collector (contrib) on a Linux host
///
/// Detects the distribution and architecture, removes any previous
/// installation, downloads the release artifact, and installs it with dpkg,
/// rpm, or from the plain archive.
#[derive(Parser, Debug)]
#[command(name = "otelcol-installer", disable_version_flag = true)]
pub struct Cli {
    /// Presentation style
    #[arg(long, value_enum, value_name = "MODE")]
    pub mode: Option<ModeArg>,

    /// Collector release to install [default: 0.126.0]
    #[arg(long = "version", value_name = "X.Y.Z")]
    pub version: Option<String>,

    /// Replace the collector configuration after installing
    #[arg(long, overrides_with = "no_replace_config")]
    pub replace_config: bool,

    /// Keep the packaged configuration (default)
    #[arg(long, overrides_with = "replace_config")]
    pub no_replace_config: bool,

    /// Download the replacement configuration from this URL
    #[arg(long, value_name = "URL", conflicts_with = "config_file")]
    pub config_url: Option<String>,

    /// Read the replacement configuration from this file
    #[arg(long, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Release mirror to download from
    #[arg(long, value_name = "URL")]
    pub download_base_url: Option<String>,

    /// Check the artifact against the release SHA-256 manifest
    #[arg(long)]
    pub verify_checksum: bool,

    /// Enable and start the service after installing
    #[arg(long)]
    pub start: bool,

    /// Remove an existing installation and exit
    #[arg(
        long,
        conflicts_with_all = ["version", "replace_config", "config_url", "config_file", "verify_checksum", "start"]
    )]
    pub uninstall: bool,

    /// Print only warnings and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output (`NO_COLOR` in the environment does the same)
    #[arg(long)]
    pub no_color: bool,

    /// Log external commands and HTTP requests
    #[arg(short, long)]
    pub verbose: bool,
}

/// `--mode` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Interactive,
    Basic,
}

impl From<ModeArg> for Mode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Interactive => Mode::Interactive,
            ModeArg::Basic => Mode::Basic,
        }
    }
}

impl Cli {
    /// Merge flags with the settings file: flag, then setting, then default.
    ///
    /// `--config-url` and `--config-file` imply `--replace-config` unless
    /// `--no-replace-config` is given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSettings`] for an unknown `mode` value in
    /// the settings file.
    pub fn resolve_options(
        &self,
        settings: &InstallerSettings,
        settings_path: &std::path::Path,
    ) -> Result<RunOptions> {
        let mode = match (self.mode, settings.mode.as_deref()) {
            (Some(mode), _) => mode.into(),
            (None, Some(raw)) => Mode::parse(raw).ok_or_else(|| ConfigError::InvalidSettings {
                path: settings_path.to_path_buf(),
                reason: format!("mode '{raw}' is not one of interactive, basic"),
            })?,
            (None, None) => Mode::default(),
        };

        let requested_version = normalize_version(
            self.version
                .as_deref()
                .or(settings.version.as_deref())
                .unwrap_or(DEFAULT_VERSION),
        );

        let config_source = match (&self.config_file, &self.config_url, &settings.config_url) {
            (Some(path), _, _) => ConfigSource::File(path.clone()),
            (None, Some(url), _) | (None, None, Some(url)) => ConfigSource::Url(url.clone()),
            (None, None, None) => ConfigSource::Bundled,
        };

        let explicit_source = self.config_file.is_some() || self.config_url.is_some();
        let replace_config = if self.replace_config {
            true
        } else if self.no_replace_config {
            false
        } else {
            explicit_source || settings.replace_config.unwrap_or(false)
        };

        Ok(RunOptions {
            mode,
            requested_version,
            replace_config,
            config_source,
            download_base_url: self
                .download_base_url
                .clone()
                .or_else(|| settings.download_base_url.clone())
                .unwrap_or_else(|| DEFAULT_DOWNLOAD_BASE_URL.to_string()),
            verify_checksum: self.verify_checksum || settings.verify_checksum.unwrap_or(false),
            start_service: self.start || settings.start_service.unwrap_or(false),
        })
    }

    /// Execute the requested action.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file is invalid or installation fails.
    pub async fn run(self) -> Result<()> {
        let app = AppContext::new(&AppFlags {
            no_color: self.no_color,
            quiet: self.quiet,
        });
        let settings_path = app.settings.path();
        let settings = app
            .settings
            .load()
            .with_context(|| format!("loading settings from {}", settings_path.display()))?;
        let options = self.resolve_options(&settings, &settings_path)?;

        if self.uninstall {
            commands::uninstall::run(&app, options.mode).await
        } else {
            commands::install::run(&app, &options).await
        }
    }
}
