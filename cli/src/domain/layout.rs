//! Canonical filesystem locations owned by the installer.

use std::path::{Path, PathBuf};

use crate::domain::platform::BINARY_NAME;

/// Every path the installer writes or removes.
///
/// Production uses [`InstallLayout::system`]. Tests re-root the same tree
/// under a scratch directory with [`InstallLayout::rooted`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    /// Collector binary, shared by package and archive installs.
    pub binary_path: PathBuf,
    /// Directory holding the configuration file and its backups.
    pub config_dir: PathBuf,
    /// The configuration file the service reads.
    pub config_path: PathBuf,
    /// Unit file locations: vendor directory first, then the admin override.
    pub unit_paths: Vec<PathBuf>,
    /// Override drop-in directory (`<unit>.service.d`).
    pub dropin_dir: PathBuf,
}

impl InstallLayout {
    /// The real host layout.
    #[must_use]
    pub fn system() -> Self {
        Self::rooted(Path::new("/"))
    }

    /// The host layout re-rooted under `root`.
    #[must_use]
    pub fn rooted(root: &Path) -> Self {
        let config_dir = root.join("etc").join(BINARY_NAME);
        let unit_file = service_unit_name();
        let override_dir = root.join("etc/systemd/system");
        Self {
            binary_path: root.join("usr/bin").join(BINARY_NAME),
            config_path: config_dir.join("config.yaml"),
            config_dir,
            unit_paths: vec![
                root.join("lib/systemd/system").join(&unit_file),
                root.join("usr/lib/systemd/system").join(&unit_file),
                override_dir.join(&unit_file),
            ],
            dropin_dir: override_dir.join(format!("{unit_file}.d")),
        }
    }
}

/// `otelcol-contrib.service`
#[must_use]
pub fn service_unit_name() -> String {
    format!("{BINARY_NAME}.service")
}
