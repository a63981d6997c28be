//! Application service: existing-installation removal.
//!
//! Every step is best-effort: failures are recorded as warnings in the
//! [`RemovalReport`] and the next step still runs. The remover never fails
//! the run.

use std::path::PathBuf;
use std::process::Output;

use crate::application::ports::{Clock, CommandRunner, FileSystem, ProgressReporter};
use crate::application::services::config_install::backup_existing_config;
use crate::application::services::installer::PACKAGE_TIMEOUT;
use crate::domain::layout::service_unit_name;
use crate::domain::platform::BINARY_NAME;
use crate::domain::{InstallLayout, PackageManager};

/// Everything the remover observed and changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalReport {
    /// The service unit was known to systemd.
    pub service_registered: bool,
    pub service_stopped: bool,
    pub service_disabled: bool,
    /// Package managers that had the package registered and removed it.
    pub packages_removed: Vec<PackageManager>,
    /// Files and directories deleted by path.
    pub paths_removed: Vec<PathBuf>,
    pub config_backup: Option<PathBuf>,
    /// The configuration file was left in place because no backup could be taken.
    pub config_kept: bool,
    pub daemon_reloaded: bool,
    pub warnings: Vec<String>,
}

impl RemovalReport {
    /// `true` when nothing from a previous installation was found.
    #[must_use]
    pub fn found_nothing(&self) -> bool {
        !self.service_registered
            && self.packages_removed.is_empty()
            && self.paths_removed.is_empty()
            && self.config_backup.is_none()
            && !self.config_kept
            && self.warnings.is_empty()
    }

    fn warn(&mut self, reporter: &impl ProgressReporter, message: String) {
        log::debug!("removal warning: {message}");
        reporter.warn(&message);
        self.warnings.push(message);
    }
}

/// Bring the host to a clean slate.
///
/// The configuration backup is taken before any package is purged, since a
/// purge deletes the packaged configuration file.
pub async fn remove_existing(
    runner: &impl CommandRunner,
    fs: &impl FileSystem,
    clock: &impl Clock,
    layout: &InstallLayout,
    reporter: &impl ProgressReporter,
) -> RemovalReport {
    let mut report = RemovalReport::default();
    let unit = service_unit_name();

    // 1. Service
    if unit_registered(runner, &unit).await {
        report.service_registered = true;
        reporter.step(&format!("Stopping {unit}..."));
        let _ = systemctl(runner, &["reset-failed", &unit]).await;
        if succeeded(systemctl(runner, &["is-active", "--quiet", &unit]).await.as_ref()) {
            if succeeded(systemctl(runner, &["stop", &unit]).await.as_ref()) {
                report.service_stopped = true;
            } else {
                report.warn(reporter, format!("could not stop {unit}"));
            }
        }
        if succeeded(systemctl(runner, &["is-enabled", "--quiet", &unit]).await.as_ref()) {
            if succeeded(systemctl(runner, &["disable", &unit]).await.as_ref()) {
                report.service_disabled = true;
            } else {
                report.warn(reporter, format!("could not disable {unit}"));
            }
        }
    }

    // 2. Configuration backup, ahead of any purge
    if fs.exists(&layout.config_path) {
        match backup_existing_config(fs, clock, layout) {
            Ok(path) => {
                reporter.step(&format!("Backed up configuration to {}", path.display()));
                report.config_backup = Some(path);
            }
            Err(e) => {
                report.config_kept = true;
                report.warn(
                    reporter,
                    format!("configuration backup failed, keeping the file: {e:#}"),
                );
            }
        }
    }

    // 3. Packages
    for manager in PackageManager::ALL {
        remove_package(runner, manager, reporter, &mut report).await;
    }

    // 4. Files
    let mut files = vec![layout.binary_path.clone()];
    if !report.config_kept {
        files.push(layout.config_path.clone());
    }
    files.extend(layout.unit_paths.iter().cloned());
    for path in files {
        if !fs.exists(&path) {
            continue;
        }
        match fs.remove_file(&path) {
            Ok(()) => report.paths_removed.push(path),
            Err(e) => report.warn(reporter, format!("could not remove {}: {e:#}", path.display())),
        }
    }
    if fs.exists(&layout.dropin_dir) {
        match fs.remove_dir_all(&layout.dropin_dir) {
            Ok(()) => report.paths_removed.push(layout.dropin_dir.clone()),
            Err(e) => report.warn(
                reporter,
                format!("could not remove {}: {e:#}", layout.dropin_dir.display()),
            ),
        }
    }

    // 5. Empty configuration directory
    if fs.exists(&layout.config_dir) && fs.dir_is_empty(&layout.config_dir).unwrap_or(false) {
        match fs.remove_dir(&layout.config_dir) {
            Ok(()) => report.paths_removed.push(layout.config_dir.clone()),
            Err(e) => log::debug!("leaving {}: {e:#}", layout.config_dir.display()),
        }
    }

    // 6. Let systemd forget what was removed
    let units_removed = layout
        .unit_paths
        .iter()
        .chain(std::iter::once(&layout.dropin_dir))
        .any(|p| report.paths_removed.contains(p));
    if report.service_registered || !report.packages_removed.is_empty() || units_removed {
        if succeeded(systemctl(runner, &["daemon-reload"]).await.as_ref()) {
            report.daemon_reloaded = true;
        } else {
            report.warn(reporter, "systemctl daemon-reload failed".to_string());
        }
        let _ = systemctl(runner, &["reset-failed"]).await;
    }

    report
}

async fn remove_package(
    runner: &impl CommandRunner,
    manager: PackageManager,
    reporter: &impl ProgressReporter,
    report: &mut RemovalReport,
) {
    let program = manager.program();
    let query = manager.query_args(BINARY_NAME);
    let query: Vec<&str> = query.iter().map(String::as_str).collect();
    let registered = match runner.run(program, &query).await {
        Ok(out) => out.status.success(),
        Err(e) => {
            log::debug!("{program} unavailable: {e:#}");
            return;
        }
    };
    if !registered {
        return;
    }

    reporter.step(&format!("Removing {BINARY_NAME} package with {program}..."));
    let purge = manager.purge_args(BINARY_NAME);
    let purge: Vec<&str> = purge.iter().map(String::as_str).collect();
    match runner.run_with_timeout(program, &purge, PACKAGE_TIMEOUT).await {
        Ok(out) if out.status.success() => report.packages_removed.push(manager),
        Ok(out) => report.warn(
            reporter,
            format!(
                "{program} {} failed: {}",
                purge.join(" "),
                String::from_utf8_lossy(&out.stderr).trim()
            ),
        ),
        Err(e) => report.warn(reporter, format!("{program} {} failed: {e:#}", purge.join(" "))),
    }
}

async fn unit_registered(runner: &impl CommandRunner, unit: &str) -> bool {
    match systemctl(runner, &["list-unit-files", unit, "--no-legend"]).await {
        Some(out) => String::from_utf8_lossy(&out.stdout)
            .lines()
            .any(|line| line.split_whitespace().next() == Some(unit)),
        None => false,
    }
}

/// Run `systemctl`; `None` when it could not be run at all.
async fn systemctl(runner: &impl CommandRunner, args: &[&str]) -> Option<Output> {
    log::debug!("systemctl {}", args.join(" "));
    match runner.run("systemctl", args).await {
        Ok(out) => Some(out),
        Err(e) => {
            log::debug!("systemctl {} failed: {e:#}", args.join(" "));
            None
        }
    }
}

fn succeeded(output: Option<&Output>) -> bool {
    output.is_some_and(|o| o.status.success())
}
