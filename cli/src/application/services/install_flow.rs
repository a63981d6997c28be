//! Application service: the install and uninstall state machines.
//!
//! Phase order is fixed: probe, remove, fetch, install, configure, service.
//! Platform resolution completes before anything on the host changes, and
//! every download completes before the installer runs.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{
    ArchiveUnpacker, BundledAssets, Clock, CommandRunner, FileHasher, FileSystem, HttpTransport,
    PlatformSource, ProgressReporter,
};
use crate::application::services::artifact_fetch::{self, PreparedConfig};
use crate::application::services::config_install::{self, ConfigApplyReport, ExistingConfig};
use crate::application::services::installer::{self, InstallOutcome};
use crate::application::services::platform_probe;
use crate::application::services::removal::{self, RemovalReport};
use crate::domain::config::{DocumentCheck, REQUIRED_SECTIONS};
use crate::domain::layout::service_unit_name;
use crate::domain::options::is_release_version;
use crate::domain::{InstallLayout, InstallTarget, RunOptions, Step};

/// The collaborators one installation needs.
pub struct InstallDeps<'a, R, H, F, U, P, C, A> {
    pub runner: &'a R,
    pub http: &'a H,
    pub fs: &'a F,
    pub unpacker: &'a U,
    pub platform: &'a P,
    pub clock: &'a C,
    pub assets: &'a A,
}

/// Result of a completed installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallSummary {
    pub target: InstallTarget,
    pub removal: RemovalReport,
    pub bytes_downloaded: u64,
    /// Digest confirmed against the release manifest, when verification ran.
    pub verified_sha256: Option<String>,
    pub outcome: InstallOutcome,
    /// Present when the configuration was replaced.
    pub config: Option<ConfigApplyReport>,
    /// `Some(true)` when the service was enabled and started.
    pub service_started: Option<bool>,
    /// Non-fatal problems from every phase, in order.
    pub warnings: Vec<String>,
}

/// Run the full installation.
///
/// # Errors
///
/// Returns an error naming the failing phase when platform detection,
/// download, checksum verification, installation, or configuration fails.
/// Removal and service start problems are warnings only.
pub async fn run_install<R, H, F, U, P, C, A>(
    deps: &InstallDeps<'_, R, H, F, U, P, C, A>,
    layout: &InstallLayout,
    options: &RunOptions,
    work_dir: &Path,
    reporter: &impl ProgressReporter,
) -> Result<InstallSummary>
where
    R: CommandRunner,
    H: HttpTransport,
    F: FileSystem + FileHasher,
    U: ArchiveUnpacker,
    P: PlatformSource,
    C: Clock,
    A: BundledAssets,
{
    let mut warnings = Vec::new();

    // 1. Probe
    reporter.phase(Step::Probe);
    if !is_release_version(&options.requested_version) {
        let message = format!(
            "version '{}' does not look like X.Y.Z; trying it anyway",
            options.requested_version
        );
        note(reporter, &mut warnings, message);
    }
    let target = platform_probe::resolve(
        deps.platform,
        &options.requested_version,
        &options.download_base_url,
    )
    .await
    .context("platform detection failed")?;
    reporter.success(&format!(
        "{} / {} → {}",
        target.os_family, target.architecture, target.package_strategy
    ));

    // 2. Remove
    reporter.phase(Step::Remove);
    let removal =
        removal::remove_existing(deps.runner, deps.fs, deps.clock, layout, reporter).await;
    warnings.extend(removal.warnings.iter().cloned());
    let config_survived_removal = deps.fs.exists(&layout.config_path);
    if removal.found_nothing() {
        reporter.success("No previous installation found");
    } else {
        reporter.success("Previous installation removed");
    }

    // 3. Fetch
    reporter.phase(Step::Fetch);
    reporter.step(&format!("Downloading {}", target.artifact_url));
    let artifact = work_dir.join(&target.artifact_filename);
    let bytes_downloaded = artifact_fetch::fetch(deps.http, deps.fs, &target.artifact_url, &artifact)
        .with_context(|| format!("download failed ({})", target.describe()))?;
    reporter.success(&format!("Downloaded {} ({bytes_downloaded} bytes)", target.artifact_filename));

    let verified_sha256 = if options.verify_checksum {
        reporter.step("Verifying SHA-256 checksum");
        let digest = artifact_fetch::verify_checksum(
            deps.http,
            deps.fs,
            &target,
            &options.download_base_url,
            &artifact,
        )
        .with_context(|| format!("checksum verification failed ({})", target.describe()))?;
        reporter.success("Checksum verified");
        Some(digest)
    } else {
        None
    };

    let prepared = if options.replace_config {
        reporter.step(&format!("Fetching configuration from {}", options.config_source));
        let prepared = artifact_fetch::fetch_config_document(
            deps.http,
            deps.fs,
            deps.assets,
            &options.config_source,
            work_dir,
        )
        .with_context(|| format!("configuration fetch failed ({})", options.config_source))?;
        if let Some(message) = document_warning(&prepared) {
            note(reporter, &mut warnings, message);
        }
        Some(prepared)
    } else {
        None
    };

    // 4. Install
    reporter.phase(Step::Install);
    let outcome = installer::install(
        deps.runner,
        deps.fs,
        deps.unpacker,
        &target,
        layout,
        &artifact,
        work_dir,
    )
    .await
    .with_context(|| format!("installation failed ({})", target.describe()))?;
    match &outcome {
        InstallOutcome::Package { manager } => {
            reporter.success(&format!("Installed with {manager}"));
        }
        InstallOutcome::Archive { binary_path } => {
            reporter.success(&format!("Binary placed at {}", binary_path.display()));
            note(
                reporter,
                &mut warnings,
                "archive install: no service unit was created".to_string(),
            );
        }
    }

    // 5. Configure
    let config = match prepared {
        Some(prepared) => {
            reporter.phase(Step::Configure);
            // Anything still here after removal belongs to the operator.
            let existing = match &outcome {
                InstallOutcome::Package { .. } if !config_survived_removal => {
                    ExistingConfig::Packaged
                }
                _ => ExistingConfig::Preserve,
            };
            let applied =
                config_install::apply(deps.fs, deps.clock, layout, &prepared.path, existing)
                    .with_context(|| {
                        format!("configuration install failed ({})", layout.config_path.display())
                    })?;
            for message in &applied.warnings {
                reporter.warn(message);
            }
            warnings.extend(applied.warnings.iter().cloned());
            reporter.success(&format!(
                "Configuration installed at {}",
                applied.installed_path.display()
            ));
            Some(applied)
        }
        None => None,
    };

    // 6. Service
    let service_started = if options.start_service {
        reporter.phase(Step::Service);
        let started = start_service(deps.runner, deps.fs, layout, reporter).await;
        match &started {
            Ok(()) => reporter.success(&format!("{} enabled and started", service_unit_name())),
            Err(message) => note(reporter, &mut warnings, message.clone()),
        }
        Some(started.is_ok())
    } else {
        None
    };

    Ok(InstallSummary {
        target,
        removal,
        bytes_downloaded,
        verified_sha256,
        outcome,
        config,
        service_started,
        warnings,
    })
}

/// Run only the remover.
pub async fn run_uninstall(
    runner: &impl CommandRunner,
    fs: &impl FileSystem,
    clock: &impl Clock,
    layout: &InstallLayout,
    reporter: &impl ProgressReporter,
) -> RemovalReport {
    reporter.phase(Step::Remove);
    let report = removal::remove_existing(runner, fs, clock, layout, reporter).await;
    if report.found_nothing() {
        reporter.success("No installation found");
    } else {
        reporter.success("Installation removed");
    }
    report
}

fn note(reporter: &impl ProgressReporter, warnings: &mut Vec<String>, message: String) {
    reporter.warn(&message);
    warnings.push(message);
}

fn document_warning(prepared: &PreparedConfig) -> Option<String> {
    match &prepared.check {
        DocumentCheck::Ok => None,
        DocumentCheck::Empty => {
            Some("configuration document is empty; installing it anyway".to_string())
        }
        DocumentCheck::MissingSections(missing) => Some(format!(
            "configuration document lacks {} (expected {}); installing it anyway",
            missing.join(", "),
            REQUIRED_SECTIONS.join(", ")
        )),
    }
}

async fn start_service(
    runner: &impl CommandRunner,
    fs: &impl FileSystem,
    layout: &InstallLayout,
    reporter: &impl ProgressReporter,
) -> std::result::Result<(), String> {
    let unit = service_unit_name();
    if !layout.unit_paths.iter().any(|p| fs.exists(p)) {
        return Err(format!(
            "cannot start {unit}: no unit file exists (archive installs do not create one)"
        ));
    }
    reporter.step(&format!("Enabling {unit}"));
    for args in [vec!["daemon-reload"], vec!["enable", "--now", unit.as_str()]] {
        log::debug!("systemctl {}", args.join(" "));
        match runner.run("systemctl", &args).await {
            Ok(out) if out.status.success() => {}
            Ok(out) => {
                return Err(format!(
                    "systemctl {} failed: {}",
                    args.join(" "),
                    String::from_utf8_lossy(&out.stderr).trim()
                ));
            }
            Err(e) => return Err(format!("systemctl {} failed: {e:#}", args.join(" "))),
        }
    }
    Ok(())
}
