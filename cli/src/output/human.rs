//! Human-readable terminal renderer for installation results.

use crate::application::services::install_flow::InstallSummary;
use crate::application::services::installer::InstallOutcome;
use crate::application::services::removal::RemovalReport;
use crate::domain::layout::service_unit_name;
use crate::domain::InstallLayout;
use crate::output::OutputContext;

/// Renders service results as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the closing summary of a successful install.
    pub fn render_install_summary(&self, summary: &InstallSummary, layout: &InstallLayout) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.header("Installation complete");
        self.ctx.kv("Version:", &summary.target.artifact_version);
        self.ctx.kv(
            "Platform:",
            &format!("{} ({})", summary.target.os_family, summary.target.architecture),
        );
        self.ctx.kv("Strategy:", &summary.target.package_strategy.to_string());
        self.ctx.kv("Artifact:", &summary.target.artifact_filename);
        if let Some(digest) = &summary.verified_sha256 {
            self.ctx.kv("SHA-256:", digest);
        }
        self.ctx.kv("Binary:", &layout.binary_path.display().to_string());

        match &summary.config {
            Some(applied) => {
                self.ctx
                    .kv("Config:", &applied.installed_path.display().to_string());
                if let Some(backup) = &applied.backup {
                    self.ctx.kv("Backup:", &backup.display().to_string());
                }
                if applied.replaced_packaged_default {
                    self.ctx.kv("Replaced:", "packaged default");
                }
            }
            None if matches!(summary.outcome, InstallOutcome::Package { .. }) => {
                self.ctx.kv("Config:", "packaged default");
            }
            None => self.ctx.kv("Config:", "none"),
        }
        if let Some(backup) = &summary.removal.config_backup {
            self.ctx
                .kv("Prior config:", &backup.display().to_string());
        }

        if !summary.warnings.is_empty() {
            println!();
            self.ctx
                .warn(&format!("{} warning(s) during installation", summary.warnings.len()));
        }

        println!();
        self.render_next_steps(summary);
    }

    fn render_next_steps(&self, summary: &InstallSummary) {
        let unit = service_unit_name();
        match (&summary.outcome, summary.service_started) {
            (_, Some(true)) => self.ctx.info(&format!("Check it: systemctl status {unit}")),
            (InstallOutcome::Package { .. }, _) => {
                self.ctx.info(&format!("Start it: systemctl enable --now {unit}"));
            }
            (InstallOutcome::Archive { binary_path }, _) => self.ctx.info(&format!(
                "Run it: {} --config <file>  (no service unit is installed)",
                binary_path.display()
            )),
        }
    }

    /// Render the outcome of `--uninstall`.
    pub fn render_removal_report(&self, report: &RemovalReport) {
        if self.ctx.quiet {
            return;
        }
        println!();
        if report.found_nothing() {
            self.ctx.info("Nothing to remove");
            return;
        }
        self.ctx.header("Removal complete");
        if report.service_registered {
            self.ctx.kv(
                "Service:",
                &format!(
                    "{}stopped, {}disabled",
                    if report.service_stopped { "" } else { "not " },
                    if report.service_disabled { "" } else { "not " }
                ),
            );
        }
        for manager in &report.packages_removed {
            self.ctx.kv("Package:", &format!("purged with {manager}"));
        }
        for path in &report.paths_removed {
            self.ctx.kv("Removed:", &path.display().to_string());
        }
        if let Some(backup) = &report.config_backup {
            self.ctx.kv("Backup:", &backup.display().to_string());
        }
        if report.config_kept {
            self.ctx
                .warn("Configuration kept in place because it could not be backed up");
        }
        if !report.warnings.is_empty() {
            self.ctx
                .warn(&format!("{} warning(s) during removal", report.warnings.len()));
        }
    }
}
