//! Default action: install the collector.

use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::application::ports::ProgressReporter;
use crate::application::services::install_flow::{self, InstallSummary};
use crate::domain::{Mode, RunOptions};
use crate::output::{BasicReporter, InteractiveReporter};

/// Run the installation and print the summary.
///
/// Downloads land in a private temporary directory that is removed when
/// this function returns, on success and failure alike.
///
/// # Errors
///
/// Returns an error if the work directory cannot be created or any fatal
/// installation phase fails.
pub async fn run(app: &AppContext, options: &RunOptions) -> Result<()> {
    let work_dir = tempfile::Builder::new()
        .prefix("otelcol-installer-")
        .tempdir()
        .context("creating work directory")?;
    log::debug!("work directory: {}", work_dir.path().display());

    let summary = match options.mode {
        Mode::Interactive => {
            install_with(app, options, work_dir.path(), &InteractiveReporter::new(&app.output))
                .await?
        }
        Mode::Basic => {
            install_with(app, options, work_dir.path(), &BasicReporter::new(&app.output)).await?
        }
    };

    app.renderer().render_install_summary(&summary, &app.layout);
    Ok(())
}

async fn install_with(
    app: &AppContext,
    options: &RunOptions,
    work_dir: &std::path::Path,
    reporter: &impl ProgressReporter,
) -> Result<InstallSummary> {
    install_flow::run_install(&app.deps(), &app.layout, options, work_dir, reporter).await
}
