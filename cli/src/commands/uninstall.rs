//! `--uninstall`: remove an existing installation.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::install_flow;
use crate::domain::Mode;
use crate::output::{BasicReporter, InteractiveReporter};

/// Run the remover and print what it did.
///
/// # Errors
///
/// Never fails today; removal problems are reported as warnings.
pub async fn run(app: &AppContext, mode: Mode) -> Result<()> {
    let report = match mode {
        Mode::Interactive => {
            let reporter = InteractiveReporter::new(&app.output);
            install_flow::run_uninstall(&app.runner, &app.fs, &app.clock, &app.layout, &reporter)
                .await
        }
        Mode::Basic => {
            let reporter = BasicReporter::new(&app.output);
            install_flow::run_uninstall(&app.runner, &app.fs, &app.clock, &app.layout, &reporter)
                .await
        }
    };
    app.renderer().render_removal_report(&report);
    Ok(())
}
