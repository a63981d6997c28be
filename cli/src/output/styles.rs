//! Installer palette built on the owo-colors stylesheet pattern

use owo_colors::Style;

/// Styles for every kind of line the installer prints.
///
/// `Default` is the plain palette: each style renders text unchanged.
#[derive(Default, Clone, Copy)]
pub struct Styles {
    /// `✓` marks and the final summary header.
    pub success: Style,
    pub warning: Style,
    /// `✗` marks on a phase that never completed.
    pub error: Style,
    pub info: Style,
    /// Summary keys.
    pub dim: Style,
    pub bold: Style,
    /// Phase headers.
    pub header: Style,
}

impl Styles {
    /// Palette used on a color-capable terminal.
    #[must_use]
    pub fn colored() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            info: Style::new().blue(),
            dim: Style::new().dimmed(),
            bold: Style::new().bold(),
            header: Style::new().bold().cyan(),
        }
    }
}
