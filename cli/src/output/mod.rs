//! Terminal presentation: reporters, spinners and the final summary

pub mod human;
pub mod progress;
pub mod reporter;
pub mod styles;

use console::Term;
use owo_colors::OwoColorize as _;
pub use human::HumanRenderer;
pub use reporter::{BasicReporter, InteractiveReporter};
pub use styles::Styles;

/// Width of the key column in summary lines.
const KEY_WIDTH: usize = 14;

/// Palette and terminal state shared by every reporter and renderer.
pub struct OutputContext {
    pub styles: Styles,
    /// stdout is attached to a terminal.
    pub is_tty: bool,
    /// Only warnings and the final error are printed.
    pub quiet: bool,
}

impl OutputContext {
    /// Colors need a terminal, no `--no-color`, and no `NO_COLOR` in the environment.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let styles = if !no_color && is_tty && std::env::var_os("NO_COLOR").is_none() {
            Styles::colored()
        } else {
            Styles::default()
        };
        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Spinners run only on an interactive, non-quiet terminal.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    /// `  ✓ msg`
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "✓".style(self.styles.success));
        }
    }

    /// `  ⚠ msg` on stderr, printed even when quiet.
    pub fn warn(&self, msg: &str) {
        eprintln!("  {} {msg}", "⚠".style(self.styles.warning));
    }

    /// `  ℹ msg`
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "ℹ".style(self.styles.info));
        }
    }

    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg.style(self.styles.header));
        }
    }

    /// Summary line with the key padded and dimmed.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {} {value}", format!("{key:<KEY_WIDTH$}").style(self.styles.dim));
        }
    }
}
