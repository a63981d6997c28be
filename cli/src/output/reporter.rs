//! Presentation-layer implementations of `ProgressReporter`.
//!
//! `InteractiveReporter` renders colored phase headers and a spinner per
//! phase. `BasicReporter` renders plain numbered lines suitable for logs.
//! Both wrap `&OutputContext` and honour `quiet`.

use std::cell::{Cell, RefCell};

use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::domain::Step;
use crate::output::{OutputContext, progress};

/// `[2/6] Removing existing installation`
#[must_use]
pub fn basic_phase_line(step: Step) -> String {
    format!("[{}/{}] {step}", step.ordinal(), Step::COUNT)
}

/// Plain-text reporter for `--mode basic`.
pub struct BasicReporter<'a> {
    ctx: &'a OutputContext,
}

impl<'a> BasicReporter<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }
}

impl ProgressReporter for BasicReporter<'_> {
    fn phase(&self, step: Step) {
        if !self.ctx.quiet {
            println!("{}", basic_phase_line(step));
        }
    }

    fn step(&self, message: &str) {
        if !self.ctx.quiet {
            println!("      {message}");
        }
    }

    fn success(&self, message: &str) {
        if !self.ctx.quiet {
            println!("      ok: {message}");
        }
    }

    fn warn(&self, message: &str) {
        eprintln!("      warning: {message}");
    }
}

/// Spinner-driven reporter for `--mode interactive`.
///
/// Falls back to arrow-prefixed lines when stdout is not a terminal. A
/// spinner still running when the reporter is dropped belongs to a phase
/// that never reported success, and is finished with an error mark.
/// Under `--quiet` only warnings are printed.
pub struct InteractiveReporter<'a> {
    ctx: &'a OutputContext,
    spinner: RefCell<Option<ProgressBar>>,
    current: Cell<Option<Step>>,
}

impl<'a> InteractiveReporter<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            spinner: RefCell::new(None),
            current: Cell::new(None),
        }
    }

    fn clear_spinner(&self) {
        if let Some(pb) = self.spinner.borrow_mut().take() {
            pb.finish_and_clear();
        }
    }
}

impl ProgressReporter for InteractiveReporter<'_> {
    fn phase(&self, step: Step) {
        self.clear_spinner();
        self.current.set(Some(step));
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.header(&format!("{} {step}", "▸".style(self.ctx.styles.bold)));
        if self.ctx.show_progress() {
            *self.spinner.borrow_mut() = Some(progress::spinner(&format!("{step}...")));
        }
    }

    fn step(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        match self.spinner.borrow().as_ref() {
            Some(pb) => pb.set_message(message.to_string()),
            None => println!("  {} {message}", "→".style(self.ctx.styles.info)),
        }
    }

    fn success(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        match self.spinner.borrow_mut().take() {
            Some(pb) => progress::finish_ok(&pb, message),
            None => self.ctx.success(message),
        }
    }

    fn warn(&self, message: &str) {
        match self.spinner.borrow().as_ref() {
            Some(pb) => pb.suspend(|| self.ctx.warn(message)),
            None => self.ctx.warn(message),
        }
    }
}

impl Drop for InteractiveReporter<'_> {
    fn drop(&mut self) {
        let Some(pb) = self.spinner.get_mut().take() else {
            return;
        };
        match self.current.get() {
            Some(step) => {
                let msg = format!("{step} did not complete");
                progress::finish_error(&pb, &msg.style(self.ctx.styles.error).to_string());
            }
            None => pb.finish_and_clear(),
        }
    }
}
