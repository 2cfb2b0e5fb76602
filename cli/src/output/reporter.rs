//! `TerminalReporter`: presentation-layer implementation of `ProgressReporter`.
//!
//! Lets application services emit progress lines without depending on any
//! presentation type. In JSON mode everything goes to stderr so stdout
//! stays machine-readable.

use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::OutputContext;

/// Prints `→` steps, `✓` successes and `!` warnings; warnings ignore
/// `--quiet`.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    to_stderr: bool,
}

impl<'a> TerminalReporter<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            to_stderr: false,
        }
    }

    /// Reporter that writes to stderr, for `--json` runs.
    #[must_use]
    pub fn stderr(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            to_stderr: true,
        }
    }

    fn emit(&self, line: &str) {
        if self.to_stderr {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if !self.ctx.quiet {
            self.emit(&format!("  {} {message}", "→".style(self.ctx.styles.step)));
        }
    }

    fn success(&self, message: &str) {
        if !self.ctx.quiet {
            self.emit(&format!("  {} {message}", "✓".style(self.ctx.styles.success)));
        }
    }

    fn warn(&self, message: &str) {
        self.emit(&format!("  {} {message}", "!".style(self.ctx.styles.warning)));
    }
}
