//! Terminal stylesheet.
//!
//! Every field starts as a plain `Style`, so output is uncolored until
//! `colorize` runs (TTY without `NO_COLOR`).

use owo_colors::Style;

use crate::domain::agent::ProcessStatus;

#[derive(Default, Clone)]
pub struct Styles {
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    pub info: Style,
    /// Arrow in front of in-progress steps.
    pub step: Style,
    pub dim: Style,
    pub bold: Style,
    pub header: Style,
    /// Agent process states in `status`.
    pub running: Style,
    pub stopped: Style,
    pub unknown: Style,
}

impl Styles {
    /// Switch every field to its color.
    pub fn colorize(&mut self) {
        self.success = Style::new().green();
        self.warning = Style::new().yellow();
        self.error = Style::new().red();
        self.info = Style::new().blue();
        self.step = Style::new().cyan();
        self.dim = Style::new().dimmed();
        self.bold = Style::new().bold();
        self.header = Style::new().bold().cyan();
        self.running = Style::new().bold().green();
        self.stopped = Style::new().yellow();
        self.unknown = Style::new().red();
    }

    #[must_use]
    pub fn for_status(&self, status: ProcessStatus) -> Style {
        match status {
            ProcessStatus::Running => self.running,
            ProcessStatus::Stopped => self.stopped,
            ProcessStatus::Unknown => self.unknown,
        }
    }
}
