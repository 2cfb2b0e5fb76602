//! Human-readable terminal renderer.

use std::path::Path;

use owo_colors::OwoColorize as _;

use crate::application::services::installer::InstallOutcome;
use crate::application::services::reconciler::{ApplyChange, ApplyOutcome};
use crate::application::services::report::AgentReport;
use crate::domain::agent::{AgentBinary, ProcessStatus};
use crate::domain::config::{AdirfConfig, CONFIG_ENV, VALID_CONFIG_KEYS};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version.
    pub fn render_version(&self, version: &str) {
        if !self.ctx.quiet {
            println!("adirf {version}");
        }
    }

    /// Render the agent status report.
    pub fn render_report(&self, report: &AgentReport) {
        self.ctx.kv("Port:", &report.port);
        self.ctx.kv("Binary:", &report.binary_name);
        self.ctx.kv(
            "Directory:",
            report.working_dir.as_deref().unwrap_or("(not created)"),
        );
        self.ctx.kv("Installed:", if report.installed { "yes" } else { "no" });
        self.ctx.kv(
            "Status:",
            &status_display(report.status)
                .style(self.ctx.styles.for_status(report.status))
                .to_string(),
        );
        self.ctx.kv(
            "Version:",
            report.installed_version.as_deref().unwrap_or("unknown"),
        );
        if let Some(latest) = &report.latest_version {
            self.ctx.kv("Latest:", latest);
        }

        if !report.installed {
            println!();
            self.ctx.info("Install the agent: adirf install");
        } else if report.update_available {
            println!();
            self.ctx.warn(&format!(
                "{} is available. Run: adirf update",
                report.latest_version.as_deref().unwrap_or_default()
            ));
        }
    }

    /// Render the result of `install`.
    pub fn render_install(&self, binary: &AgentBinary, outcome: &InstallOutcome) {
        match outcome {
            InstallOutcome::AlreadyInstalled => {
                self.ctx.success(&format!("Already installed: {}", binary.path()));
            }
            InstallOutcome::PromotedFromStaging => {
                self.ctx
                    .success(&format!("Installed staged binary as {}", binary.path()));
            }
            InstallOutcome::Renamed { .. } => {
                self.ctx.success(&format!("Installed as {}", binary.path()));
            }
            InstallOutcome::Downloaded { version } => {
                self.ctx
                    .success(&format!("Installed {version} as {}", binary.path()));
            }
        }
    }

    /// Render the result of `update`.
    pub fn render_update(&self, binary: &AgentBinary, version: &str) {
        self.ctx
            .success(&format!("Updated {} to {version}", binary.path()));
    }

    /// Render a confirmed process state after start/stop/toggle.
    pub fn render_status_change(&self, status: ProcessStatus) {
        match status {
            ProcessStatus::Running => self.ctx.success("Agent is running"),
            ProcessStatus::Stopped => self.ctx.success("Agent is stopped"),
            ProcessStatus::Unknown => self.ctx.warn("Agent state is unknown"),
        }
    }

    /// Render the summary of `apply`. Individual changes are reported as
    /// they happen.
    pub fn render_apply(&self, outcome: &ApplyOutcome) {
        if outcome.is_noop() {
            self.ctx.info("Configuration already applied; nothing to do.");
            return;
        }
        let missing = outcome
            .changes
            .iter()
            .any(|c| matches!(c, ApplyChange::BinaryMissing { .. }));
        if missing {
            self.ctx.warn("Configuration partially applied");
        } else {
            let n = outcome.changes.len();
            self.ctx.success(&format!(
                "Configuration applied ({n} change{})",
                if n == 1 { "" } else { "s" }
            ));
        }
    }

    /// Render a successful `config set`.
    pub fn render_config_set(&self, key: &str, value: &str) {
        self.ctx.success(&format!("Set {key} = {}", display_value(value)));
    }

    /// Render the current configuration.
    pub fn render_config(&self, config: &AdirfConfig, path: &Path) {
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        for key in VALID_CONFIG_KEYS {
            let value = config.get(key).unwrap_or_default();
            println!("  {:<32} {}", format!("{key}:"), display_value(&value));
        }
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        for var in [CONFIG_ENV, "RUST_LOG", "NO_COLOR"] {
            println!(
                "    {:<18} {}",
                format!("{var}:"),
                std::env::var(var).unwrap_or_else(|_| "(not set)".to_string())
            );
        }
        println!();
    }
}

// ── Display helpers ───────────────────────────────────────────────────────────

#[must_use]
pub fn status_display(status: ProcessStatus) -> &'static str {
    match status {
        ProcessStatus::Running => "running",
        ProcessStatus::Stopped => "stopped",
        ProcessStatus::Unknown => "unknown (process table unreadable)",
    }
}

fn display_value(value: &str) -> &str {
    if value.is_empty() { "(empty)" } else { value }
}
