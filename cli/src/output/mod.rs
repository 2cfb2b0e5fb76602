//! Presentation: terminal and JSON rendering of command results.

pub mod context;
pub mod human;
pub mod json;
pub mod progress;
pub mod reporter;
pub mod styles;

use std::path::Path;

use anyhow::Result;

pub use context::OutputContext;
pub use human::HumanRenderer;
pub use reporter::TerminalReporter;
pub use styles::Styles;

use crate::application::services::installer::InstallOutcome;
use crate::application::services::reconciler::ApplyOutcome;
use crate::application::services::report::AgentReport;
use crate::domain::agent::{AgentBinary, ProcessStatus};
use crate::domain::config::AdirfConfig;

/// Marker for `--json` output.
pub struct JsonRenderer;

/// Presentation of command results, human or JSON.
pub enum Renderer<'a> {
    Human(HumanRenderer<'a>),
    Json(JsonRenderer),
}

impl Renderer<'_> {
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_report(&self, report: &AgentReport) -> Result<()> {
        match self {
            Self::Human(h) => {
                h.render_report(report);
                Ok(())
            }
            Self::Json(_) => json::print(report),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_install(&self, binary: &AgentBinary, outcome: &InstallOutcome) -> Result<()> {
        match self {
            Self::Human(h) => {
                h.render_install(binary, outcome);
                Ok(())
            }
            Self::Json(_) => {
                let (result, version) = match outcome {
                    InstallOutcome::AlreadyInstalled => ("already_installed", None),
                    InstallOutcome::PromotedFromStaging => ("promoted_from_staging", None),
                    InstallOutcome::Renamed { .. } => ("renamed", None),
                    InstallOutcome::Downloaded { version } => ("downloaded", Some(version)),
                };
                json::print(&serde_json::json!({
                    "result": result,
                    "binary": binary.path(),
                    "version": version,
                }))
            }
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_update(&self, binary: &AgentBinary, version: &str) -> Result<()> {
        match self {
            Self::Human(h) => {
                h.render_update(binary, version);
                Ok(())
            }
            Self::Json(_) => json::print(&serde_json::json!({
                "result": "updated",
                "binary": binary.path(),
                "version": version,
            })),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_status_change(&self, status: ProcessStatus) -> Result<()> {
        match self {
            Self::Human(h) => {
                h.render_status_change(status);
                Ok(())
            }
            Self::Json(_) => json::print(&serde_json::json!({ "status": status })),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_apply(&self, outcome: &ApplyOutcome) -> Result<()> {
        match self {
            Self::Human(h) => {
                h.render_apply(outcome);
                Ok(())
            }
            Self::Json(_) => json::print(outcome),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_config(&self, config: &AdirfConfig, path: &Path) -> Result<()> {
        match self {
            Self::Human(h) => {
                h.render_config(config, path);
                Ok(())
            }
            Self::Json(_) => json::print(&serde_json::json!({
                "path": path.display().to_string(),
                "config": config,
            })),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_config_set(&self, key: &str, value: &str) -> Result<()> {
        match self {
            Self::Human(h) => {
                h.render_config_set(key, value);
                Ok(())
            }
            Self::Json(_) => json::print(&serde_json::json!({
                "key": key,
                "value": value,
            })),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        match self {
            Self::Human(h) => {
                h.render_version(version);
                Ok(())
            }
            Self::Json(_) => json::print(&serde_json::json!({ "version": version })),
        }
    }
}
