//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

use crate::domain::agent::ProcessStatus;

// ── Agent lifecycle errors ───────────────────────────────────────────────────

/// Failures of the agent lifecycle operations.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Privileged command channel failed: {0}")]
    ProbeFailure(String),

    #[error("Could not determine the latest agent release. Check network access and retry.")]
    MetadataFetchFailure,

    #[error("Agent download failed for {path}: {reason}")]
    DownloadFailure { path: String, reason: String },

    #[error("Cannot rename {from} to {to}: {reason}")]
    RenameFailure {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Failed to start {binary}: {reason}")]
    StartFailure { binary: String, reason: String },

    #[error("{0}")]
    PreconditionFailure(String),

    #[error("Agent did not become {expected} within {waited_ms} ms.")]
    Timeout {
        expected: ProcessStatus,
        waited_ms: u64,
    },

    #[error("No working directory resolved. Run 'adirf install' first.")]
    NotInstalled,
}

impl AgentError {
    /// Stable machine-readable code used by `--json` error output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ProbeFailure(_) => "PROBE_FAILURE",
            Self::MetadataFetchFailure => "METADATA_FETCH_FAILURE",
            Self::DownloadFailure { .. } => "DOWNLOAD_FAILURE",
            Self::RenameFailure { .. } => "RENAME_FAILURE",
            Self::StartFailure { .. } => "START_FAILURE",
            Self::PreconditionFailure(_) => "PRECONDITION_FAILURE",
            Self::Timeout { .. } => "TIMEOUT",
            Self::NotInstalled => "NOT_INSTALLED",
        }
    }

    /// Reconfiguration attempted while the agent runs.
    #[must_use]
    pub fn running(action: &str) -> Self {
        Self::PreconditionFailure(format!(
            "Cannot {action} while the agent is running. Stop it first: adirf stop"
        ))
    }
}

// ── Input validation errors ──────────────────────────────────────────────────

/// Rejected user input.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid port '{0}': must be a number between 1 and 65535")]
    InvalidPort(String),

    #[error("Invalid binary name '{0}': must be a single file name without '/'")]
    InvalidName(String),
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\nValid values: {valid}")]
    InvalidValue {
        key: String,
        value: String,
        valid: String,
    },
}
