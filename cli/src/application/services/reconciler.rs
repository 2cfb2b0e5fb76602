//! Application service: configuration reconciliation.
//!
//! The only place that renames the working directory or the binary.
//! Renames are serialized: directory first, then binary.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::application::ports::{PrivilegedExecutor, ProgressReporter};
use crate::application::services::{probe, process, resolver};
use crate::domain::agent::{BinaryName, Port, ProcessStatus};
use crate::domain::command::PrivilegedOp;
use crate::domain::config::AdirfConfig;
use crate::domain::error::AgentError;
use crate::domain::session::Session;

/// A single change made by [`apply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum ApplyChange {
    DirectoryCreated { path: String },
    DirectoryRenamed { from: String, to: String },
    BinaryRenamed { from: String, to: String },
    /// The binary to rename was not there; the name was left unchanged.
    BinaryMissing { path: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyOutcome {
    pub changes: Vec<ApplyChange>,
}

impl ApplyOutcome {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Desired `(port, name)` for [`apply`]: the values given, or both
/// configured defaults when neither was given.
///
/// # Errors
///
/// Returns an error if a configured default is invalid.
pub fn requested(
    config: &AdirfConfig,
    port: Option<&Port>,
    name: Option<&BinaryName>,
) -> Result<(Option<Port>, Option<BinaryName>)> {
    if port.is_none() && name.is_none() {
        return Ok((Some(config.default_port()?), Some(config.default_name()?)));
    }
    Ok((port.cloned(), name.cloned()))
}

/// Bring the working directory and binary name in line with the desired
/// configuration. `None` keeps the current value.
///
/// # Errors
///
/// Returns [`AgentError::PreconditionFailure`] while the agent runs (no
/// path is touched), [`AgentError::ProbeFailure`] if the process table
/// cannot be read, and [`AgentError::RenameFailure`] if the directory move
/// or the binary move fails.
pub async fn apply(
    exec: &impl PrivilegedExecutor,
    reporter: &impl ProgressReporter,
    session: &mut Session,
    config: &AdirfConfig,
    desired_port: Option<&Port>,
    desired_name: Option<&BinaryName>,
) -> Result<ApplyOutcome> {
    let default_name = config.default_name()?;
    let mut outcome = ApplyOutcome::default();

    let Some(current_dir) = session.working_dir().cloned() else {
        let port = match desired_port {
            Some(p) => p.clone(),
            None => config.default_port()?,
        };
        let name = desired_name.unwrap_or(&default_name);
        let dir = resolver::create_or_reuse(exec, session, &port, name).await?;
        reporter.success(&format!("Created {}", dir.path()));
        outcome.changes.push(ApplyChange::DirectoryCreated {
            path: dir.path().to_string(),
        });
        return Ok(outcome);
    };
    let current_name = session.binary_name().unwrap_or(&default_name).clone();

    match process::status(exec, &current_dir.binary(&current_name)).await {
        ProcessStatus::Stopped => {}
        ProcessStatus::Running => return Err(AgentError::running("reconfigure").into()),
        ProcessStatus::Unknown => {
            return Err(AgentError::ProbeFailure("cannot read the process table".to_string()).into());
        }
    }

    if let Some(port) = desired_port {
        let dir = resolver::rename(exec, session, port, &default_name).await?;
        if dir.path() != current_dir.path() {
            reporter.success(&format!("Moved {} to {}", current_dir.path(), dir.path()));
            outcome.changes.push(ApplyChange::DirectoryRenamed {
                from: current_dir.path().to_string(),
                to: dir.path().to_string(),
            });
        }
    }

    if let Some(name) = desired_name.filter(|n| **n != current_name) {
        let dir = session.working_dir().cloned().unwrap_or(current_dir);
        let from = dir.binary(&current_name).path();
        let to = dir.binary(name).path();

        if !probe::exists(exec, &from).await? {
            tracing::warn!(path = %from, "binary to rename not found");
            reporter.warn(&format!("{from} not found; binary name left as {current_name}"));
            outcome.changes.push(ApplyChange::BinaryMissing { path: from });
            return Ok(outcome);
        }

        exec.execute(&PrivilegedOp::Move {
            from: from.clone(),
            to: to.clone(),
        })
        .await
        .map_err(|e| AgentError::RenameFailure {
            from: from.clone(),
            to: to.clone(),
            reason: format!("{e:#}"),
        })?;
        session.set_binary_name(name.clone());
        exec.execute(&PrivilegedOp::MarkExecutable { path: to.clone() })
            .await
            .with_context(|| format!("marking {to} executable"))?;

        tracing::info!(from = %from, to = %to, "renamed agent binary");
        reporter.success(&format!("Renamed {current_name} to {name}"));
        outcome.changes.push(ApplyChange::BinaryRenamed { from, to });
    }

    Ok(outcome)
}
