//! Application service: agent process control.
//!
//! Status is always derived from the live process table. Start and stop
//! only issue the command; callers confirm the transition with
//! [`wait_for`], which polls a bounded number of times.

use std::time::Duration;

use anyhow::Result;

use crate::application::ports::{PrivilegedExecutor, ProgressReporter};
use crate::application::services::reconciler;
use crate::domain::agent::{AgentBinary, BinaryName, LISTEN_HOST, Port, ProcessStatus};
use crate::domain::command::PrivilegedOp;
use crate::domain::config::AdirfConfig;
use crate::domain::error::AgentError;
use crate::domain::session::Session;

/// Timing of the settle-then-poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Pause after a start/stop before the first poll.
    pub settle: Duration,
    /// Pause between polls.
    pub interval: Duration,
    /// Number of polls before giving up.
    pub attempts: u32,
}

impl PollSettings {
    #[must_use]
    pub fn from_config(config: &AdirfConfig) -> Self {
        Self {
            settle: Duration::from_millis(config.process.settle_delay_ms),
            interval: Duration::from_millis(config.process.poll_interval_ms),
            attempts: config.process.poll_attempts.max(1),
        }
    }

    /// Longest time `wait_for` can take.
    #[must_use]
    pub fn budget(&self) -> Duration {
        self.settle + self.interval * self.attempts.saturating_sub(1)
    }
}

/// Whether the agent is running, per the process table.
///
/// `Unknown` only when the process table cannot be read.
pub async fn status(exec: &impl PrivilegedExecutor, binary: &AgentBinary) -> ProcessStatus {
    let op = PrivilegedOp::ProcessList {
        pattern: binary.name().as_str().to_string(),
    };
    match exec.execute(&op).await {
        Ok(output) if String::from_utf8_lossy(&output.stdout).trim().is_empty() => {
            ProcessStatus::Stopped
        }
        Ok(output) => {
            tracing::debug!(ps = %String::from_utf8_lossy(&output.stdout).trim(), "agent process found");
            ProcessStatus::Running
        }
        Err(e) => {
            tracing::warn!(error = %e, "cannot read process table");
            ProcessStatus::Unknown
        }
    }
}

/// Launch the agent detached, listening on all interfaces at `port`.
///
/// # Errors
///
/// Returns [`AgentError::StartFailure`] if the launch command fails.
pub async fn start(exec: &impl PrivilegedExecutor, binary: &AgentBinary, port: &Port) -> Result<()> {
    let op = PrivilegedOp::Launch {
        binary: binary.path(),
        listen: format!("{LISTEN_HOST}:{port}"),
    };
    exec.execute(&op).await.map_err(|e| AgentError::StartFailure {
        binary: binary.path(),
        reason: format!("{e:#}"),
    })?;
    tracing::info!(binary = %binary.path(), port = %port, "agent launched");
    Ok(())
}

/// Terminate every process whose command line contains the binary path.
///
/// Finding nothing to stop is not an error, and neither is a failing
/// kill command: the next status poll tells the truth.
pub async fn stop(exec: &impl PrivilegedExecutor, binary: &AgentBinary) {
    let op = PrivilegedOp::Kill {
        pattern: binary.path(),
    };
    match exec.execute(&op).await {
        Ok(_) => tracing::info!(binary = %binary.path(), "stop signal sent"),
        Err(e) => tracing::warn!(error = %e, binary = %binary.path(), "stop command failed"),
    }
}

/// Settle, then poll until `expected` is observed.
///
/// # Errors
///
/// Returns [`AgentError::Timeout`] if the last poll still disagrees.
pub async fn wait_for(
    exec: &impl PrivilegedExecutor,
    binary: &AgentBinary,
    expected: ProcessStatus,
    settings: PollSettings,
) -> Result<()> {
    tokio::time::sleep(settings.settle).await;
    let attempts = settings.attempts.max(1);
    for attempt in 1..=attempts {
        let observed = status(exec, binary).await;
        if observed == expected {
            return Ok(());
        }
        tracing::debug!(attempt, %observed, %expected, "agent not settled yet");
        if attempt < attempts {
            tokio::time::sleep(settings.interval).await;
        }
    }
    Err(AgentError::Timeout {
        expected,
        waited_ms: u64::try_from(settings.budget().as_millis()).unwrap_or(u64::MAX),
    }
    .into())
}

/// Flip the running state of the agent.
///
/// A running agent is stopped. A stopped agent is first reconciled to the
/// desired port and name, then started. Returns the confirmed new status.
/// On failure the reporter is told which state the agent remains in.
///
/// # Errors
///
/// Returns [`AgentError::NotInstalled`] without a working directory,
/// [`AgentError::ProbeFailure`] if the current state cannot be read, and
/// any error of reconciling, starting or confirming.
pub async fn toggle(
    exec: &impl PrivilegedExecutor,
    reporter: &impl ProgressReporter,
    session: &mut Session,
    config: &AdirfConfig,
    desired_port: Option<&Port>,
    desired_name: Option<&BinaryName>,
) -> Result<ProcessStatus> {
    let default_name = config.default_name()?;
    let binary = session
        .binary_or(&default_name)
        .ok_or(AgentError::NotInstalled)?;
    let settings = PollSettings::from_config(config);

    let previous = status(exec, &binary).await;
    let result: Result<ProcessStatus> = match previous {
        ProcessStatus::Unknown => {
            Err(AgentError::ProbeFailure("cannot read the process table".to_string()).into())
        }
        ProcessStatus::Running => {
            reporter.step(&format!("Stopping {}...", binary.name()));
            stop(exec, &binary).await;
            wait_for(exec, &binary, ProcessStatus::Stopped, settings)
                .await
                .map(|()| ProcessStatus::Stopped)
        }
        ProcessStatus::Stopped => {
            start_reconciled(exec, reporter, session, config, desired_port, desired_name, settings)
                .await
        }
    };

    if result.is_err() {
        reporter.warn(&format!("Agent remains {previous}"));
    }
    result
}

async fn start_reconciled(
    exec: &impl PrivilegedExecutor,
    reporter: &impl ProgressReporter,
    session: &mut Session,
    config: &AdirfConfig,
    desired_port: Option<&Port>,
    desired_name: Option<&BinaryName>,
    settings: PollSettings,
) -> Result<ProcessStatus> {
    if desired_port.is_some() || desired_name.is_some() {
        reconciler::apply(exec, reporter, session, config, desired_port, desired_name).await?;
    }
    let default_name = config.default_name()?;
    let binary = session
        .binary_or(&default_name)
        .ok_or(AgentError::NotInstalled)?;
    let port = session
        .working_dir()
        .map(|d| d.port().clone())
        .ok_or(AgentError::NotInstalled)?;

    reporter.step(&format!("Starting {} on port {port}...", binary.name()));
    start(exec, &binary, &port).await?;
    wait_for(exec, &binary, ProcessStatus::Running, settings).await?;
    Ok(ProcessStatus::Running)
}
