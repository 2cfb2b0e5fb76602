//! `adirf start`: launch the agent and wait until it shows up.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::ProgressReporter;
use crate::application::services::process::{self, PollSettings};
use crate::commands::installed_binary;
use crate::domain::agent::ProcessStatus;
use crate::domain::error::AgentError;

/// Run `adirf start`.
///
/// # Errors
///
/// Returns an error if the agent is not installed, fails to launch, or
/// does not appear in the process table in time.
pub async fn run(app: &AppContext) -> Result<()> {
    let mut session = app.session();
    let binary = installed_binary(app, &mut session).await?;
    let port = session
        .working_dir()
        .map(|d| d.port().clone())
        .ok_or(AgentError::NotInstalled)?;

    let reporter = app.terminal_reporter();
    match process::status(&app.executor, &binary).await {
        ProcessStatus::Running => {
            reporter.step("Agent is already running");
        }
        ProcessStatus::Unknown => {
            return Err(AgentError::ProbeFailure("cannot read the process table".to_string()).into());
        }
        ProcessStatus::Stopped => {
            reporter.step(&format!("Starting {} on port {port}...", binary.name()));
            process::start(&app.executor, &binary, &port).await?;
            process::wait_for(
                &app.executor,
                &binary,
                ProcessStatus::Running,
                PollSettings::from_config(&app.config),
            )
            .await?;
        }
    }

    app.renderer().render_status_change(ProcessStatus::Running)
}
