//! `adirf stop`: terminate the agent and wait until it is gone.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::ProgressReporter;
use crate::application::services::process::{self, PollSettings};
use crate::commands::installed_binary;
use crate::domain::agent::ProcessStatus;

/// Run `adirf stop`.
///
/// Stopping an agent that is not running succeeds.
///
/// # Errors
///
/// Returns an error if the agent is not installed or is still listed in
/// the process table after the poll budget.
pub async fn run(app: &AppContext) -> Result<()> {
    let mut session = app.session();
    let binary = installed_binary(app, &mut session).await?;

    app.terminal_reporter()
        .step(&format!("Stopping {}...", binary.name()));
    process::stop(&app.executor, &binary).await;
    process::wait_for(
        &app.executor,
        &binary,
        ProcessStatus::Stopped,
        PollSettings::from_config(&app.config),
    )
    .await?;

    app.renderer().render_status_change(ProcessStatus::Stopped)
}
