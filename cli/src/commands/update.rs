//! `adirf update`: replace the installed agent with the latest release.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::ProgressReporter;
use crate::application::services::installer;

/// Arguments for the update command.
#[derive(Args, Default)]
pub struct UpdateArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Run `adirf update`.
///
/// # Errors
///
/// Returns an error if the agent is running, no release is available, or
/// the download fails. The installed binary is kept on failure.
pub async fn run(args: &UpdateArgs, app: &AppContext) -> Result<()> {
    if !args.yes
        && !app.confirm("Replace the installed agent with the latest release?", true)?
    {
        app.terminal_reporter().warn("Update cancelled");
        return Ok(());
    }

    let mut session = app.session();
    let (binary, version) = installer::update(
        &app.executor,
        &app.feed,
        &app.terminal_reporter(),
        &mut session,
        &app.config,
    )
    .await?;

    app.renderer().render_update(&binary, &version)
}
