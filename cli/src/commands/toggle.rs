//! `adirf toggle`: stop a running agent, or reconcile and start a stopped one.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::process;
use crate::commands::installed_binary;
use crate::domain::agent::{BinaryName, Port};

/// Arguments for the toggle command.
#[derive(Args, Default)]
pub struct ToggleArgs {
    /// Port to listen on when starting
    #[arg(long)]
    pub port: Option<Port>,

    /// Binary name to use when starting
    #[arg(long)]
    pub name: Option<BinaryName>,
}

/// Run `adirf toggle`.
///
/// # Errors
///
/// Returns an error if the agent is not installed, reconfiguration fails,
/// or the new state is not confirmed in time.
pub async fn run(args: &ToggleArgs, app: &AppContext) -> Result<()> {
    let mut session = app.session();
    installed_binary(app, &mut session).await?;

    let status = process::toggle(
        &app.executor,
        &app.terminal_reporter(),
        &mut session,
        &app.config,
        args.port.as_ref(),
        args.name.as_ref(),
    )
    .await?;

    app.renderer().render_status_change(status)
}
