//! `adirf apply`: move the working directory and rename the binary.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::{reconciler, resolver};
use crate::domain::agent::{BinaryName, Port};

/// Arguments for the apply command.
#[derive(Args, Default)]
pub struct ApplyArgs {
    /// Desired port (default: keep the current one)
    #[arg(long)]
    pub port: Option<Port>,

    /// Desired binary name (default: keep the current one)
    #[arg(long)]
    pub name: Option<BinaryName>,
}

/// Run `adirf apply`. Without `--port` and `--name` the configured
/// defaults are applied.
///
/// # Errors
///
/// Returns an error if the agent is running, or a rename fails.
pub async fn run(args: &ApplyArgs, app: &AppContext) -> Result<()> {
    let default_name = app.config.default_name()?;
    let (port, name) = reconciler::requested(&app.config, args.port.as_ref(), args.name.as_ref())?;

    let mut session = app.session();
    resolver::discover(&app.executor, &mut session, &default_name).await?;

    let outcome = reconciler::apply(
        &app.executor,
        &app.terminal_reporter(),
        &mut session,
        &app.config,
        port.as_ref(),
        name.as_ref(),
    )
    .await?;

    app.renderer().render_apply(&outcome)
}
