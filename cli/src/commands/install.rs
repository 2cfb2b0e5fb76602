//! `adirf install`: make sure the agent binary is in place.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::installer;
use crate::domain::agent::BinaryName;

/// Arguments for the install command.
#[derive(Args, Default)]
pub struct InstallArgs {
    /// Name to install the binary under (default: the configured name)
    #[arg(long)]
    pub name: Option<BinaryName>,
}

/// Run `adirf install`.
///
/// # Errors
///
/// Returns an error if no release can be fetched, the download is empty,
/// or the binary cannot be moved into place.
pub async fn run(args: &InstallArgs, app: &AppContext) -> Result<()> {
    let mut session = app.session();
    let reporter = app.terminal_reporter();

    let (binary, outcome) = installer::ensure_installed(
        &app.executor,
        &app.feed,
        &reporter,
        &mut session,
        &app.config,
        args.name.as_ref(),
    )
    .await?;

    app.renderer().render_install(&binary, &outcome)
}
