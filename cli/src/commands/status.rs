//! `adirf status`: show where the agent lives and whether it runs.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::report;
use crate::output::progress;

/// Arguments for the status command.
#[derive(Args, Default)]
pub struct StatusArgs {
    /// Do not query the release feed for the latest version
    #[arg(long)]
    pub offline: bool,
}

/// Run `adirf status`.
///
/// # Errors
///
/// Returns an error if the device cannot be queried.
pub async fn run(args: &StatusArgs, app: &AppContext) -> Result<()> {
    let mut session = app.session();
    let spinner = progress::maybe_spinner(
        app.output.show_progress() && !app.is_json(),
        "Querying device...",
    );
    let collected = report::collect(
        &app.executor,
        &app.feed,
        &mut session,
        &app.config,
        !args.offline,
    )
    .await;
    spinner.finish_and_clear();
    app.renderer().render_report(&collected?)
}
