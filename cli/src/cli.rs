//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;

/// Lifecycle manager for the frida-server agent on rooted Android devices
#[derive(Parser)]
#[command(
    name = "adirf",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output (also set by a non-empty `NO_COLOR`)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log debug details to stderr (overridden by `RUST_LOG`)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Assume yes for every prompt
    #[arg(long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show working directory, binary and process state
    Status(commands::status::StatusArgs),

    /// Install the agent binary if it is missing
    Install(commands::install::InstallArgs),

    /// Replace the agent binary with the latest release
    Update(commands::update::UpdateArgs),

    /// Start the agent
    Start,

    /// Stop the agent
    Stop,

    /// Start the agent if stopped, stop it if running
    Toggle(commands::toggle::ToggleArgs),

    /// Move the working directory and rename the binary
    Apply(commands::apply::ApplyArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            no_color,
            quiet,
            json,
            yes,
            command,
            ..
        } = self;
        let flags = AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            behaviour: BehaviourFlags { yes },
        };
        let app = AppContext::new(&flags)?;

        match command {
            Command::Status(args) => commands::status::run(&args, &app).await,
            Command::Install(args) => commands::install::run(&args, &app).await,
            Command::Update(args) => commands::update::run(&args, &app).await,
            Command::Start => commands::start::run(&app).await,
            Command::Stop => commands::stop::run(&app).await,
            Command::Toggle(args) => commands::toggle::run(&args, &app).await,
            Command::Apply(args) => commands::apply::run(&args, &app).await,
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Version => commands::version::run(&app),
        }
    }
}
