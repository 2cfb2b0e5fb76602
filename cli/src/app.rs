//! Per-invocation state handed to every command.
//!
//! Built once from the global flags: output settings, the configuration
//! file and the production adapters for the device and the release feed.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::config::AdirfConfig;
use crate::domain::session::Session;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::YamlConfigStore;
use crate::infra::release::GithubReleaseFeed;
use crate::infra::su::SuExecutor;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer, TerminalReporter};

/// Environment variables that imply `--yes`.
const NON_INTERACTIVE_ENV: [&str; 2] = ["CI", "ADIRF_YES"];

/// Any non-empty value disables colour, like `--no-color`.
const NO_COLOR_ENV: &str = "NO_COLOR";

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    /// One JSON object on stdout; progress goes to stderr.
    Json,
}

/// `--no-color`, `--quiet` and `--json`.
pub struct OutputFlags {
    pub no_color: bool,
    pub quiet: bool,
    pub json: bool,
}

/// `--yes`.
pub struct BehaviourFlags {
    pub yes: bool,
}

/// Global flags as parsed by clap.
pub struct AppFlags {
    pub output: OutputFlags,
    pub behaviour: BehaviourFlags,
}

pub struct AppContext {
    pub output: OutputContext,
    pub mode: OutputMode,
    pub config_store: YamlConfigStore,
    pub config: AdirfConfig,
    /// Superuser shell on the device.
    pub executor: SuExecutor<TokioCommandRunner>,
    pub feed: GithubReleaseFeed,
    /// Prompts answer with their default instead of asking.
    pub non_interactive: bool,
}

impl AppContext {
    /// # Errors
    ///
    /// Returns an error if an existing configuration file cannot be read
    /// or parsed.
    pub fn new(flags: &AppFlags) -> Result<Self> {
        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        let no_color = flags.output.no_color
            || std::env::var_os(NO_COLOR_ENV).is_some_and(|v| !v.is_empty());
        let non_interactive = flags.behaviour.yes
            || NON_INTERACTIVE_ENV
                .iter()
                .any(|var| std::env::var_os(var).is_some());

        let config_store = YamlConfigStore::default();
        let config = config_store.load()?;
        tracing::debug!(path = ?config_store.path().ok(), "configuration loaded");

        let executor = SuExecutor::new(TokioCommandRunner::new(config.command_timeout()), &config);
        let feed = GithubReleaseFeed::new(&config);

        Ok(Self {
            output: OutputContext::new(no_color, flags.output.quiet),
            mode,
            config_store,
            config,
            executor,
            feed,
            non_interactive,
        })
    }

    #[must_use]
    pub fn is_json(&self) -> bool {
        matches!(self.mode, OutputMode::Json)
    }

    /// Renderer for final command results.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        if self.is_json() {
            Renderer::Json(JsonRenderer)
        } else {
            Renderer::Human(HumanRenderer::new(&self.output))
        }
    }

    /// Progress sink for services; stderr in JSON mode so stdout stays parseable.
    #[must_use]
    pub fn terminal_reporter(&self) -> TerminalReporter<'_> {
        if self.is_json() {
            TerminalReporter::stderr(&self.output)
        } else {
            TerminalReporter::new(&self.output)
        }
    }

    /// Empty session rooted at `paths.base_dir`.
    #[must_use]
    pub fn session(&self) -> Session {
        Session::new(self.config.paths.base_dir.clone())
    }

    /// Yes/no prompt on the terminal, or `default` when non-interactive.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be shown, e.g. without a TTY.
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.non_interactive {
            tracing::debug!(prompt, default, "non-interactive, using default answer");
            return Ok(default);
        }
        Ok(dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }
}
