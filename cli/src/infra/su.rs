//! Infrastructure implementation of the `PrivilegedExecutor` port.
//!
//! `SuExecutor` renders each typed operation to a single shell line and
//! hands it to `su -c`. On hosts that are already root the wrapper can be
//! disabled, in which case the line runs under `sh -c`.

use std::process::Output;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, PrivilegedExecutor};
use crate::domain::command::PrivilegedOp;
use crate::domain::config::AdirfConfig;

pub struct SuExecutor<R: CommandRunner> {
    runner: R,
    su_binary: Option<String>,
    command_timeout: Duration,
    download_timeout: Duration,
}

impl<R: CommandRunner> SuExecutor<R> {
    #[must_use]
    pub fn new(runner: R, config: &AdirfConfig) -> Self {
        Self {
            runner,
            su_binary: config.su_binary().map(str::to_owned),
            command_timeout: config.command_timeout(),
            download_timeout: config.download_timeout(),
        }
    }

    /// Program and arguments that run `line` with the configured wrapper.
    fn invocation<'a>(&'a self, line: &'a str) -> (&'a str, [&'a str; 2]) {
        match &self.su_binary {
            Some(su) => (su.as_str(), ["-c", line]),
            None => ("sh", ["-c", line]),
        }
    }
}

impl<R: CommandRunner> PrivilegedExecutor for SuExecutor<R> {
    async fn execute(&self, op: &PrivilegedOp) -> Result<Output> {
        let line = op.render()?;
        let timeout = if op.is_long_running() {
            self.download_timeout
        } else {
            self.command_timeout
        };
        let (program, args) = self.invocation(&line);
        tracing::debug!(op = op.kind(), command = %line, "privileged command");

        let output = self
            .runner
            .run_with_timeout(program, &args, timeout)
            .await
            .with_context(|| format!("{} via {program}", op.kind()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "{} failed ({}): {}",
                op.kind(),
                output.status,
                stderr.trim()
            );
        }
        Ok(output)
    }
}
