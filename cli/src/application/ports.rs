//! Ports: everything the services need from the outside world.
//!
//! Adapters live in `crate::infra` (and `crate::output` for progress);
//! tests substitute in-memory fakes.

use std::path::PathBuf;
use std::process::Output;

use anyhow::Result;

use crate::domain::command::PrivilegedOp;
use crate::domain::config::AdirfConfig;

// ── Device Ports ──────────────────────────────────────────────────────────────

/// Runs typed operations on the device with superuser rights.
#[allow(async_fn_in_trait)]
pub trait PrivilegedExecutor {
    /// Execute one operation and capture its output.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel is unavailable (no root, spawn
    /// failure, timeout) or the rendered command exits non-zero.
    async fn execute(&self, op: &PrivilegedOp) -> Result<Output>;
}

/// Source of agent release metadata.
#[allow(async_fn_in_trait)]
pub trait ReleaseFeed {
    /// Tag of the latest published release, or `None` when the feed
    /// answered without one.
    ///
    /// # Errors
    ///
    /// Returns an error if the feed is unreachable or the response is not
    /// valid metadata.
    async fn latest_tag(&self) -> Result<Option<String>>;
}

// ── Host processes ────────────────────────────────────────────────────────────

/// Spawns local programs (the `su` binary, in production).
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Like `run_with_timeout` with the runner's own deadline.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Capture stdout, stderr and exit status of `program`. A non-zero exit
    /// is not an error here.
    ///
    /// # Errors
    ///
    /// Spawn failures, and a deadline overrun (the child is killed).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: std::time::Duration,
    ) -> Result<Output>;
}

// ── Progress ──────────────────────────────────────────────────────────────────

/// Human-facing progress lines emitted while a service runs.
pub trait ProgressReporter {
    fn step(&self, message: &str);
    fn success(&self, message: &str);
    /// Shown even in quiet mode.
    fn warn(&self, message: &str);
}

// ── Configuration Port ────────────────────────────────────────────────────────

/// Loads and persists the user configuration file.
pub trait ConfigStore {
    /// Load configuration, falling back to defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load(&self) -> Result<AdirfConfig>;
    /// Persist configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn save(&self, config: &AdirfConfig) -> Result<()>;
    /// Location of the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    fn path(&self) -> Result<PathBuf>;
}
