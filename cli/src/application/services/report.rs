//! Application service: agent status report.
//!
//! Read-only: discovers the working directory but never creates it.

use anyhow::Result;
use serde::Serialize;

use crate::application::ports::{PrivilegedExecutor, ReleaseFeed};
use crate::application::services::{installer, probe, process, resolver};
use crate::domain::agent::{ProcessStatus, WorkingDirectory};
use crate::domain::config::AdirfConfig;
use crate::domain::session::Session;

/// Everything `adirf status` shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentReport {
    pub port: String,
    pub binary_name: String,
    /// `None` when no working directory exists yet.
    pub working_dir: Option<String>,
    pub binary_path: Option<String>,
    pub installed: bool,
    pub status: ProcessStatus,
    pub installed_version: Option<String>,
    pub latest_version: Option<String>,
    pub update_available: bool,
}

/// Build the status report.
///
/// The release feed is only queried when `check_latest` is set; its
/// failure is reported as an absent latest version.
///
/// # Errors
///
/// Returns an error if discovery fails or the configured defaults are
/// invalid.
pub async fn collect(
    exec: &impl PrivilegedExecutor,
    feed: &impl ReleaseFeed,
    session: &mut Session,
    config: &AdirfConfig,
    check_latest: bool,
) -> Result<AgentReport> {
    let default_name = config.default_name()?;
    let discovered = match session.working_dir() {
        Some(dir) => Some(dir.clone()),
        None => resolver::discover(exec, session, &default_name).await?,
    };
    let name = session.binary_name().unwrap_or(&default_name).clone();

    let dir = match &discovered {
        Some(dir) => dir.clone(),
        None => WorkingDirectory::for_port(session.base_dir(), &config.default_port()?),
    };
    let binary = dir.binary(&name);

    let installed = discovered.is_some() && probe::exists(exec, &binary.path()).await?;
    let status = process::status(exec, &binary).await;
    let installed_version = if installed {
        installer::installed_version(exec, &binary).await
    } else {
        None
    };
    let latest_version = if check_latest {
        installer::latest_version(feed).await
    } else {
        None
    };
    let update_available = match (&installed_version, &latest_version) {
        (Some(installed), Some(latest)) => is_newer(latest, installed),
        _ => false,
    };

    Ok(AgentReport {
        port: dir.port().to_string(),
        binary_name: name.to_string(),
        working_dir: discovered.as_ref().map(|d| d.path().to_string()),
        binary_path: installed.then(|| binary.path()),
        installed,
        status,
        installed_version,
        latest_version,
        update_available,
    })
}

/// Whether release `latest` is newer than `installed`.
///
/// Both sides are compared as semver (a leading `v` is ignored). When
/// either side is not semver, any difference counts as newer.
#[must_use]
pub fn is_newer(latest: &str, installed: &str) -> bool {
    let parse = |s: &str| semver::Version::parse(s.trim().trim_start_matches('v')).ok();
    match (parse(latest), parse(installed)) {
        (Some(l), Some(i)) => l > i,
        _ => latest.trim() != installed.trim(),
    }
}
