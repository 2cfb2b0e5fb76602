//! Application service: agent installation.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All device I/O is routed through the privileged executor; release
//! metadata comes from the injected feed.

use anyhow::{Context, Result};

use crate::application::ports::{PrivilegedExecutor, ProgressReporter, ReleaseFeed};
use crate::application::services::{probe, process, reconciler, resolver};
use crate::domain::agent::{
    AgentBinary, BinaryName, ProcessStatus, STANDARD_BINARY_NAME, WorkingDirectory, is_valid_tag,
    join_path, release_asset_url, staged_archive_path, staged_binary_path,
};
use crate::domain::command::PrivilegedOp;
use crate::domain::config::AdirfConfig;
use crate::domain::error::AgentError;
use crate::domain::session::Session;

/// How `ensure_installed` obtained the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The binary was already in place; nothing was changed.
    AlreadyInstalled,
    /// A manually placed binary was moved in from the staging directory.
    PromotedFromStaging,
    /// The installed binary was renamed to the requested name.
    Renamed { from: BinaryName },
    /// A release was downloaded and extracted.
    Downloaded { version: String },
}

/// Make sure the managed binary exists in the current working directory.
///
/// Resolves (or creates) the working directory first when the session has
/// none. Then, in order: reuse an existing binary, promote a staged one,
/// or download the latest release. A binary already installed under another
/// name is renamed through the reconciler instead of being fetched again.
///
/// # Errors
///
/// Returns [`AgentError::MetadataFetchFailure`] when no release tag is
/// available, [`AgentError::DownloadFailure`] when the artifact cannot be
/// downloaded or extracted, and [`AgentError::RenameFailure`] when it cannot be moved into
/// place. The working directory is left unchanged on any of these. Renaming
/// an installed binary fails with [`AgentError::PreconditionFailure`] while
/// the agent runs.
pub async fn ensure_installed(
    exec: &impl PrivilegedExecutor,
    feed: &impl ReleaseFeed,
    reporter: &impl ProgressReporter,
    session: &mut Session,
    config: &AdirfConfig,
    desired: Option<&BinaryName>,
) -> Result<(AgentBinary, InstallOutcome)> {
    let dir = match session.working_dir() {
        Some(dir) => dir.clone(),
        None => resolver::resolve_or_create(exec, session, config).await?,
    };
    let default_name = config.default_name()?;
    let current = session.binary_name().unwrap_or(&default_name).clone();
    let name = desired.unwrap_or(&current).clone();

    let binary = dir.binary(&name);
    if probe::exists(exec, &binary.path()).await? {
        tracing::debug!(path = %binary.path(), "agent binary already installed");
        session.set_binary_name(name);
        return Ok((binary, InstallOutcome::AlreadyInstalled));
    }

    if name != current && probe::exists(exec, &dir.binary(&current).path()).await? {
        reporter.step(&format!("Found {current}, renaming it to {name}"));
        reconciler::apply(exec, reporter, session, config, None, Some(&name)).await?;
        return Ok((binary, InstallOutcome::Renamed { from: current }));
    }

    let staged = join_path(&config.paths.staging_dir, STANDARD_BINARY_NAME);
    if probe::exists(exec, &staged).await? {
        reporter.step(&format!("Found {staged}, moving it into {}", dir.path()));
        let binary = land(exec, &staged, &dir, &name).await?;
        session.set_binary_name(name);
        return Ok((binary, InstallOutcome::PromotedFromStaging));
    }

    let (binary, version) = download_and_land(exec, feed, reporter, &dir, &name, config, false).await?;
    session.set_binary_name(name);
    Ok((binary, InstallOutcome::Downloaded { version }))
}

/// Replace the installed binary with the latest release.
///
/// Always downloads, ignoring cached artifacts. The refreshed binary ends
/// up under the session's configured name.
///
/// # Errors
///
/// Returns [`AgentError::PreconditionFailure`] while the agent is running,
/// plus every error of the download path. A failure leaves the existing
/// binary in place.
pub async fn update(
    exec: &impl PrivilegedExecutor,
    feed: &impl ReleaseFeed,
    reporter: &impl ProgressReporter,
    session: &mut Session,
    config: &AdirfConfig,
) -> Result<(AgentBinary, String)> {
    let dir = match session.working_dir() {
        Some(dir) => dir.clone(),
        None => resolver::resolve_or_create(exec, session, config).await?,
    };
    let default_name = config.default_name()?;
    let name = session.binary_name().unwrap_or(&default_name).clone();

    match process::status(exec, &dir.binary(&name)).await {
        ProcessStatus::Stopped => {}
        ProcessStatus::Running => return Err(AgentError::running("update").into()),
        ProcessStatus::Unknown => {
            return Err(AgentError::ProbeFailure("cannot read the process table".to_string()).into());
        }
    }

    let (binary, version) = download_and_land(exec, feed, reporter, &dir, &name, config, true).await?;
    session.set_binary_name(name);
    Ok((binary, version))
}

/// Version reported by the installed binary, `None` if it cannot tell.
pub async fn installed_version(exec: &impl PrivilegedExecutor, binary: &AgentBinary) -> Option<String> {
    let op = PrivilegedOp::Version {
        binary: binary.path(),
    };
    match exec.execute(&op).await {
        Ok(output) => {
            let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
            (!version.is_empty()).then_some(version)
        }
        Err(e) => {
            tracing::debug!(error = %e, "version query failed");
            None
        }
    }
}

/// Latest release tag, `None` when the feed is unavailable.
pub async fn latest_version(feed: &impl ReleaseFeed) -> Option<String> {
    match feed.latest_tag().await {
        Ok(tag) => tag.filter(|t| is_valid_tag(t)),
        Err(e) => {
            tracing::warn!(error = %e, "release feed unavailable");
            None
        }
    }
}

/// Fetch the latest release into staging, then move it into `dir` as `name`.
async fn download_and_land(
    exec: &impl PrivilegedExecutor,
    feed: &impl ReleaseFeed,
    reporter: &impl ProgressReporter,
    dir: &WorkingDirectory,
    name: &BinaryName,
    config: &AdirfConfig,
    force: bool,
) -> Result<(AgentBinary, String)> {
    reporter.step("Checking latest release...");
    let tag = match feed.latest_tag().await {
        Ok(Some(tag)) if is_valid_tag(&tag) => tag,
        Ok(Some(tag)) => {
            tracing::warn!(tag = %tag, "release feed returned an unusable tag");
            return Err(AgentError::MetadataFetchFailure.into());
        }
        Ok(None) => return Err(AgentError::MetadataFetchFailure.into()),
        Err(e) => {
            tracing::warn!(error = %e, "release metadata fetch failed");
            return Err(AgentError::MetadataFetchFailure.into());
        }
    };

    let staging = &config.paths.staging_dir;
    let archive = staged_archive_path(staging, &tag);
    let extracted = staged_binary_path(staging, &tag);
    let url = release_asset_url(&config.release.owner, &config.release.repo, &tag, &config.agent.arch);

    let cached = !force && probe::non_empty(exec, &archive).await?;
    if cached {
        reporter.step(&format!("Reusing downloaded {archive}"));
    } else {
        fetch(exec, reporter, staging, &url, &archive, &tag).await?;
    }

    match extract(exec, reporter, &archive, &extracted).await {
        Ok(()) => {}
        Err(e) if cached => {
            let error = format!("{e:#}");
            tracing::warn!(error = %error, archive = %archive, "cached archive unusable");
            reporter.warn(&format!("{archive} is unusable, downloading it again"));
            fetch(exec, reporter, staging, &url, &archive, &tag).await?;
            extract(exec, reporter, &archive, &extracted).await?;
        }
        Err(e) => return Err(e),
    }

    let binary = land(exec, &extracted, dir, name).await?;
    tracing::info!(tag = %tag, path = %binary.path(), "agent binary installed");
    Ok((binary, tag))
}

/// Download the release archive into staging, overwriting any previous copy.
async fn fetch(
    exec: &impl PrivilegedExecutor,
    reporter: &impl ProgressReporter,
    staging: &str,
    url: &str,
    archive: &str,
    tag: &str,
) -> Result<()> {
    exec.execute(&PrivilegedOp::MakeDir {
        path: staging.to_string(),
    })
    .await
    .with_context(|| format!("creating staging directory {staging}"))?;

    reporter.step(&format!("Downloading {STANDARD_BINARY_NAME} {tag}..."));
    tracing::info!(url = %url, dest = %archive, "downloading agent");
    exec.execute(&PrivilegedOp::Download {
        url: url.to_string(),
        dest: archive.to_string(),
    })
    .await
    .map_err(|e| {
        let reason = format!("download command failed: {e:#}");
        e.context(AgentError::DownloadFailure {
            path: archive.to_string(),
            reason,
        })
    })?;
    Ok(())
}

/// Check and decompress the staged archive, then mark the result executable.
async fn extract(
    exec: &impl PrivilegedExecutor,
    reporter: &impl ProgressReporter,
    archive: &str,
    extracted: &str,
) -> Result<()> {
    if !probe::non_empty(exec, archive).await? {
        return Err(AgentError::DownloadFailure {
            path: archive.to_string(),
            reason: "archive is missing or empty".to_string(),
        }
        .into());
    }

    reporter.step("Extracting...");
    exec.execute(&PrivilegedOp::Decompress {
        path: archive.to_string(),
    })
    .await
    .map_err(|e| {
        let reason = format!("extraction failed: {e:#}");
        e.context(AgentError::DownloadFailure {
            path: archive.to_string(),
            reason,
        })
    })?;
    exec.execute(&PrivilegedOp::MarkExecutable {
        path: extracted.to_string(),
    })
    .await
    .with_context(|| format!("marking {extracted} executable"))?;
    Ok(())
}

/// Move a staged binary into `dir` under the standard name, then rename it
/// to `name` when that differs.
async fn land(
    exec: &impl PrivilegedExecutor,
    staged: &str,
    dir: &WorkingDirectory,
    name: &BinaryName,
) -> Result<AgentBinary> {
    let standard = dir.binary(&BinaryName::standard());
    move_executable(exec, staged, &standard.path()).await?;
    if name.is_standard() {
        return Ok(standard);
    }
    let target = dir.binary(name);
    move_executable(exec, &standard.path(), &target.path()).await?;
    Ok(target)
}

async fn move_executable(exec: &impl PrivilegedExecutor, from: &str, to: &str) -> Result<()> {
    exec.execute(&PrivilegedOp::Move {
        from: from.to_string(),
        to: to.to_string(),
    })
    .await
    .map_err(|e| AgentError::RenameFailure {
        from: from.to_string(),
        to: to.to_string(),
        reason: format!("{e:#}"),
    })?;
    exec.execute(&PrivilegedOp::MarkExecutable {
        path: to.to_string(),
    })
    .await
    .with_context(|| format!("marking {to} executable"))?;
    Ok(())
}
