//! Application service: working directory resolution.
//!
//! Discovers the canonical `<base>/adirf<port>` directory, creates it on
//! demand and moves it when the port changes. The session is updated only
//! after the device change succeeded.

use anyhow::{Context, Result};

use crate::application::ports::PrivilegedExecutor;
use crate::application::services::probe;
use crate::domain::agent::{BinaryName, Port, WorkingDirectory, select_working_dir};
use crate::domain::command::PrivilegedOp;
use crate::domain::config::AdirfConfig;
use crate::domain::error::AgentError;
use crate::domain::session::Session;

/// Find the canonical working directory under the session's base directory.
///
/// The lexicographically smallest `adirf<port>` entry wins; other matches
/// are logged and left alone. The first entry inside it becomes the binary
/// name, `default_name` when the directory is empty.
///
/// # Errors
///
/// Returns [`AgentError::ProbeFailure`] if a listing fails.
pub async fn discover(
    exec: &impl PrivilegedExecutor,
    session: &mut Session,
    default_name: &BinaryName,
) -> Result<Option<WorkingDirectory>> {
    let entries = probe::list_directory(exec, session.base_dir()).await?;
    let Some(selection) = select_working_dir(session.base_dir(), &entries) else {
        tracing::debug!(base = session.base_dir(), "no working directory found");
        return Ok(None);
    };
    for ignored in &selection.ignored {
        tracing::warn!(entry = %ignored, chosen = %selection.chosen.name(), "ignoring extra working directory");
    }

    let dir = selection.chosen;
    let name = probe::list_directory(exec, dir.path())
        .await?
        .iter()
        .find_map(|entry| BinaryName::parse(entry).ok())
        .unwrap_or_else(|| default_name.clone());

    tracing::info!(dir = dir.path(), binary = %name, "discovered working directory");
    session.set_current(dir.clone(), name);
    Ok(Some(dir))
}

/// Create (or reuse) the working directory for `port` and make it current.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub async fn create_or_reuse(
    exec: &impl PrivilegedExecutor,
    session: &mut Session,
    port: &Port,
    name: &BinaryName,
) -> Result<WorkingDirectory> {
    let dir = WorkingDirectory::for_port(session.base_dir(), port);
    exec.execute(&PrivilegedOp::MakeDir {
        path: dir.path().to_string(),
    })
    .await
    .with_context(|| format!("creating working directory {}", dir.path()))?;

    tracing::info!(dir = dir.path(), binary = %name, "working directory ready");
    session.set_current(dir.clone(), name.clone());
    Ok(dir)
}

/// Move the current working directory so that it matches `new_port`.
///
/// Without a current directory this creates one instead. Renaming to the
/// same path is a no-op.
///
/// # Errors
///
/// Returns [`AgentError::RenameFailure`] if the target already exists or
/// the move fails; the session keeps the old directory in that case.
pub async fn rename(
    exec: &impl PrivilegedExecutor,
    session: &mut Session,
    new_port: &Port,
    default_name: &BinaryName,
) -> Result<WorkingDirectory> {
    let Some(old) = session.working_dir().cloned() else {
        let name = session.binary_name().unwrap_or(default_name).clone();
        return create_or_reuse(exec, session, new_port, &name).await;
    };

    let new = WorkingDirectory::for_port(session.base_dir(), new_port);
    if new.path() == old.path() {
        return Ok(old);
    }

    let failure = |reason: String| AgentError::RenameFailure {
        from: old.path().to_string(),
        to: new.path().to_string(),
        reason,
    };

    if probe::dir_exists(exec, new.path()).await? {
        return Err(failure("target directory already exists".to_string()).into());
    }

    exec.execute(&PrivilegedOp::Move {
        from: old.path().to_string(),
        to: new.path().to_string(),
    })
    .await
    .map_err(|e| failure(format!("{e:#}")))?;

    tracing::info!(from = old.path(), to = new.path(), "renamed working directory");
    session.set_working_dir(new.clone());
    Ok(new)
}

/// Discover the working directory, creating the default one when none exists.
///
/// # Errors
///
/// Returns an error if discovery or creation fails, or the configured
/// defaults are invalid.
pub async fn resolve_or_create(
    exec: &impl PrivilegedExecutor,
    session: &mut Session,
    config: &AdirfConfig,
) -> Result<WorkingDirectory> {
    let default_name = config.default_name()?;
    if let Some(dir) = discover(exec, session, &default_name).await? {
        return Ok(dir);
    }
    let port = config.default_port()?;
    create_or_reuse(exec, session, &port, &default_name).await
}
