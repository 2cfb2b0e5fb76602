//! Application service: filesystem probe over the privileged channel.
//!
//! Every probe is a single typed operation whose output is a sentinel
//! token. Channel failures surface as [`AgentError::ProbeFailure`].

use anyhow::Result;

use crate::application::ports::PrivilegedExecutor;
use crate::domain::command::{
    EXISTS_TOKEN, FAIL_TOKEN, MISSING_TOKEN, OK_TOKEN, PrivilegedOp,
};
use crate::domain::error::AgentError;

/// Whether `path` is an existing regular file.
///
/// # Errors
///
/// Returns [`AgentError::ProbeFailure`] if the command fails or prints
/// neither sentinel.
pub async fn exists(exec: &impl PrivilegedExecutor, path: &str) -> Result<bool> {
    let op = PrivilegedOp::FileExists {
        path: path.to_string(),
    };
    sentinel(exec, &op, EXISTS_TOKEN, MISSING_TOKEN).await
}

/// Whether `path` is an existing directory.
///
/// # Errors
///
/// Returns [`AgentError::ProbeFailure`] if the command fails or prints
/// neither sentinel.
pub async fn dir_exists(exec: &impl PrivilegedExecutor, path: &str) -> Result<bool> {
    let op = PrivilegedOp::DirExists {
        path: path.to_string(),
    };
    sentinel(exec, &op, EXISTS_TOKEN, MISSING_TOKEN).await
}

/// Whether `path` exists and has a size greater than zero.
///
/// # Errors
///
/// Returns [`AgentError::ProbeFailure`] if the command fails or prints
/// neither sentinel.
pub async fn non_empty(exec: &impl PrivilegedExecutor, path: &str) -> Result<bool> {
    let op = PrivilegedOp::NonEmpty {
        path: path.to_string(),
    };
    sentinel(exec, &op, OK_TOKEN, FAIL_TOKEN).await
}

/// Entry names of `path`, in listing order.
///
/// An empty or absent directory yields an empty list.
///
/// # Errors
///
/// Returns [`AgentError::ProbeFailure`] if the command fails.
pub async fn list_directory(exec: &impl PrivilegedExecutor, path: &str) -> Result<Vec<String>> {
    let op = PrivilegedOp::ListDir {
        path: path.to_string(),
    };
    let output = exec
        .execute(&op)
        .await
        .map_err(|e| AgentError::ProbeFailure(format!("listing {path}: {e:#}")))?;
    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}

async fn sentinel(
    exec: &impl PrivilegedExecutor,
    op: &PrivilegedOp,
    yes: &str,
    no: &str,
) -> Result<bool> {
    let output = exec
        .execute(op)
        .await
        .map_err(|e| AgentError::ProbeFailure(format!("{}: {e:#}", op.kind())))?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    match stdout.lines().map(str::trim).rfind(|l| !l.is_empty()) {
        Some(token) if token == yes => Ok(true),
        Some(token) if token == no => Ok(false),
        other => Err(AgentError::ProbeFailure(format!(
            "{}: unexpected output {:?}",
            op.kind(),
            other.unwrap_or_default()
        ))
        .into()),
    }
}
