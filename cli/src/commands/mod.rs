//! Command implementations

pub mod apply;
pub mod config;
pub mod install;
pub mod start;
pub mod status;
pub mod stop;
pub mod toggle;
pub mod update;
pub mod version;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::{probe, resolver};
use crate::domain::agent::AgentBinary;
use crate::domain::error::AgentError;
use crate::domain::session::Session;

/// Discover the working directory and require an installed binary in it.
///
/// # Errors
///
/// Returns [`AgentError::NotInstalled`] when there is no working directory
/// or no binary inside it.
pub(crate) async fn installed_binary(app: &AppContext, session: &mut Session) -> Result<AgentBinary> {
    let default_name = app.config.default_name()?;
    resolver::discover(&app.executor, session, &default_name).await?;
    let binary = session
        .binary_or(&default_name)
        .ok_or(AgentError::NotInstalled)?;
    if !probe::exists(&app.executor, &binary.path()).await? {
        return Err(AgentError::NotInstalled.into());
    }
    Ok(binary)
}
