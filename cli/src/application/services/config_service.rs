//! Application service: configuration use-cases.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::config::AdirfConfig;

/// Load configuration.
///
/// # Errors
///
/// Returns an error if the stored file cannot be read or parsed.
pub fn load_config(store: &impl ConfigStore) -> Result<AdirfConfig> {
    store.load()
}

/// Save configuration.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_config(store: &impl ConfigStore, config: &AdirfConfig) -> Result<()> {
    store.save(config)
}

/// Validate and persist a single `key = value` setting.
///
/// # Errors
///
/// Returns an error if the key is unknown, the value invalid, or the
/// store fails. Nothing is written on validation errors.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<AdirfConfig> {
    let mut config = load_config(store)?;
    config.set(key, value)?;
    save_config(store, &config)?;
    tracing::info!(key, value, "configuration updated");
    Ok(config)
}
