//! Domain types and validators for adirf configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::agent::{BinaryName, DEFAULT_PORT, Port, STANDARD_BINARY_NAME, is_valid_tag};
use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "ADIRF_CONFIG";

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "paths.base_dir",
    "paths.staging_dir",
    "agent.default_port",
    "agent.default_name",
    "agent.arch",
    "release.owner",
    "release.repo",
    "executor.su_binary",
    "executor.command_timeout_secs",
    "executor.download_timeout_secs",
    "process.settle_delay_ms",
    "process.poll_interval_ms",
    "process.poll_attempts",
];

pub const VALID_ARCHES: &[&str] = &["android-arm64", "android-arm", "android-x86_64", "android-x86"];

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.adirf/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AdirfConfig {
    pub paths: PathsConfig,
    pub agent: AgentConfig,
    pub release: ReleaseConfig,
    pub executor: ExecutorConfig,
    pub process: ProcessConfig,
}

/// Device directories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory scanned for `adirf<port>` working directories.
    pub base_dir: String,
    /// Public drop point and download destination.
    pub staging_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base_dir: "/data/local/tmp".to_string(),
            staging_dir: "/storage/emulated/0/Download".to_string(),
        }
    }
}

/// Defaults for the managed agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AgentConfig {
    pub default_port: String,
    pub default_name: String,
    /// Release asset architecture suffix.
    pub arch: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            default_port: DEFAULT_PORT.to_string(),
            default_name: STANDARD_BINARY_NAME.to_string(),
            arch: "android-arm64".to_string(),
        }
    }
}

/// GitHub repository publishing the agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReleaseConfig {
    pub owner: String,
    pub repo: String,
    pub timeout_secs: u64,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            owner: "frida".to_string(),
            repo: "frida".to_string(),
            timeout_secs: 15,
        }
    }
}

/// Privileged command channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Superuser binary; empty runs commands with `sh` directly.
    pub su_binary: String,
    pub command_timeout_secs: u64,
    pub download_timeout_secs: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            su_binary: "su".to_string(),
            command_timeout_secs: 60,
            download_timeout_secs: 600,
        }
    }
}

/// Start/stop settle and poll timing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProcessConfig {
    pub settle_delay_ms: u64,
    pub poll_interval_ms: u64,
    pub poll_attempts: u32,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 1500,
            poll_interval_ms: 500,
            poll_attempts: 6,
        }
    }
}

impl AdirfConfig {
    /// Configured default port.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored value is not a valid port.
    pub fn default_port(&self) -> Result<Port> {
        Ok(Port::parse(&self.agent.default_port)?)
    }

    /// Configured default binary name.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored value is not a valid file name.
    pub fn default_name(&self) -> Result<BinaryName> {
        Ok(BinaryName::parse(&self.agent.default_name)?)
    }

    /// `None` when commands should run without a superuser wrapper.
    #[must_use]
    pub fn su_binary(&self) -> Option<&str> {
        let su = self.executor.su_binary.trim();
        (!su.is_empty()).then_some(su)
    }

    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.executor.command_timeout_secs)
    }

    #[must_use]
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.executor.download_timeout_secs)
    }

    #[must_use]
    pub fn release_timeout(&self) -> Duration {
        Duration::from_secs(self.release.timeout_secs)
    }

    /// Current value of a whitelisted key as a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not in the allowed list.
    pub fn get(&self, key: &str) -> Result<String> {
        validate_config_key(key)?;
        Ok(match key {
            "paths.base_dir" => self.paths.base_dir.clone(),
            "paths.staging_dir" => self.paths.staging_dir.clone(),
            "agent.default_port" => self.agent.default_port.clone(),
            "agent.default_name" => self.agent.default_name.clone(),
            "agent.arch" => self.agent.arch.clone(),
            "release.owner" => self.release.owner.clone(),
            "release.repo" => self.release.repo.clone(),
            "executor.su_binary" => self.executor.su_binary.clone(),
            "executor.command_timeout_secs" => self.executor.command_timeout_secs.to_string(),
            "executor.download_timeout_secs" => self.executor.download_timeout_secs.to_string(),
            "process.settle_delay_ms" => self.process.settle_delay_ms.to_string(),
            "process.poll_interval_ms" => self.process.poll_interval_ms.to_string(),
            _ => self.process.poll_attempts.to_string(),
        })
    }

    /// Validate and assign a whitelisted key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;
        match key {
            "paths.base_dir" => self.paths.base_dir = value.to_string(),
            "paths.staging_dir" => self.paths.staging_dir = value.to_string(),
            "agent.default_port" => self.agent.default_port = value.to_string(),
            "agent.default_name" => self.agent.default_name = value.to_string(),
            "agent.arch" => self.agent.arch = value.to_string(),
            "release.owner" => self.release.owner = value.to_string(),
            "release.repo" => self.release.repo = value.to_string(),
            "executor.su_binary" => self.executor.su_binary = value.to_string(),
            "executor.command_timeout_secs" => {
                self.executor.command_timeout_secs = parse_number(key, value)?;
            }
            "executor.download_timeout_secs" => {
                self.executor.download_timeout_secs = parse_number(key, value)?;
            }
            "process.settle_delay_ms" => self.process.settle_delay_ms = parse_number(key, value)?,
            "process.poll_interval_ms" => {
                self.process.poll_interval_ms = parse_number(key, value)?;
            }
            _ => {
                self.process.poll_attempts = u32::try_from(parse_number(key, value)?)
                    .map_err(|_| invalid(key, value, "a number up to 4294967295"))?;
            }
        }
        Ok(())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    match key {
        "paths.base_dir" | "paths.staging_dir" => {
            if !value.starts_with('/') || value.contains('\0') {
                return Err(invalid(key, value, "an absolute device path").into());
            }
        }
        "agent.default_port" => {
            Port::parse(value).map_err(|_| invalid(key, value, "1-65535"))?;
        }
        "agent.default_name" => {
            BinaryName::parse(value).map_err(|_| invalid(key, value, "a file name without '/'"))?;
        }
        "agent.arch" => {
            if !VALID_ARCHES.contains(&value) {
                return Err(invalid(key, value, &VALID_ARCHES.join(", ")).into());
            }
        }
        "release.owner" | "release.repo" => {
            if !is_valid_tag(value) {
                return Err(invalid(key, value, "a GitHub owner or repository name").into());
            }
        }
        "executor.su_binary" => {
            if value.contains(char::is_whitespace) || value.contains('\0') {
                return Err(invalid(key, value, "a program name, or empty to disable").into());
            }
        }
        "process.poll_attempts" => {
            if parse_number(key, value)? == 0 {
                return Err(invalid(key, value, "a positive number").into());
            }
        }
        _ => {
            parse_number(key, value)?;
        }
    }
    Ok(())
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .map_err(|_| invalid(key, value, "a non-negative number").into())
}

fn invalid(key: &str, value: &str, valid: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        valid: valid.to_string(),
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
