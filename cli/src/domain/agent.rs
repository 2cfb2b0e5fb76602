//! Agent identity types: ports, binary names, working directories.
//!
//! Pure functions only: no I/O, no async. Paths here are device paths
//! (always `/`-separated), never host paths, so they are plain strings.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::error::ValidationError;

// ── Constants ────────────────────────────────────────────────────────────────

/// Prefix of every working directory name: `adirf<port>`.
pub const WORKDIR_PREFIX: &str = "adirf";

/// Port used when neither the user nor the device state provides one.
pub const DEFAULT_PORT: &str = "27042";

/// Name the release feed ships the agent under.
pub const STANDARD_BINARY_NAME: &str = "frida-server";

/// Interface the agent binds to when started.
pub const LISTEN_HOST: &str = "0.0.0.0";

const MAX_NAME_LEN: usize = 255;

// ── Port ─────────────────────────────────────────────────────────────────────

/// A TCP port in canonical decimal form (`1..=65535`, no sign, no leading zero).
///
/// Kept as the original digit string so that `adirf<port>` round-trips
/// exactly between directory names and user input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Port(String);

impl Port {
    /// Parse and validate a port string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPort`] for anything that is not a
    /// canonical decimal in `1..=65535`.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidPort(input.to_string());
        if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if input.len() > 1 && input.starts_with('0') {
            return Err(invalid());
        }
        match input.parse::<u16>() {
            Ok(0) | Err(_) => Err(invalid()),
            Ok(_) => Ok(Self(input.to_string())),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Port {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── BinaryName ───────────────────────────────────────────────────────────────

/// File name of the agent binary inside its working directory.
///
/// Always a single path component, so it can never escape the directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BinaryName(String);

impl BinaryName {
    /// Parse and validate a binary name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidName`] when the name is empty, too
    /// long, `.`/`..`, or contains `/` or NUL.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let ok = !input.is_empty()
            && input.len() <= MAX_NAME_LEN
            && input != "."
            && input != ".."
            && !input.contains('/')
            && !input.contains('\0');
        if ok {
            Ok(Self(input.to_string()))
        } else {
            Err(ValidationError::InvalidName(input.to_string()))
        }
    }

    /// The name the release feed ships the agent under.
    #[must_use]
    pub fn standard() -> Self {
        Self(STANDARD_BINARY_NAME.to_string())
    }

    #[must_use]
    pub fn is_standard(&self) -> bool {
        self.0 == STANDARD_BINARY_NAME
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for BinaryName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for BinaryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── WorkingDirectory ─────────────────────────────────────────────────────────

/// The per-port directory holding the agent binary: `<base>/adirf<port>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkingDirectory {
    port: Port,
    path: String,
}

impl WorkingDirectory {
    /// Canonical working directory for `port` under `base`.
    #[must_use]
    pub fn for_port(base: &str, port: &Port) -> Self {
        Self {
            port: port.clone(),
            path: join_path(base, &dir_name(port)),
        }
    }

    /// Interpret a base-directory entry as a working directory.
    ///
    /// Returns `None` unless the entry is exactly `adirf<valid port>`.
    #[must_use]
    pub fn from_entry(base: &str, entry: &str) -> Option<Self> {
        let port = Port::parse(entry.strip_prefix(WORKDIR_PREFIX)?).ok()?;
        Some(Self::for_port(base, &port))
    }

    #[must_use]
    pub fn port(&self) -> &Port {
        &self.port
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Directory entry name, e.g. `adirf27042`.
    #[must_use]
    pub fn name(&self) -> String {
        dir_name(&self.port)
    }

    /// The agent binary called `name` inside this directory.
    #[must_use]
    pub fn binary(&self, name: &BinaryName) -> AgentBinary {
        AgentBinary {
            dir: self.path.clone(),
            name: name.clone(),
        }
    }
}

fn dir_name(port: &Port) -> String {
    format!("{WORKDIR_PREFIX}{port}")
}

/// Result of choosing the canonical working directory from a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkdirSelection {
    pub chosen: WorkingDirectory,
    /// Other matching entries, left untouched.
    pub ignored: Vec<String>,
}

/// Pick the canonical working directory among the entries of `base`.
///
/// The lexicographically smallest `adirf<port>` entry wins, independent of
/// listing order. Entries that do not match the pattern are skipped.
#[must_use]
pub fn select_working_dir(base: &str, entries: &[String]) -> Option<WorkdirSelection> {
    let mut matching: Vec<&str> = entries
        .iter()
        .map(|e| e.trim())
        .filter(|e| WorkingDirectory::from_entry(base, e).is_some())
        .collect();
    matching.sort_unstable();
    matching.dedup();
    let (first, rest) = matching.split_first()?;
    Some(WorkdirSelection {
        chosen: WorkingDirectory::from_entry(base, first)?,
        ignored: rest.iter().map(|s| (*s).to_string()).collect(),
    })
}

// ── AgentBinary ──────────────────────────────────────────────────────────────

/// The managed agent binary, identified by `(directory, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentBinary {
    dir: String,
    name: BinaryName,
}

impl AgentBinary {
    #[must_use]
    pub fn dir(&self) -> &str {
        &self.dir
    }

    #[must_use]
    pub fn name(&self) -> &BinaryName {
        &self.name
    }

    #[must_use]
    pub fn path(&self) -> String {
        join_path(&self.dir, self.name.as_str())
    }
}

// ── ProcessStatus ────────────────────────────────────────────────────────────

/// Run state of the agent, derived from the live process table per query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    Running,
    Stopped,
    /// The process table could not be read.
    Unknown,
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Unknown => "unknown",
        })
    }
}

// ── Release helpers ──────────────────────────────────────────────────────────

/// Validate a release tag before it is interpolated into URLs and file names.
#[must_use]
pub fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag.len() <= 64
        && !tag.starts_with('.')
        && tag
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_'))
}

/// Download URL of the compressed agent for `tag` and `arch`.
///
/// e.g. `https://github.com/frida/frida/releases/download/16.1.0/frida-server-16.1.0-android-arm64.xz`
#[must_use]
pub fn release_asset_url(owner: &str, repo: &str, tag: &str, arch: &str) -> String {
    format!(
        "https://github.com/{owner}/{repo}/releases/download/{tag}/{STANDARD_BINARY_NAME}-{tag}-{arch}.xz"
    )
}

/// Staging path of the extracted agent for `tag`.
#[must_use]
pub fn staged_binary_path(staging_dir: &str, tag: &str) -> String {
    join_path(staging_dir, &format!("{STANDARD_BINARY_NAME}-{tag}"))
}

/// Staging path of the compressed agent for `tag`.
#[must_use]
pub fn staged_archive_path(staging_dir: &str, tag: &str) -> String {
    format!("{}.xz", staged_binary_path(staging_dir, tag))
}

/// Join a device directory and an entry name with exactly one `/`.
#[must_use]
pub fn join_path(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        format!("/{name}")
    } else {
        format!("{dir}/{name}")
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
