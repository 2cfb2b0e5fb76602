//! Typed privileged operations.
//!
//! Every command the core sends through the privileged channel is one of the
//! variants below. Rendering turns a variant into the minimal POSIX shell
//! line for it, quoting every interpolated argument, so user-chosen names
//! and ports never reach the shell unescaped.

use std::borrow::Cow;

use crate::domain::error::ValidationError;

/// Probe output when the tested path exists.
pub const EXISTS_TOKEN: &str = "EXISTS";
/// Probe output when the tested path is absent.
pub const MISSING_TOKEN: &str = "MISSING";
/// Size-check output for a non-empty file.
pub const OK_TOKEN: &str = "OK";
/// Size-check output for an empty or absent file.
pub const FAIL_TOKEN: &str = "FAIL";

/// A single operation executed with superuser rights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrivilegedOp {
    /// Is `path` a regular file? Prints [`EXISTS_TOKEN`] or [`MISSING_TOKEN`].
    FileExists { path: String },
    /// Is `path` a directory? Prints [`EXISTS_TOKEN`] or [`MISSING_TOKEN`].
    DirExists { path: String },
    /// Is `path` a non-empty file? Prints [`OK_TOKEN`] or [`FAIL_TOKEN`].
    NonEmpty { path: String },
    /// One entry per line; prints nothing when the directory is empty or absent.
    ListDir { path: String },
    MakeDir { path: String },
    Move { from: String, to: String },
    MarkExecutable { path: String },
    /// Process table lines containing `pattern`; empty when none match.
    ProcessList { pattern: String },
    /// Terminate processes whose command line contains `pattern`.
    Kill { pattern: String },
    Download { url: String, dest: String },
    /// Replace `path` (an `.xz` file) with its decompressed content.
    Decompress { path: String },
    /// Start `binary` detached, listening on `listen`.
    Launch { binary: String, listen: String },
    Version { binary: String },
}

impl PrivilegedOp {
    /// Short operation name for logs and fakes.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FileExists { .. } => "file_exists",
            Self::DirExists { .. } => "dir_exists",
            Self::NonEmpty { .. } => "non_empty",
            Self::ListDir { .. } => "list_dir",
            Self::MakeDir { .. } => "make_dir",
            Self::Move { .. } => "move",
            Self::MarkExecutable { .. } => "mark_executable",
            Self::ProcessList { .. } => "process_list",
            Self::Kill { .. } => "kill",
            Self::Download { .. } => "download",
            Self::Decompress { .. } => "decompress",
            Self::Launch { .. } => "launch",
            Self::Version { .. } => "version",
        }
    }

    /// Whether the operation changes device state.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::MakeDir { .. }
                | Self::Move { .. }
                | Self::MarkExecutable { .. }
                | Self::Kill { .. }
                | Self::Download { .. }
                | Self::Decompress { .. }
                | Self::Launch { .. }
        )
    }

    /// Downloads and decompression get the long timeout.
    #[must_use]
    pub fn is_long_running(&self) -> bool {
        matches!(self, Self::Download { .. } | Self::Decompress { .. })
    }

    /// Render the shell line for this operation.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidName`] if an argument contains a NUL
    /// byte and therefore cannot be quoted.
    pub fn render(&self) -> Result<String, ValidationError> {
        let line = match self {
            Self::FileExists { path } => sentinel_test("-f", path, EXISTS_TOKEN, MISSING_TOKEN)?,
            Self::DirExists { path } => sentinel_test("-d", path, EXISTS_TOKEN, MISSING_TOKEN)?,
            Self::NonEmpty { path } => sentinel_test("-s", path, OK_TOKEN, FAIL_TOKEN)?,
            Self::ListDir { path } => format!("ls -1 {} 2>/dev/null || true", quote(path)?),
            Self::MakeDir { path } => format!("mkdir -p {}", quote(path)?),
            Self::Move { from, to } => format!("mv -f {} {}", quote(from)?, quote(to)?),
            Self::MarkExecutable { path } => format!("chmod +x {}", quote(path)?),
            Self::ProcessList { pattern } => {
                format!("ps -A | grep -F -- {} || true", quote(pattern)?)
            }
            Self::Kill { pattern } => format!("pkill -f -- {} || true", quote(pattern)?),
            Self::Download { url, dest } => format!(
                "busybox wget --no-check-certificate -qO {} {}",
                quote(dest)?,
                quote(url)?
            ),
            Self::Decompress { path } => format!("busybox unxz -f {}", quote(path)?),
            Self::Launch { binary, listen } => format!(
                "{} -D -l {} >/dev/null 2>&1 &",
                quote(binary)?,
                quote(listen)?
            ),
            Self::Version { binary } => format!("{} --version", quote(binary)?),
        };
        Ok(line)
    }
}

fn sentinel_test(flag: &str, path: &str, yes: &str, no: &str) -> Result<String, ValidationError> {
    Ok(format!("[ {flag} {} ] && echo {yes} || echo {no}", quote(path)?))
}

fn quote(arg: &str) -> Result<String, ValidationError> {
    shlex::try_quote(arg)
        .map(Cow::into_owned)
        .map_err(|_| ValidationError::InvalidName(arg.replace('\0', "\\0")))
}
