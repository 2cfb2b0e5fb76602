//! JSON output helpers.
//!
//! Every `--json` command prints exactly one pretty-printed object on
//! stdout; failures print the error object below instead.

use anyhow::{Context, Result};
use serde::Serialize;

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Print `value` as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    println!("{text}");
    Ok(())
}

/// Stable error code for `--json` output.
///
/// Typed agent errors keep their own code; everything else is `ERROR`.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    use crate::domain::error::{AgentError, ConfigError, ValidationError};
    if let Some(e) = err.downcast_ref::<AgentError>() {
        e.code()
    } else if err.downcast_ref::<ConfigError>().is_some() {
        "CONFIG_ERROR"
    } else if err.downcast_ref::<ValidationError>().is_some() {
        "INVALID_INPUT"
    } else {
        "ERROR"
    }
}
