//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod agent;
pub mod command;
pub mod config;
pub mod error;
pub mod session;

pub use agent::{AgentBinary, BinaryName, Port, ProcessStatus, WorkingDirectory};
pub use command::PrivilegedOp;
pub use config::{AdirfConfig, validate_config_key, validate_config_value};
pub use error::{AgentError, ConfigError, ValidationError};
pub use session::Session;
