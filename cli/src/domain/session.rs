//! Session state: which working directory and binary name are current.
//!
//! One `Session` is created per command invocation and passed by `&mut` to
//! the services that resolve, install and reconfigure the agent. Only those
//! services mutate it, and only after the corresponding device change
//! succeeded.

use crate::domain::agent::{AgentBinary, BinaryName, WorkingDirectory};

#[derive(Debug, Clone)]
pub struct Session {
    base_dir: String,
    working_dir: Option<WorkingDirectory>,
    binary_name: Option<BinaryName>,
}

impl Session {
    #[must_use]
    pub fn new(base_dir: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            working_dir: None,
            binary_name: None,
        }
    }

    #[must_use]
    pub fn base_dir(&self) -> &str {
        &self.base_dir
    }

    #[must_use]
    pub fn working_dir(&self) -> Option<&WorkingDirectory> {
        self.working_dir.as_ref()
    }

    #[must_use]
    pub fn binary_name(&self) -> Option<&BinaryName> {
        self.binary_name.as_ref()
    }

    /// The managed binary, if a working directory has been resolved.
    ///
    /// Falls back to `default_name` when the directory was empty.
    #[must_use]
    pub fn binary_or(&self, default_name: &BinaryName) -> Option<AgentBinary> {
        let dir = self.working_dir.as_ref()?;
        Some(dir.binary(self.binary_name.as_ref().unwrap_or(default_name)))
    }

    pub fn set_current(&mut self, dir: WorkingDirectory, name: BinaryName) {
        self.working_dir = Some(dir);
        self.binary_name = Some(name);
    }

    pub fn set_working_dir(&mut self, dir: WorkingDirectory) {
        self.working_dir = Some(dir);
    }

    pub fn set_binary_name(&mut self, name: BinaryName) {
        self.binary_name = Some(name);
    }
}
