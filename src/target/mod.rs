//! Capability-tagged target abstraction.
//!
//! Integration tests run against a [`Target`]: an environment that can
//! execute commands, transfer files, and restart itself. Targets
//! advertise capability identifiers so callers can branch on what a
//! concrete environment supports.

mod ssh;

pub use ssh::SshTarget;

use std::collections::BTreeSet;
use std::path::Path;

use crate::execution::ExecutionResult;
use crate::{Result, TargetTunnelError};

/// Capabilities every concrete target must provide.
pub const REQUIRED_CAPABILITIES: [&str; 3] = ["exec", "file_transfer", "restart"];

/// Set of capability identifiers advertised by a target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    caps: BTreeSet<String>,
}

impl CapabilitySet {
    /// Create a set from extra capabilities plus the required baseline.
    pub fn with_required<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut caps: BTreeSet<String> = extra.into_iter().map(Into::into).collect();
        caps.extend(REQUIRED_CAPABILITIES.iter().map(|c| c.to_string()));
        Self { caps }
    }

    /// Create a set with no capabilities at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check if the target supports a specific capability.
    pub fn has(&self, capability: &str) -> bool {
        self.caps.contains(capability)
    }

    /// Check if the target supports all of the specified capabilities.
    pub fn has_all<'a>(&self, capabilities: impl IntoIterator<Item = &'a str>) -> bool {
        capabilities.into_iter().all(|c| self.has(c))
    }

    /// Check if the target supports any of the specified capabilities.
    pub fn has_any<'a>(&self, capabilities: impl IntoIterator<Item = &'a str>) -> bool {
        capabilities.into_iter().any(|c| self.has(c))
    }

    /// Add a capability.
    pub fn add(&mut self, capability: impl Into<String>) {
        self.caps.insert(capability.into());
    }

    /// Remove a capability.
    pub fn remove(&mut self, capability: &str) {
        self.caps.remove(capability);
    }

    /// Iterate over the capability identifiers.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.caps.iter().map(String::as_str)
    }
}

/// Minimum contract every concrete target implementation provides.
pub trait Target {
    /// Capabilities supported by this target.
    fn capabilities(&self) -> &CapabilitySet;

    /// Execute a command on the target.
    fn execute(&mut self, command: &str) -> Result<ExecutionResult>;

    /// Upload a file from the test host to the target.
    fn upload(&mut self, local: &Path, remote: &Path) -> Result<()>;

    /// Download a file from the target to the test host.
    fn download(&mut self, remote: &Path, local: &Path) -> Result<()>;

    /// Restart the target environment.
    fn restart(&mut self) -> Result<()>;
}

/// Fallback target used when no concrete target is selected.
///
/// Advertises no capabilities; every operation fails with an explicit
/// error instead of silently doing nothing.
#[derive(Debug, Default)]
pub struct UnsupportedTarget {
    capabilities: CapabilitySet,
}

impl UnsupportedTarget {
    /// Create the fallback target.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Target for UnsupportedTarget {
    fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    fn execute(&mut self, _command: &str) -> Result<ExecutionResult> {
        Err(TargetTunnelError::Unsupported("exec"))
    }

    fn upload(&mut self, _local: &Path, _remote: &Path) -> Result<()> {
        Err(TargetTunnelError::Unsupported("upload"))
    }

    fn download(&mut self, _remote: &Path, _local: &Path) -> Result<()> {
        Err(TargetTunnelError::Unsupported("download"))
    }

    fn restart(&mut self) -> Result<()> {
        Err(TargetTunnelError::Unsupported("restart"))
    }
}
