//! SSH-backed target implementation.

use std::path::Path;
use std::time::Duration;

use tracing::info;

use super::{CapabilitySet, Target};
use crate::execution::{Command, ExecutionResult, DEFAULT_MAX_EXEC_TIME, DEFAULT_START_TIMEOUT};
use crate::session::{Session, SessionConfig};
use crate::{Result, TargetTunnelError};

/// A remote target reached over SSH, with file transfer via SFTP.
pub struct SshTarget {
    session: Session,
    start_timeout: Duration,
    max_exec_time: Duration,
    restart_command: Option<String>,
    capabilities: CapabilitySet,
}

impl SshTarget {
    /// Connect to the target described by `config`.
    pub fn connect(config: SessionConfig) -> Result<Self> {
        let session = Session::connect(config)?;
        Ok(Self {
            session,
            start_timeout: DEFAULT_START_TIMEOUT,
            max_exec_time: DEFAULT_MAX_EXEC_TIME,
            restart_command: None,
            capabilities: CapabilitySet::with_required(["ssh", "sftp"]),
        })
    }

    /// Set the per-command start timeout.
    pub fn start_timeout(mut self, timeout: Duration) -> Self {
        self.start_timeout = timeout;
        self
    }

    /// Set the per-command max execution time.
    pub fn max_exec_time(mut self, timeout: Duration) -> Self {
        self.max_exec_time = timeout;
        self
    }

    /// Set the command used to restart the target (e.g. `reboot`).
    /// Without one, [`Target::restart`] reports the operation as
    /// unsupported.
    pub fn restart_command(mut self, command: impl Into<String>) -> Self {
        self.restart_command = Some(command.into());
        self
    }

    /// Access the underlying session, e.g. for commands with custom
    /// timeouts or merged stderr.
    pub fn session(&mut self) -> &mut Session {
        &mut self.session
    }
}

impl Target for SshTarget {
    fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    fn execute(&mut self, command: &str) -> Result<ExecutionResult> {
        let command = Command::new(command)
            .start_timeout(self.start_timeout)
            .max_exec_time(self.max_exec_time);
        self.session.execute_output(&command)
    }

    fn upload(&mut self, local: &Path, remote: &Path) -> Result<()> {
        self.session.upload(local, remote)
    }

    fn download(&mut self, remote: &Path, local: &Path) -> Result<()> {
        self.session.download(remote, local)
    }

    fn restart(&mut self) -> Result<()> {
        let Some(command) = self.restart_command.clone() else {
            return Err(TargetTunnelError::Unsupported("restart"));
        };

        info!("restarting target via '{}'", command);
        let status = self.session.execute(&command)?;
        if status != 0 {
            return Err(TargetTunnelError::ExecutionFailed(format!(
                "restart command '{}' exited with status {}",
                command, status
            )));
        }
        Ok(())
    }
}
