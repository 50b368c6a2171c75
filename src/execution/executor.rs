//! Command orchestration: launch, capture, and result assembly.

use tracing::{debug, error, warn};

use super::capture::{self, CaptureEnd};
use super::command::Command;
use super::result::{ExecutionResult, TIMEOUT_EXIT_STATUS};
use crate::session::{Session, SessionConfig};
use crate::{Result, TargetTunnelError};

impl Session {
    /// Execute a command and capture its full output.
    ///
    /// Returns the exit status together with the captured stdout and
    /// stderr line sequences. A command that does not finish within its
    /// max execution time yields [`TIMEOUT_EXIT_STATUS`] and whatever
    /// output was produced before the deadline; the session itself stays
    /// usable for subsequent commands.
    pub fn execute_output(&mut self, command: &Command) -> Result<ExecutionResult> {
        debug!("executing command: {}", command.line);
        debug!(
            "start_timeout: {:?}; max_exec_time: {:?}; separate_stderr: {}",
            command.start_timeout, command.max_exec_time, command.separate_stderr
        );

        let mut channel = self.open_channel(command)?;

        channel.set_blocking(false);
        let outcome = capture::capture_streams(
            &mut channel,
            command.max_exec_time,
            command.separate_stderr,
            command.log_output,
        );
        channel.set_blocking(true);

        let exit_status = match outcome.end {
            CaptureEnd::Completed => channel.exit_status()?,
            CaptureEnd::DeadlineExceeded => {
                error!(
                    "command '{}' did not finish within {:?}",
                    command.line, command.max_exec_time
                );
                TIMEOUT_EXIT_STATUS
            }
            CaptureEnd::StreamError(err) => {
                warn!("capture for command '{}' failed: {}", command.line, err);
                TIMEOUT_EXIT_STATUS
            }
        };
        channel.close();

        Ok(ExecutionResult::new(
            exit_status,
            outcome.stdout,
            outcome.stderr,
        ))
    }

    /// Execute a command, returning only its exit status.
    ///
    /// On a nonzero or timed-out status the full captured output is
    /// logged at debug severity for post-mortem inspection, without
    /// altering the returned value.
    pub fn execute(&mut self, command: &str) -> Result<i32> {
        let result = self.execute_output(&Command::new(command))?;

        if !result.success() {
            debug!("exit code was {}.", result.exit_status);
            debug!("stdout: {}", result.stdout_text());
            debug!("stderr: {}", result.stderr_text());
        }

        Ok(result.exit_status)
    }
}

/// Connect, execute one command, and close, on a blocking worker thread.
///
/// Convenience for async callers: the whole blocking transport sequence
/// runs via `tokio::task::spawn_blocking`, so it never stalls the async
/// runtime.
pub async fn execute_once(config: SessionConfig, command: Command) -> Result<ExecutionResult> {
    tokio::task::spawn_blocking(move || {
        let mut session = Session::connect(config)?;
        let result = session.execute_output(&command);
        session.close();
        result
    })
    .await
    .map_err(|err| TargetTunnelError::Task(err.to_string()))?
}
