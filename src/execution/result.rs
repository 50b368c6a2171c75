//! Execution result types.

/// Exit status reported when a command did not finish within its
/// allotted execution time.
///
/// Callers must not conflate this with a real process exit code: a remote
/// process can never legitimately report `-1`.
pub const TIMEOUT_EXIT_STATUS: i32 = -1;

/// Result of one remote command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Exit status of the remote process, or [`TIMEOUT_EXIT_STATUS`] when
    /// execution did not finish within the deadline.
    pub exit_status: i32,
    /// Captured stdout lines, each retaining its trailing terminator.
    pub stdout: Vec<String>,
    /// Captured stderr lines. Empty when stderr was merged into stdout at
    /// channel-open time.
    pub stderr: Vec<String>,
}

impl ExecutionResult {
    /// Create a new execution result.
    pub fn new(exit_status: i32, stdout: Vec<String>, stderr: Vec<String>) -> Self {
        Self {
            exit_status,
            stdout,
            stderr,
        }
    }

    /// Whether the command completed with exit status zero.
    pub fn success(&self) -> bool {
        self.exit_status == 0
    }

    /// Whether execution hit the wall-clock deadline instead of exiting.
    pub fn timed_out(&self) -> bool {
        self.exit_status == TIMEOUT_EXIT_STATUS
    }

    /// Captured stdout joined into one string.
    pub fn stdout_text(&self) -> String {
        self.stdout.concat()
    }

    /// Captured stderr joined into one string.
    pub fn stderr_text(&self) -> String {
        self.stderr.concat()
    }
}
