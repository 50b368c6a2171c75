//! Command building and login-shell wrapping.

use std::borrow::Cow;
use std::time::Duration;

/// Default time allowed for the command to begin executing.
pub const DEFAULT_START_TIMEOUT: Duration = Duration::from_secs(30);

/// Default wall-clock limit for the command to finish.
pub const DEFAULT_MAX_EXEC_TIME: Duration = Duration::from_secs(180);

/// A command to be executed on a remote target.
#[derive(Debug, Clone)]
pub struct Command {
    /// The raw command line to execute.
    pub line: String,
    /// Time allowed for the command to begin executing. Bounds channel
    /// open and launch only; the capture loop is governed solely by
    /// `max_exec_time`.
    pub start_timeout: Duration,
    /// Hard wall-clock deadline for the command to finish.
    pub max_exec_time: Duration,
    /// Capture stderr separately. When false, stderr is merged into
    /// stdout at the channel level and the stderr line sequence stays
    /// empty.
    pub separate_stderr: bool,
    /// Log each captured line as it completes.
    pub log_output: bool,
}

impl Command {
    /// Create a new command with default timeouts.
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            start_timeout: DEFAULT_START_TIMEOUT,
            max_exec_time: DEFAULT_MAX_EXEC_TIME,
            separate_stderr: true,
            log_output: true,
        }
    }

    /// Set the start timeout.
    pub fn start_timeout(mut self, timeout: Duration) -> Self {
        self.start_timeout = timeout;
        self
    }

    /// Set the maximum execution time.
    pub fn max_exec_time(mut self, timeout: Duration) -> Self {
        self.max_exec_time = timeout;
        self
    }

    /// Set whether stderr is captured separately.
    pub fn separate_stderr(mut self, separate: bool) -> Self {
        self.separate_stderr = separate;
        self
    }

    /// Set whether captured lines are logged as they complete.
    pub fn log_output(mut self, log: bool) -> Self {
        self.log_output = log;
        self
    }

    /// The channel-ready form of this command (see [`wrap_for_login_shell`]).
    pub fn wrapped(&self) -> String {
        wrap_for_login_shell(&self.line)
    }
}

/// Wrap a raw command for execution under a login-capable shell.
///
/// The remote profile is sourced first (silently skipped when absent) so
/// environment variables set up at login are visible to the command. The
/// whole sequence is passed as a single quoted argument to `sh -lc`, so
/// the original command's own quoting and shell metacharacters survive
/// the extra layer of interpretation intact.
pub fn wrap_for_login_shell(command: &str) -> String {
    let inner = format!(
        "[ -r /etc/profile ] && . /etc/profile >/dev/null 2>&1; {}",
        command
    );
    format!("sh -lc {}", shell_escape::unix::escape(Cow::from(inner)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_defaults() {
        let cmd = Command::new("uname -a");
        assert_eq!(cmd.line, "uname -a");
        assert_eq!(cmd.start_timeout, DEFAULT_START_TIMEOUT);
        assert_eq!(cmd.max_exec_time, DEFAULT_MAX_EXEC_TIME);
        assert!(cmd.separate_stderr);
        assert!(cmd.log_output);
    }

    #[test]
    fn test_command_builder_chain() {
        let cmd = Command::new("sleep 1")
            .start_timeout(Duration::from_secs(10))
            .max_exec_time(Duration::from_secs(30))
            .separate_stderr(false)
            .log_output(false);

        assert_eq!(cmd.start_timeout, Duration::from_secs(10));
        assert_eq!(cmd.max_exec_time, Duration::from_secs(30));
        assert!(!cmd.separate_stderr);
        assert!(!cmd.log_output);
    }

    #[test]
    fn test_wrap_sources_profile_when_present() {
        let wrapped = wrap_for_login_shell("echo hi");
        assert!(wrapped.starts_with("sh -lc "));
        assert!(wrapped.contains("[ -r /etc/profile ]"));
        assert!(wrapped.contains(". /etc/profile >/dev/null 2>&1; echo hi"));
    }

    #[test]
    fn test_wrap_quotes_whole_sequence_as_one_argument() {
        let wrapped = wrap_for_login_shell("echo hi");
        // Everything after the -c flag must be one single-quoted argument.
        let arg = wrapped.strip_prefix("sh -lc ").unwrap();
        assert!(arg.starts_with('\''));
        assert!(arg.ends_with('\''));
    }

    #[test]
    fn test_wrap_preserves_inner_single_quotes() {
        let wrapped = wrap_for_login_shell("echo 'a b'");
        // A single quote inside the command must survive the outer quoting
        // layer via the '\'' escape idiom.
        assert!(wrapped.contains(r#"'\''a b'\''"#));
    }

    #[test]
    fn test_wrap_preserves_metacharacters() {
        let wrapped = wrap_for_login_shell("echo out; echo err 1>&2; exit 7");
        assert!(wrapped.contains("echo out; echo err 1>&2; exit 7"));
    }

    #[test]
    fn test_wrapped_uses_command_line() {
        let cmd = Command::new("true");
        assert_eq!(cmd.wrapped(), wrap_for_login_shell("true"));
    }
}
