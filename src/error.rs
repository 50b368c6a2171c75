//! Error types for target-tunnel.

use std::path::PathBuf;

use thiserror::Error;

use crate::keys::KeyAlgorithm;

/// Main error type for target-tunnel operations.
#[derive(Error, Debug)]
pub enum TargetTunnelError {
    /// No supported key algorithm could decode the private key file.
    #[error(transparent)]
    KeyLoad(#[from] KeyLoadError),

    /// All connection attempts to the target were exhausted.
    #[error("SSH connection to {host} failed after {attempts} attempts")]
    ConnectionFailed {
        /// Target address the connection was attempted against.
        host: String,
        /// Number of attempts made before giving up.
        attempts: u32,
    },

    /// The target address could not be resolved to a socket address.
    #[error("invalid target address: {0}")]
    InvalidAddress(String),

    /// The transport rejected opening a command channel on a live session.
    #[error("failed to open execution channel: {0}")]
    ChannelOpen(#[source] ssh2::Error),

    /// Authentication was rejected by the remote host.
    #[error("SSH authentication failed for user '{0}'")]
    AuthenticationFailed(String),

    /// Transport-level SSH error.
    #[error("SSH error: {0}")]
    Ssh(#[from] ssh2::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The session has already been closed.
    #[error("session closed")]
    SessionClosed,

    /// Remote command execution failed.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),

    /// A background execution task failed to complete.
    #[error("background task failed: {0}")]
    Task(String),

    /// Operation is not supported by the selected target.
    #[error("no target plugin selected: {0} is unavailable")]
    Unsupported(&'static str),
}

/// Convenience Result type for target-tunnel operations.
pub type Result<T> = std::result::Result<T, TargetTunnelError>;

/// Aggregated failure from trying every supported private-key algorithm.
///
/// Carries one `(algorithm, reason)` pair per attempted decoder so the
/// caller sees why each one rejected the file, never a silent fallback.
#[derive(Debug)]
pub struct KeyLoadError {
    /// Path of the key file that could not be decoded.
    pub path: PathBuf,
    /// Every attempted algorithm with its individual failure reason.
    pub attempts: Vec<(KeyAlgorithm, String)>,
}

impl std::fmt::Display for KeyLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tried: Vec<String> = self
            .attempts
            .iter()
            .map(|(algorithm, _)| algorithm.to_string())
            .collect();
        let details: Vec<String> = self
            .attempts
            .iter()
            .map(|(algorithm, reason)| format!("{}: {}", algorithm, reason))
            .collect();
        write!(
            f,
            "unsupported or invalid private key file '{}'. Tried key types: {}. Details: {}",
            self.path.display(),
            tried.join(", "),
            details.join(" | ")
        )
    }
}

impl std::error::Error for KeyLoadError {}
