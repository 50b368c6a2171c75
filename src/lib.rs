//! # target-tunnel
//!
//! Resilient SSH command transport for integration-test targets.
//!
//! This crate drives commands on remote test targets (containers,
//! virtual machines) over SSH. It connects with bounded retries so a
//! still-booting target is not an error, launches commands under a
//! login-capable shell with the remote profile sourced, and captures
//! stdout/stderr under dual timeout regimes without truncating output
//! that is still in flight when the process exits.
//!
//! ## Features
//!
//! - **Retrying connection establishment**: configurable attempts,
//!   per-attempt timeouts, and a generous banner allowance for
//!   slow-booting targets
//! - **Private-key auto-detection**: RSA, ECDSA, Ed25519 and legacy DSA
//!   keys, with an aggregated error naming every rejected algorithm
//! - **Dual-timeout capture**: a start timeout bounding command launch
//!   and a hard wall-clock deadline for execution, with partial output
//!   preserved on timeout
//! - **Loss-free line reassembly**: chunk boundaries never split lines
//!   or multi-byte characters in the captured output
//!
//! ## Quick Start
//!
//! ```no_run
//! use target_tunnel::{Command, Session, SessionConfig};
//!
//! fn main() -> target_tunnel::Result<()> {
//!     target_tunnel::logging::try_init().ok();
//!
//!     let config = SessionConfig::new("10.0.2.15").username("root");
//!     let mut session = Session::connect(config)?;
//!
//!     let result = session.execute_output(&Command::new("uname -a"))?;
//!     println!("exit {}: {}", result.exit_status, result.stdout_text());
//!
//!     session.close();
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod execution;
pub mod keys;
pub mod logging;
pub mod session;
pub mod target;

// Re-export commonly used types
pub use error::{KeyLoadError, Result, TargetTunnelError};
pub use execution::{
    execute_once, wrap_for_login_shell, Command, ExecutionResult, StreamBuffer,
    TIMEOUT_EXIT_STATUS,
};
pub use keys::{load_private_key, KeyAlgorithm, LoadedKey};
pub use session::{AuthMethod, ExecChannel, Session, SessionConfig};
pub use target::{CapabilitySet, SshTarget, Target, UnsupportedTarget};
