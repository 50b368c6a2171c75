//! Remote command execution module.
//!
//! Command wrapping, stream capture with dual timeouts, line
//! reassembly, and result types.

pub(crate) mod capture;
mod command;
mod executor;
mod lines;
mod result;

pub use command::{
    wrap_for_login_shell, Command, DEFAULT_MAX_EXEC_TIME, DEFAULT_START_TIMEOUT,
};
pub use executor::execute_once;
pub use lines::StreamBuffer;
pub use result::{ExecutionResult, TIMEOUT_EXIT_STATUS};
