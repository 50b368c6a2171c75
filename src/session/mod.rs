//! Session management module.
//!
//! This module provides connection establishment with bounded retries,
//! session lifecycle handling, and execution channels bound to one
//! remote command each.

mod channel;
mod config;
mod handle;

pub use channel::ExecChannel;
pub use config::{AuthMethod, SessionConfig};
pub use handle::Session;
