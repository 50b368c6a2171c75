//! Configuration management for target-tunnel.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::execution::Command;
use crate::session::{AuthMethod, SessionConfig};
use crate::target::SshTarget;
use crate::TargetTunnelError;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target connection configuration.
    pub connection: ConnectionSection,
    /// Command execution configuration.
    pub execution: ExecutionSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Target connection section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSection {
    /// Target address (hostname or IP).
    pub host: String,
    /// Target SSH port.
    pub port: u16,
    /// Username to authenticate as.
    pub username: String,
    /// Password (ignored when a private key is configured).
    pub password: String,
    /// Path to a private key file.
    pub private_key: Option<PathBuf>,
    /// Per-attempt connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Number of connection attempts.
    pub retries: u32,
    /// Sleep between connection attempts in seconds.
    pub retry_interval_secs: u64,
    /// Banner-exchange allowance in seconds.
    pub banner_timeout_secs: u64,
}

impl Default for ConnectionSection {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 22,
            username: "root".to_string(),
            password: String::new(),
            private_key: None,
            connect_timeout_secs: 15,
            retries: 5,
            retry_interval_secs: 1,
            banner_timeout_secs: 200,
        }
    }
}

/// Command execution section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSection {
    /// Time allowed for a command to begin executing, in seconds.
    pub start_timeout_secs: u64,
    /// Wall-clock limit for a command to finish, in seconds.
    pub max_exec_time_secs: u64,
    /// Capture stderr separately instead of merging into stdout.
    pub separate_stderr: bool,
    /// Command used to restart the target, if any.
    pub restart_command: Option<String>,
}

impl Default for ExecutionSection {
    fn default() -> Self {
        Self {
            start_timeout_secs: 30,
            max_exec_time_secs: 180,
            separate_stderr: true,
            restart_command: None,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("TARGET_TUNNEL_HOST") {
            self.connection.host = host;
        }

        if let Ok(port) = std::env::var("TARGET_TUNNEL_PORT") {
            if let Ok(port) = port.parse() {
                self.connection.port = port;
            }
        }

        if let Ok(username) = std::env::var("TARGET_TUNNEL_USERNAME") {
            self.connection.username = username;
        }

        if let Ok(password) = std::env::var("TARGET_TUNNEL_PASSWORD") {
            self.connection.password = password;
        }

        if let Ok(key) = std::env::var("TARGET_TUNNEL_PRIVATE_KEY") {
            if !key.is_empty() {
                self.connection.private_key = Some(PathBuf::from(key));
            }
        }

        if let Ok(level) = std::env::var("TARGET_TUNNEL_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(ref host) = args.host {
            self.connection.host = host.clone();
        }

        if let Some(port) = args.port {
            self.connection.port = port;
        }

        if let Some(ref username) = args.username {
            self.connection.username = username.clone();
        }

        if let Some(ref password) = args.password {
            self.connection.password = password.clone();
        }

        if let Some(ref key) = args.key {
            self.connection.private_key = Some(key.clone());
        }

        if let Some(max_exec_time) = args.max_exec_time {
            self.execution.max_exec_time_secs = max_exec_time;
        }

        if args.merge_stderr {
            self.execution.separate_stderr = false;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut config = Config::default();

        // Load from config file if specified
        if let Some(ref path) = args.config {
            config = Config::from_file(path)?;
        }

        // Apply environment variable overrides
        config.apply_env();

        // Apply CLI argument overrides (highest priority)
        config.apply_args(args);

        Ok(config)
    }

    /// Build the session configuration for the configured target.
    ///
    /// Loads the private key here (eagerly) when one is configured, so an
    /// undecodable key fails before any connection attempt.
    pub fn to_session_config(&self) -> crate::Result<SessionConfig> {
        if self.connection.host.is_empty() {
            return Err(TargetTunnelError::InvalidAddress(
                "no target host configured".to_string(),
            ));
        }

        let auth = match &self.connection.private_key {
            Some(path) => AuthMethod::key_file(path)?,
            None => AuthMethod::password(self.connection.password.clone()),
        };

        Ok(SessionConfig::new(&self.connection.host)
            .port(self.connection.port)
            .username(&self.connection.username)
            .auth(auth)
            .connect_timeout(Duration::from_secs(self.connection.connect_timeout_secs))
            .retries(self.connection.retries)
            .retry_interval(Duration::from_secs(self.connection.retry_interval_secs))
            .banner_timeout(Duration::from_secs(self.connection.banner_timeout_secs)))
    }

    /// Connect an [`SshTarget`] described by this configuration.
    pub fn connect_target(&self) -> crate::Result<SshTarget> {
        let mut target = SshTarget::connect(self.to_session_config()?)?
            .start_timeout(Duration::from_secs(self.execution.start_timeout_secs))
            .max_exec_time(Duration::from_secs(self.execution.max_exec_time_secs));
        if let Some(ref command) = self.execution.restart_command {
            target = target.restart_command(command.clone());
        }
        Ok(target)
    }

    /// Build a command with the configured execution parameters.
    pub fn to_command(&self, line: &str) -> Command {
        Command::new(line)
            .start_timeout(Duration::from_secs(self.execution.start_timeout_secs))
            .max_exec_time(Duration::from_secs(self.execution.max_exec_time_secs))
            .separate_stderr(self.execution.separate_stderr)
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
