//! Session configuration.

use std::path::Path;
use std::time::Duration;

use crate::keys::{self, LoadedKey};
use crate::Result;

/// Default SSH port.
pub const DEFAULT_PORT: u16 = 22;

/// Default per-attempt connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default number of connection attempts.
pub const DEFAULT_RETRIES: u32 = 5;

/// Default sleep between connection attempts.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Default allowance for the banner exchange and handshake. Freshly
/// booted targets can take a long time to present their banner.
pub const DEFAULT_BANNER_TIMEOUT: Duration = Duration::from_secs(200);

/// Authentication material for a session.
#[derive(Debug, Clone)]
pub enum AuthMethod {
    /// Password authentication (an empty password is allowed).
    Password(String),
    /// Private-key authentication with a pre-decoded key.
    Key(LoadedKey),
}

impl AuthMethod {
    /// Password authentication.
    pub fn password(password: impl Into<String>) -> Self {
        Self::Password(password.into())
    }

    /// Private-key authentication from a key file.
    ///
    /// The key is decoded eagerly; an undecodable file fails here, before
    /// any connection attempt is made.
    pub fn key_file(path: &Path) -> Result<Self> {
        Ok(Self::Key(keys::load_private_key(path)?))
    }
}

/// Connection parameters for a remote target.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Target address (hostname or IP).
    pub host: String,
    /// Target SSH port.
    pub port: u16,
    /// Username to authenticate as.
    pub username: String,
    /// Authentication material.
    pub auth: AuthMethod,
    /// Per-attempt TCP connect timeout.
    pub connect_timeout: Duration,
    /// Number of connection attempts before giving up.
    pub retries: u32,
    /// Sleep between connection attempts.
    pub retry_interval: Duration,
    /// Banner-exchange and handshake allowance.
    pub banner_timeout: Duration,
}

impl SessionConfig {
    /// Create a configuration for `host` with defaults: port 22, user
    /// `root`, empty password, 15 s connect timeout, 5 retries at 1 s
    /// intervals.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            username: "root".to_string(),
            auth: AuthMethod::Password(String::new()),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            retry_interval: DEFAULT_RETRY_INTERVAL,
            banner_timeout: DEFAULT_BANNER_TIMEOUT,
        }
    }

    /// Set the target port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the username.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Set the authentication material.
    pub fn auth(mut self, auth: AuthMethod) -> Self {
        self.auth = auth;
        self
    }

    /// Set the per-attempt connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the number of connection attempts.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set the sleep between connection attempts.
    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Set the banner-exchange allowance.
    pub fn banner_timeout(mut self, timeout: Duration) -> Self {
        self.banner_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::new("10.0.2.15");
        assert_eq!(config.host, "10.0.2.15");
        assert_eq!(config.port, 22);
        assert_eq!(config.username, "root");
        assert!(matches!(config.auth, AuthMethod::Password(ref p) if p.is_empty()));
        assert_eq!(config.connect_timeout, Duration::from_secs(15));
        assert_eq!(config.retries, 5);
        assert_eq!(config.retry_interval, Duration::from_secs(1));
        assert_eq!(config.banner_timeout, Duration::from_secs(200));
    }

    #[test]
    fn test_builder_chain() {
        let config = SessionConfig::new("target")
            .port(2222)
            .username("tester")
            .auth(AuthMethod::password("tester"))
            .connect_timeout(Duration::from_secs(5))
            .retries(3)
            .retry_interval(Duration::from_secs(2))
            .banner_timeout(Duration::from_secs(60));

        assert_eq!(config.port, 2222);
        assert_eq!(config.username, "tester");
        assert!(matches!(config.auth, AuthMethod::Password(ref p) if p == "tester"));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.retries, 3);
        assert_eq!(config.retry_interval, Duration::from_secs(2));
        assert_eq!(config.banner_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_key_file_auth_rejects_bad_file() {
        let result = AuthMethod::key_file(Path::new("/nonexistent/id_ed25519"));
        assert!(result.is_err());
    }
}
