//! Authenticated session handle and connection establishment.

use std::fs::File;
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::path::Path;

use tracing::{debug, info};

use super::channel::ExecChannel;
use super::config::{AuthMethod, SessionConfig};
use crate::execution::Command;
use crate::{Result, TargetTunnelError};

/// An authenticated, connected handle to a remote host.
///
/// A session is either fully connected or does not exist: [`Session::connect`]
/// only returns once the transport is established and authenticated, so a
/// partially initialized session is never observable. Closing is
/// deterministic and idempotent, via [`Session::close`] or on drop.
///
/// Host keys are not verified. Targets are ephemeral test fixtures, so the
/// first key presented is accepted.
pub struct Session {
    config: SessionConfig,
    raw: ssh2::Session,
    closed: bool,
}

impl Session {
    /// Connect and authenticate, retrying transient failures.
    ///
    /// Up to `retries` attempts are made with `retry_interval` sleeps in
    /// between; each attempt is bounded by the connect timeout plus the
    /// banner allowance. Individual failures are logged at debug (they are
    /// expected while a target boots); only exhausting every attempt is an
    /// error.
    pub fn connect(config: SessionConfig) -> Result<Self> {
        let addr = resolve(&config)?;
        info!("connecting to {} ...", config.host);

        for attempt in 1..=config.retries {
            match Self::attempt(&config, &addr) {
                Ok(raw) => {
                    info!("SSH connection to {} established", config.host);
                    return Ok(Self {
                        config,
                        raw,
                        closed: false,
                    });
                }
                Err(err) => {
                    debug!(
                        "SSH connection to {} failed (attempt {}/{}): {}",
                        config.host, attempt, config.retries, err
                    );
                    std::thread::sleep(config.retry_interval);
                }
            }
        }

        Err(TargetTunnelError::ConnectionFailed {
            host: config.host,
            attempts: config.retries,
        })
    }

    fn attempt(config: &SessionConfig, addr: &SocketAddr) -> Result<ssh2::Session> {
        let tcp = TcpStream::connect_timeout(addr, config.connect_timeout)?;

        let mut raw = ssh2::Session::new()?;
        raw.set_tcp_stream(tcp);
        raw.set_timeout(config.banner_timeout.as_millis() as u32);
        raw.handshake()?;

        match &config.auth {
            AuthMethod::Password(password) => {
                raw.userauth_password(&config.username, password)?;
            }
            AuthMethod::Key(key) => {
                raw.userauth_pubkey_memory(&config.username, None, key.contents(), None)?;
            }
        }
        if !raw.authenticated() {
            return Err(TargetTunnelError::AuthenticationFailed(
                config.username.clone(),
            ));
        }

        // Timeouts are applied per operation from here on.
        raw.set_timeout(0);
        Ok(raw)
    }

    /// Target host this session is connected to.
    pub fn host(&self) -> &str {
        &self.config.host
    }

    /// Open an execution channel bound to `command`.
    ///
    /// The command's start timeout bounds the channel open and launch
    /// only; the capture loop that follows is governed solely by the
    /// command's max execution time. A transport-level rejection here
    /// surfaces as [`TargetTunnelError::ChannelOpen`], distinct from
    /// execution or timeout failures.
    pub fn open_channel(&mut self, command: &Command) -> Result<ExecChannel<'_>> {
        if self.closed {
            return Err(TargetTunnelError::SessionClosed);
        }

        self.raw
            .set_timeout(command.start_timeout.as_millis() as u32);
        let launched = self.launch(command);
        self.raw.set_timeout(0);

        Ok(ExecChannel::new(
            &self.raw,
            launched?,
            command.separate_stderr,
        ))
    }

    fn launch(&self, command: &Command) -> Result<ssh2::Channel> {
        let mut channel = self
            .raw
            .channel_session()
            .map_err(TargetTunnelError::ChannelOpen)?;
        if !command.separate_stderr {
            channel
                .handle_extended_data(ssh2::ExtendedData::Merge)
                .map_err(TargetTunnelError::ChannelOpen)?;
        }
        channel
            .exec(&command.wrapped())
            .map_err(TargetTunnelError::ChannelOpen)?;
        Ok(channel)
    }

    /// Upload a local file to the target over SFTP.
    pub fn upload(&self, local: &Path, remote: &Path) -> Result<()> {
        if self.closed {
            return Err(TargetTunnelError::SessionClosed);
        }
        debug!("uploading {} to {}", local.display(), remote.display());

        let sftp = self.raw.sftp()?;
        let mut source = File::open(local)?;
        let mut dest = sftp.create(remote)?;
        io::copy(&mut source, &mut dest)?;
        Ok(())
    }

    /// Download a file from the target over SFTP.
    pub fn download(&self, remote: &Path, local: &Path) -> Result<()> {
        if self.closed {
            return Err(TargetTunnelError::SessionClosed);
        }
        debug!("downloading {} to {}", remote.display(), local.display());

        let sftp = self.raw.sftp()?;
        let mut source = sftp.open(remote)?;
        if let Some(parent) = local.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut dest = File::create(local)?;
        io::copy(&mut source, &mut dest)?;
        Ok(())
    }

    /// Close the session.
    ///
    /// Idempotent; independent of any individual command outcome. Also
    /// runs on drop, so every exit path from the owning scope releases
    /// the connection.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(err) = self.raw.disconnect(None, "session closed", None) {
            debug!("SSH disconnect failed: {}", err);
        }
        info!("closed SSH connection to {}", self.config.host);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

fn resolve(config: &SessionConfig) -> Result<SocketAddr> {
    let target = format!("{}:{}", config.host, config.port);
    target
        .to_socket_addrs()
        .map_err(|_| TargetTunnelError::InvalidAddress(target.clone()))?
        .next()
        .ok_or(TargetTunnelError::InvalidAddress(target))
}
