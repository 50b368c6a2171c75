//! Execution channel bound to one remote process invocation.

use std::io::{self, Read};

use tracing::debug;

use crate::execution::capture::ChannelIo;
use crate::Result;

/// A duplex stream carrying one remote command.
///
/// At most one command runs per channel and a channel is never reused
/// after its process exits. The channel borrows its session exclusively,
/// so a second command cannot be opened while this one is live.
pub struct ExecChannel<'s> {
    session: &'s ssh2::Session,
    channel: ssh2::Channel,
    separate_stderr: bool,
    closed: bool,
}

impl<'s> ExecChannel<'s> {
    pub(crate) fn new(
        session: &'s ssh2::Session,
        channel: ssh2::Channel,
        separate_stderr: bool,
    ) -> Self {
        Self {
            session,
            channel,
            separate_stderr,
            closed: false,
        }
    }

    /// Whether stderr is captured separately on this channel.
    ///
    /// Fixed at open time: when false, stderr was merged into the stdout
    /// stream at the transport level.
    pub fn separate_stderr(&self) -> bool {
        self.separate_stderr
    }

    /// Switch the underlying transport between blocking and non-blocking
    /// reads. Affects the whole session, which is exclusively ours while
    /// the channel is live.
    pub(crate) fn set_blocking(&self, blocking: bool) {
        self.session.set_blocking(blocking);
    }

    /// Close the channel if not already closed.
    ///
    /// Idempotent and best-effort: a close failure is logged, not
    /// propagated.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(err) = self.channel.close() {
            debug!("channel close failed: {}", err);
        }
    }

    /// Read the process exit status, closing the channel first if needed.
    pub(crate) fn exit_status(&mut self) -> Result<i32> {
        self.close();
        if let Err(err) = self.channel.wait_close() {
            debug!("channel wait_close failed: {}", err);
        }
        Ok(self.channel.exit_status()?)
    }
}

impl ChannelIo for ExecChannel<'_> {
    fn read_stdout(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.channel.read(buf)
    }

    fn read_stderr(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.channel.stderr().read(buf)
    }

    fn exit_signalled(&mut self) -> bool {
        self.channel.eof()
    }
}

impl Drop for ExecChannel<'_> {
    fn drop(&mut self) {
        self.close();
    }
}
