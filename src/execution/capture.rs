//! Stream capture engine.
//!
//! Drives one remote process invocation to completion or deadline,
//! multiplexing stdout/stderr through non-blocking polls. The loop never
//! blocks indefinitely on either stream: when a read yields data it
//! re-polls immediately to drain bursts, and when both streams are idle
//! it sleeps a short bounded slice of the remaining deadline instead of
//! spinning.
//!
//! Exit signalling is not trusted as an end-of-output marker on its own.
//! Output can still be in flight between process exit and stream flush,
//! so the engine waits one short grace period after the exit signal and
//! re-checks both streams; capture only terminates once exit has been
//! signalled and neither stream has pending data.

use std::io;
use std::time::{Duration, Instant};

use tracing::info;

use super::lines::StreamBuffer;

/// Upper bound for a single read from either stream.
pub(crate) const READ_CHUNK_SIZE: usize = 32 * 1024;

/// Sleep slice while both streams are idle and the process is running.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Extra wait after the exit signal before concluding no output remains.
const EXIT_DRAIN_GRACE: Duration = Duration::from_millis(100);

/// Non-blocking view of one remote process invocation.
///
/// Reads must return `WouldBlock` when no data is ready rather than
/// blocking; `exit_signalled` reports whether the remote process has
/// finished, independent of buffered output.
pub(crate) trait ChannelIo {
    /// Read available stdout bytes into `buf`.
    fn read_stdout(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    /// Read available stderr bytes into `buf`.
    fn read_stderr(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    /// Whether the remote process has signalled completion.
    fn exit_signalled(&mut self) -> bool;
}

/// How the capture loop ended.
#[derive(Debug)]
pub(crate) enum CaptureEnd {
    /// The process exited and both streams drained.
    Completed,
    /// The wall-clock deadline expired first.
    DeadlineExceeded,
    /// A stream read failed hard (not `WouldBlock`).
    StreamError(io::Error),
}

/// Captured output plus the way capture ended.
///
/// Pending partial lines are always flushed into the line sequences,
/// whichever way the loop ended.
#[derive(Debug)]
pub(crate) struct CaptureOutcome {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    pub end: CaptureEnd,
}

/// Poll both streams until the process completes or the deadline expires.
pub(crate) fn capture_streams<C: ChannelIo>(
    channel: &mut C,
    max_exec_time: Duration,
    separate_stderr: bool,
    log_output: bool,
) -> CaptureOutcome {
    let deadline = Instant::now() + max_exec_time;
    let mut stdout = StreamBuffer::new();
    let mut stderr = StreamBuffer::new();
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];

    let end = loop {
        let now = Instant::now();
        if now > deadline {
            break CaptureEnd::DeadlineExceeded;
        }

        let mut did_read = false;
        match poll_into(|buf| channel.read_stdout(buf), &mut stdout, &mut chunk, log_output) {
            Ok(read) => did_read |= read,
            Err(err) => break CaptureEnd::StreamError(err),
        }
        if separate_stderr {
            match poll_into(|buf| channel.read_stderr(buf), &mut stderr, &mut chunk, log_output) {
                Ok(read) => did_read |= read,
                Err(err) => break CaptureEnd::StreamError(err),
            }
        }

        // Drain bursts without artificial delay.
        if did_read {
            continue;
        }

        if channel.exit_signalled() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let grace = remaining.min(EXIT_DRAIN_GRACE);
            if !grace.is_zero() {
                std::thread::sleep(grace);
            }

            let mut drained = false;
            match poll_into(|buf| channel.read_stdout(buf), &mut stdout, &mut chunk, log_output) {
                Ok(read) => drained |= read,
                Err(err) => break CaptureEnd::StreamError(err),
            }
            if separate_stderr {
                match poll_into(|buf| channel.read_stderr(buf), &mut stderr, &mut chunk, log_output)
                {
                    Ok(read) => drained |= read,
                    Err(err) => break CaptureEnd::StreamError(err),
                }
            }
            if drained {
                continue;
            }
            break CaptureEnd::Completed;
        }

        let remaining = deadline.saturating_duration_since(now);
        if remaining.is_zero() {
            continue;
        }
        std::thread::sleep(IDLE_POLL_INTERVAL.min(remaining));
    };

    CaptureOutcome {
        stdout: stdout.finish(),
        stderr: stderr.finish(),
        end,
    }
}

/// Attempt one read and feed the bytes through the line reassembler.
///
/// Returns `Ok(true)` when bytes were consumed, `Ok(false)` when the
/// stream had nothing ready (or reported end-of-stream), and the error
/// for any hard read failure.
fn poll_into<F>(
    mut read: F,
    buffer: &mut StreamBuffer,
    chunk: &mut [u8],
    log_output: bool,
) -> io::Result<bool>
where
    F: FnMut(&mut [u8]) -> io::Result<usize>,
{
    match read(chunk) {
        Ok(0) => Ok(false),
        Ok(n) => {
            let already = buffer.completed().len();
            buffer.feed(&chunk[..n]);
            if log_output {
                for line in &buffer.completed()[already..] {
                    info!("{}", line.trim_end_matches(['\r', '\n']));
                }
            }
            Ok(true)
        }
        Err(err) if err.kind() == io::ErrorKind::WouldBlock => Ok(false),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// One scripted response per read attempt on a stream.
    enum Step {
        Data(&'static [u8]),
        Idle,
        Fail,
    }

    struct ScriptedChannel {
        stdout: VecDeque<Step>,
        stderr: VecDeque<Step>,
        exited: bool,
        stderr_polled: bool,
    }

    impl ScriptedChannel {
        fn new(stdout: Vec<Step>, stderr: Vec<Step>, exited: bool) -> Self {
            Self {
                stdout: stdout.into(),
                stderr: stderr.into(),
                exited,
                stderr_polled: false,
            }
        }

        fn next(queue: &mut VecDeque<Step>, buf: &mut [u8]) -> io::Result<usize> {
            match queue.pop_front() {
                Some(Step::Data(bytes)) => {
                    buf[..bytes.len()].copy_from_slice(bytes);
                    Ok(bytes.len())
                }
                Some(Step::Idle) | None => {
                    Err(io::Error::new(io::ErrorKind::WouldBlock, "no data"))
                }
                Some(Step::Fail) => Err(io::Error::new(io::ErrorKind::BrokenPipe, "stream lost")),
            }
        }
    }

    impl ChannelIo for ScriptedChannel {
        fn read_stdout(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            Self::next(&mut self.stdout, buf)
        }

        fn read_stderr(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.stderr_polled = true;
            Self::next(&mut self.stderr, buf)
        }

        fn exit_signalled(&mut self) -> bool {
            self.exited
        }
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_completes_after_streams_drain() {
        let mut channel = ScriptedChannel::new(vec![Step::Data(b"out\n")], vec![], true);

        let outcome = capture_streams(&mut channel, secs(5), true, false);

        assert!(matches!(outcome.end, CaptureEnd::Completed));
        assert_eq!(outcome.stdout, vec!["out\n"]);
        assert!(outcome.stderr.is_empty());
    }

    #[test]
    fn test_final_burst_after_exit_signal_is_captured() {
        // Exit is signalled before any data is readable; the burst only
        // becomes available on the post-grace re-check.
        let mut channel =
            ScriptedChannel::new(vec![Step::Idle, Step::Data(b"late burst\n")], vec![], true);

        let outcome = capture_streams(&mut channel, secs(5), true, false);

        assert!(matches!(outcome.end, CaptureEnd::Completed));
        assert_eq!(outcome.stdout, vec!["late burst\n"]);
    }

    #[test]
    fn test_deadline_returns_partial_output() {
        let mut channel = ScriptedChannel::new(vec![Step::Data(b"begin")], vec![], false);

        let started = Instant::now();
        let outcome = capture_streams(&mut channel, Duration::from_millis(200), true, false);
        let elapsed = started.elapsed();

        assert!(matches!(outcome.end, CaptureEnd::DeadlineExceeded));
        // Pending fragment flushed despite the timeout.
        assert_eq!(outcome.stdout, vec!["begin"]);
        assert!(elapsed >= Duration::from_millis(200));
        // Deadline plus at most one poll slice, with scheduling slack.
        assert!(elapsed < Duration::from_secs(2));
    }

    #[test]
    fn test_separate_streams_never_merge() {
        let mut channel = ScriptedChannel::new(
            vec![Step::Data(b"out\n")],
            vec![Step::Data(b"err\n")],
            true,
        );

        let outcome = capture_streams(&mut channel, secs(5), true, false);

        assert_eq!(outcome.stdout, vec!["out\n"]);
        assert_eq!(outcome.stderr, vec!["err\n"]);
    }

    #[test]
    fn test_merged_mode_does_not_poll_stderr() {
        let mut channel =
            ScriptedChannel::new(vec![Step::Data(b"both streams\n")], vec![], true);

        let outcome = capture_streams(&mut channel, secs(5), false, false);

        assert!(matches!(outcome.end, CaptureEnd::Completed));
        assert!(!channel.stderr_polled);
        assert!(outcome.stderr.is_empty());
    }

    #[test]
    fn test_stream_error_preserves_captured_output() {
        let mut channel =
            ScriptedChannel::new(vec![Step::Data(b"a\npart"), Step::Fail], vec![], false);

        let outcome = capture_streams(&mut channel, secs(5), true, false);

        assert!(matches!(outcome.end, CaptureEnd::StreamError(_)));
        assert_eq!(outcome.stdout, vec!["a\n", "part"]);
    }

    #[test]
    fn test_burst_is_drained_before_sleeping() {
        // Multiple chunks queued back to back must all be read without
        // waiting for the process to exit in between.
        let mut channel = ScriptedChannel::new(
            vec![
                Step::Data(b"1\n"),
                Step::Data(b"2\n"),
                Step::Data(b"3\n"),
            ],
            vec![],
            true,
        );

        let outcome = capture_streams(&mut channel, secs(5), true, false);

        assert_eq!(outcome.stdout, vec!["1\n", "2\n", "3\n"]);
    }
}
