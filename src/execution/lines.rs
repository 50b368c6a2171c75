//! Line reassembly for raw output chunks.
//!
//! Remote output arrives as byte chunks split at arbitrary boundaries,
//! possibly inside a multi-byte UTF-8 sequence or between `\r` and `\n`.
//! The buffer therefore keeps its pending fragment as *bytes* and only
//! decodes once a line is complete, so chunk boundaries never change the
//! decoded result.

/// Per-stream accumulation state: completed lines plus one pending
/// unterminated fragment.
///
/// Invariant: concatenating all completed lines with the pending fragment
/// reproduces the decoded byte stream seen so far, with nothing dropped or
/// duplicated.
#[derive(Debug, Default)]
pub struct StreamBuffer {
    lines: Vec<String>,
    pending: Vec<u8>,
}

impl StreamBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a newly read chunk of raw bytes.
    ///
    /// Every fully terminated line in the accumulated data is decoded
    /// (invalid sequences replaced, never an error) and appended to the
    /// completed lines, retaining its trailing `\n` (and a preceding `\r`
    /// if present). The unterminated tail becomes the new pending
    /// fragment. Returns the number of lines completed by this chunk.
    pub fn feed(&mut self, chunk: &[u8]) -> usize {
        self.pending.extend_from_slice(chunk);

        let mut emitted = 0;
        let mut start = 0;
        while let Some(offset) = self.pending[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset + 1;
            self.lines
                .push(String::from_utf8_lossy(&self.pending[start..end]).into_owned());
            start = end;
            emitted += 1;
        }
        self.pending.drain(..start);

        emitted
    }

    /// Completed lines accumulated so far.
    pub fn completed(&self) -> &[String] {
        &self.lines
    }

    /// Whether a pending unterminated fragment exists.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Terminate the stream, promoting any pending fragment to a final
    /// completed line.
    ///
    /// Consuming `self` guarantees the flush happens exactly once.
    pub fn finish(mut self) -> Vec<String> {
        if !self.pending.is_empty() {
            self.lines
                .push(String::from_utf8_lossy(&self.pending).into_owned());
        }
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(buffer: &mut StreamBuffer, chunks: &[&[u8]]) {
        for chunk in chunks {
            buffer.feed(chunk);
        }
    }

    #[test]
    fn test_single_chunk_two_lines() {
        let mut buffer = StreamBuffer::new();
        buffer.feed(b"a\nb\n");
        assert_eq!(buffer.finish(), vec!["a\n", "b\n"]);
    }

    #[test]
    fn test_no_empty_trailing_entry() {
        let mut buffer = StreamBuffer::new();
        buffer.feed(b"a\nb\n");
        assert!(!buffer.has_pending());
        assert_eq!(buffer.finish().len(), 2);
    }

    #[test]
    fn test_unterminated_tail_becomes_pending() {
        let mut buffer = StreamBuffer::new();
        buffer.feed(b"a\npartial");
        assert_eq!(buffer.completed().to_vec(), vec!["a\n"]);
        assert!(buffer.has_pending());
        assert_eq!(buffer.finish(), vec!["a\n", "partial"]);
    }

    #[test]
    fn test_split_mid_line() {
        let mut buffer = StreamBuffer::new();
        feed_all(&mut buffer, &[b"hel", b"lo\nwor", b"ld\n"]);
        assert_eq!(buffer.finish(), vec!["hello\n", "world\n"]);
    }

    #[test]
    fn test_split_inside_multibyte_sequence() {
        // "héllo\n" with the chunk boundary inside the two-byte 'é'
        let bytes = "h\u{e9}llo\n".as_bytes();
        let (first, second) = bytes.split_at(2);

        let mut chunked = StreamBuffer::new();
        feed_all(&mut chunked, &[first, second]);

        let mut whole = StreamBuffer::new();
        whole.feed(bytes);

        assert_eq!(chunked.finish(), whole.finish());
    }

    #[test]
    fn test_split_between_cr_and_lf() {
        let mut buffer = StreamBuffer::new();
        feed_all(&mut buffer, &[b"line\r", b"\n"]);
        assert_eq!(buffer.finish(), vec!["line\r\n"]);
    }

    #[test]
    fn test_every_split_point_matches_single_delivery() {
        let bytes = "caf\u{e9}\n\u{4f60}\u{597d}\nplain\r\ntail".as_bytes();
        let mut whole = StreamBuffer::new();
        whole.feed(bytes);
        let expected = whole.finish();

        for split in 0..=bytes.len() {
            let (first, second) = bytes.split_at(split);
            let mut chunked = StreamBuffer::new();
            feed_all(&mut chunked, &[first, second]);
            assert_eq!(chunked.finish(), expected, "split at byte {}", split);
        }
    }

    #[test]
    fn test_invalid_bytes_replaced_not_raised() {
        let mut buffer = StreamBuffer::new();
        buffer.feed(b"ok\n\xff\xfe\n");
        let lines = buffer.finish();
        assert_eq!(lines[0], "ok\n");
        assert!(lines[1].contains('\u{fffd}'));
    }

    #[test]
    fn test_feed_reports_completed_count() {
        let mut buffer = StreamBuffer::new();
        assert_eq!(buffer.feed(b"a\nb\nc"), 2);
        assert_eq!(buffer.feed(b"\n"), 1);
        assert_eq!(buffer.feed(b"no newline"), 0);
    }

    #[test]
    fn test_empty_stream() {
        let buffer = StreamBuffer::new();
        assert!(buffer.finish().is_empty());
    }
}
