//! Accumulating buffer for expect-style pattern waits.
//!
//! Output is consumed through each match rather than discarded wholesale:
//! whatever trails the matched span stays buffered for the next wait. That is
//! what lets several key/value lines arriving in one TCP chunk satisfy
//! several successive expect calls.

use std::fmt;

use bytes::{Bytes, BytesMut};
use vte::{Parser, Perform};

/// Buffer of cleaned console output awaiting pattern matches.
///
/// Incoming bytes run through a terminal parser before they land in the
/// buffer: printable text and C0 controls pass through, escape sequences
/// are dropped. The parser keeps its state between reads, so a sequence
/// split across TCP chunks still vanishes whole.
pub struct ExpectBuffer {
    parser: Parser,
    buffer: BytesMut,
}

impl ExpectBuffer {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
            buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Extend the buffer with new data, stripping ANSI escape sequences.
    pub fn extend(&mut self, data: &[u8]) {
        let mut sink = PlainText {
            out: &mut self.buffer,
        };
        self.parser.advance(&mut sink, data);
    }

    /// Split off and return everything up to `end`, leaving the rest buffered.
    pub fn consume_to(&mut self, end: usize) -> Bytes {
        self.buffer.split_to(end).freeze()
    }

    /// Unconsumed contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for ExpectBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExpectBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpectBuffer")
            .field("pending_bytes", &self.buffer.len())
            .finish_non_exhaustive()
    }
}

/// Terminal sink that keeps plain output and discards escape sequences.
///
/// Every C0 control passes through untouched: the console patterns match
/// on literal `\r\n` terminators, so carriage returns must survive.
struct PlainText<'a> {
    out: &'a mut BytesMut,
}

impl Perform for PlainText<'_> {
    fn print(&mut self, c: char) {
        let mut encoded = [0u8; 4];
        self.out
            .extend_from_slice(c.encode_utf8(&mut encoded).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        self.out.extend_from_slice(&[byte]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_accumulates() {
        let mut buffer = ExpectBuffer::new();
        buffer.extend(b"User Name:");
        buffer.extend(b" admin");
        assert_eq!(buffer.as_slice(), b"User Name: admin");
    }

    #[test]
    fn extend_strips_ansi() {
        let mut buffer = ExpectBuffer::new();
        buffer.extend(b"\x1b[32mswitch1#\x1b[0m");
        assert_eq!(buffer.as_slice(), b"switch1#");
    }

    #[test]
    fn carriage_returns_survive_stripping() {
        let mut buffer = ExpectBuffer::new();
        buffer.extend(b"Classification rules:\r\n");
        assert_eq!(buffer.as_slice(), b"Classification rules:\r\n");
    }

    #[test]
    fn split_escape_sequence_still_vanishes() {
        let mut buffer = ExpectBuffer::new();
        buffer.extend(b"sw\x1b[3");
        buffer.extend(b"2mitch1\x1b[0m#");
        assert_eq!(buffer.as_slice(), b"switch1#");
    }

    #[test]
    fn consume_leaves_remainder() {
        let mut buffer = ExpectBuffer::new();
        buffer.extend(b"Port Mode: Trunk\r\nGvrp Status: disabled\r\n");

        let consumed = buffer.consume_to(18);
        assert_eq!(&consumed[..], b"Port Mode: Trunk\r\n");
        assert_eq!(buffer.as_slice(), b"Gvrp Status: disabled\r\n");
    }

    #[test]
    fn consume_everything_empties() {
        let mut buffer = ExpectBuffer::new();
        buffer.extend(b"switch1#");
        let len = buffer.len();
        buffer.consume_to(len);
        assert!(buffer.is_empty());
    }
}
