//! Line-at-a-time reader over the response buffer.

use super::buffer::ResponseBuffer;
use crate::network::ByteSource;
use crate::system::console::{self, OutputFn};

/// End-of-line marker used by the modem.
pub const EOL: &[u8] = b"\r\n";

/// Incremental CR-LF line framer.
///
/// Each call to [`next_byte`](LineFramer::next_byte) moves at most one byte
/// from the source into the buffer. The buffer cursor carries partial lines
/// across calls, so the framer can be interleaved with other work in a
/// polling loop. When a line completes the cursor goes back to 0 and the
/// line stays readable through [`line`](LineFramer::line) until the next
/// byte arrives.
///
/// A line longer than the buffer wraps the cursor and framing restarts from
/// whatever follows; no error is raised.
#[derive(Debug, Default, Clone)]
pub struct LineFramer {
    line_len: usize,
    lines: u32,
}

impl LineFramer {
    /// Creates a framer with no completed line.
    pub const fn new() -> Self {
        Self {
            line_len: 0,
            lines: 0,
        }
    }

    /// Pulls one byte, returning `true` if it completed a line.
    pub fn next_byte<S, const N: usize>(
        &mut self,
        buffer: &mut ResponseBuffer<N>,
        source: &mut S,
        sink: Option<OutputFn>,
    ) -> bool
    where
        S: ByteSource + ?Sized,
    {
        if !source.available() {
            return false;
        }
        let Some(byte) = source.read_byte() else {
            return false;
        };

        if buffer.is_empty() {
            self.line_len = 0;
        }
        if buffer.push(byte) {
            #[cfg(feature = "defmt")]
            defmt::warn!("line longer than response buffer, restarting");
            console::emit(sink, "\r\n[line overflowed, restarting]\r\n");
            return false;
        }
        if !buffer.ends_with(EOL) {
            return false;
        }

        self.line_len = buffer.len();
        self.lines = self.lines.wrapping_add(1);
        #[cfg(feature = "defmt")]
        defmt::trace!("line: {=[u8]:a}", buffer.contents());
        console::emit_bytes(sink, buffer.contents());
        buffer.reset();
        true
    }

    /// The most recently completed line, including its CR-LF.
    ///
    /// Empty until the first line completes and again once the next line
    /// has started.
    pub fn line<'b, const N: usize>(&self, buffer: &'b ResponseBuffer<N>) -> &'b [u8] {
        if buffer.is_empty() {
            buffer.head(self.line_len)
        } else {
            &[]
        }
    }

    /// Number of lines completed since construction.
    pub fn lines(&self) -> u32 {
        self.lines
    }

    /// Forgets the last completed line.
    pub fn clear(&mut self) {
        self.line_len = 0;
    }
}
