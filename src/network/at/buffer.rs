//! Bounded response buffer.
//!
//! One buffer holds whatever the modem has said since the last wait began or
//! the last line completed. The terminator matcher and the line framer both
//! append into it; the driver lends it to whichever one is running.

/// Default capacity, sized for a full `+IPD` request line plus headroom.
pub const DEFAULT_CAPACITY: usize = 2048;

/// Fixed-capacity append buffer with a write cursor.
///
/// The cursor always stays in `[0, N)`. When a byte lands in the last slot
/// the cursor wraps to 0 and everything collected so far is dropped without
/// an error; only the [`overflows`](ResponseBuffer::overflows) counter and
/// the diagnostic stream record it. A terminator that straddles the wrap
/// point is therefore missed, while one that arrives entirely after it still
/// matches.
// TODO: wrapping loses data silently; a bounded "line too long" signal would
// let callers drop oversized input deliberately instead.
#[derive(Debug, Clone)]
pub struct ResponseBuffer<const N: usize = DEFAULT_CAPACITY> {
    data: [u8; N],
    cursor: usize,
    overflows: u32,
}

impl<const N: usize> Default for ResponseBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ResponseBuffer<N> {
    /// Creates an empty buffer.
    pub const fn new() -> Self {
        const { assert!(N > 1, "response buffer needs room for at least two bytes") };
        Self {
            data: [0; N],
            cursor: 0,
            overflows: 0,
        }
    }

    /// Total number of bytes the buffer can hold before wrapping.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Current cursor position, i.e. the number of bytes collected.
    pub fn len(&self) -> usize {
        self.cursor
    }

    /// True when nothing has been collected since the last reset.
    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// Number of times the cursor has wrapped since construction.
    pub fn overflows(&self) -> u32 {
        self.overflows
    }

    /// Moves the cursor back to the start.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Appends one byte. Returns `true` if this byte caused a wrap.
    pub fn push(&mut self, byte: u8) -> bool {
        self.data[self.cursor] = byte;
        self.cursor += 1;
        if self.cursor == N {
            self.cursor = 0;
            self.overflows = self.overflows.wrapping_add(1);
            return true;
        }
        false
    }

    /// Bytes collected since the last reset.
    pub fn contents(&self) -> &[u8] {
        &self.data[..self.cursor]
    }

    /// First `len` bytes of storage regardless of the cursor.
    ///
    /// Used to read back a completed line after the cursor has been reset.
    pub(crate) fn head(&self, len: usize) -> &[u8] {
        &self.data[..len.min(N)]
    }

    /// Suffix compare of the newest bytes against `terminator`.
    ///
    /// Never matches while fewer than `terminator.len()` bytes are held, so
    /// a partial terminator is never reported.
    pub fn ends_with(&self, terminator: &[u8]) -> bool {
        let len = terminator.len();
        self.cursor >= len && &self.data[self.cursor - len..self.cursor] == terminator
    }
}
