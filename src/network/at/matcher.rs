//! Timeout-bound terminator matcher.
//!
//! This is the driver's only synchronization primitive: after writing a
//! command it waits here until the modem prints the expected marker or the
//! deadline passes.

use super::buffer::ResponseBuffer;
use crate::network::ByteSource;
use crate::system::clock::{Clock, Deadline};
use crate::system::console::{self, OutputFn};

/// Waits up to `timeout_ms` for `terminator` to appear in the modem output.
///
/// The buffer is reset first. Each available byte is appended and, once at
/// least `terminator.len()` bytes are held, the newest bytes are compared
/// against the terminator. Returns `true` on an exact match and `false` when
/// the deadline expires. Bytes after the match stay unread in `source`.
///
/// Whatever was collected is echoed to `sink` when the wait ends. An empty
/// terminator, or one that could never fit in the buffer, returns `false`
/// without consuming input.
pub fn await_terminator<S, C, const N: usize>(
    buffer: &mut ResponseBuffer<N>,
    source: &mut S,
    clock: &C,
    timeout_ms: u32,
    terminator: &[u8],
    sink: Option<OutputFn>,
) -> bool
where
    S: ByteSource + ?Sized,
    C: Clock + ?Sized,
{
    buffer.reset();
    if terminator.is_empty() || terminator.len() >= N {
        return false;
    }

    let deadline = Deadline::after(clock, timeout_ms);
    let mut found = false;
    while !deadline.expired(clock) {
        if !source.available() {
            continue;
        }
        let Some(byte) = source.read_byte() else {
            continue;
        };
        if buffer.push(byte) {
            #[cfg(feature = "defmt")]
            defmt::warn!("response buffer wrapped while waiting");
            console::emit(sink, "\r\n[response buffer wrapped]\r\n");
        }
        if buffer.ends_with(terminator) {
            found = true;
            break;
        }
    }

    #[cfg(feature = "defmt")]
    defmt::debug!("wait found={=bool}: {=[u8]:a}", found, buffer.contents());
    console::emit_bytes(sink, buffer.contents());
    found
}
