use esplink::network::{ByteSource, Write};
use esplink::system::clock::Clock;
use std::cell::Cell;
use std::collections::VecDeque;

/// A scripted modem.
///
/// Bytes queued with `feed` are readable right away. Replies registered with
/// `on` are queued when the next write starting with the given prefix
/// arrives, in registration order, so a test reads like a transcript.
#[derive(Debug, Default)]
pub struct MockPort {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    script: VecDeque<(Vec<u8>, Vec<u8>)>,
    fail_writes: bool,
}

impl MockPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replies `reply` to the next write that starts with `prefix`.
    pub fn on(mut self, prefix: &str, reply: &[u8]) -> Self {
        self.script
            .push_back((prefix.as_bytes().to_vec(), reply.to_vec()));
        self
    }

    /// Makes `bytes` readable immediately.
    pub fn feed(mut self, bytes: &[u8]) -> Self {
        self.rx.extend(bytes.iter().copied());
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Everything the driver wrote, as text.
    pub fn written(&self) -> String {
        String::from_utf8_lossy(&self.tx).into_owned()
    }

    /// Command lines the driver wrote, without CR-LF.
    pub fn commands(&self) -> Vec<String> {
        self.written()
            .split("\r\n")
            .filter(|line| line.starts_with("AT"))
            .map(str::to_owned)
            .collect()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.written().matches(needle).count()
    }

    pub fn unread(&self) -> usize {
        self.rx.len()
    }

    pub fn unused_replies(&self) -> usize {
        self.script.len()
    }
}

impl ByteSource for MockPort {
    fn available(&mut self) -> bool {
        !self.rx.is_empty()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }
}

impl Write for MockPort {
    type Error = ();

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.fail_writes {
            return Err(());
        }
        self.tx.extend_from_slice(buf);
        let triggered = matches!(self.script.front(), Some((prefix, _)) if buf.starts_with(prefix));
        if triggered {
            if let Some((_, reply)) = self.script.pop_front() {
                self.rx.extend(reply);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(());
        }
        Ok(())
    }
}

/// A clock that advances one millisecond every time it is read.
#[derive(Debug, Default)]
pub struct TickClock {
    now: Cell<u64>,
}

impl TickClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed(&self) -> u64 {
        self.now.get()
    }
}

impl Clock for TickClock {
    fn now_ms(&self) -> u64 {
        let now = self.now.get();
        self.now.set(now + 1);
        now
    }
}
