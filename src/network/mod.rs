//! A network abstraction layer for serial-attached modems
//!
//! This module holds the small set of traits the driver needs from the
//! platform: a non-blocking byte source for modem output and a writer for
//! outbound commands. Platform code implements both for its UART and hands
//! the result to [`at::Modem`].
//!

#![allow(missing_docs)]
#![deny(unsafe_code)]

/// Common error types for network operations
pub mod error;

/// Driver for AT-command Wi-Fi modems.
pub mod at;

/// Application layer helpers that ride on top of the modem link.
pub mod application;

/// Re-exports of common traits
pub mod prelude {
    pub use super::{ByteSource, SerialPort, Write};
}

/// A non-blocking source of bytes coming from the modem.
pub trait ByteSource {
    /// True when at least one byte can be read without blocking.
    fn available(&mut self) -> bool;

    /// Reads one byte, or `None` if nothing is buffered.
    fn read_byte(&mut self) -> Option<u8>;
}

/// Outbound half of the link.
pub trait Write {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Write data to the connection
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// A full-duplex serial link to the modem.
pub trait SerialPort: ByteSource + Write {}

impl<T: ByteSource + Write> SerialPort for T {}

impl<T: ByteSource + ?Sized> ByteSource for &mut T {
    fn available(&mut self) -> bool {
        (**self).available()
    }

    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }
}

impl<T: Write + ?Sized> Write for &mut T {
    type Error = T::Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        (**self).write(buf)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        (**self).flush()
    }
}
