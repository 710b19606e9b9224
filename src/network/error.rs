//! Common error types for network operations

/// A common error type for network operations.
///
/// Only failures that leave the driver unable to talk to the modem surface
/// as an `Error`. Protocol trouble (a missing acknowledgement, a garbled
/// inbound frame, a response that overran the buffer) is handled where it
/// happens and reported through outcome values and the diagnostic sink.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// A response was requested before any inbound connection was seen.
    NotOpen,
    /// An error occurred during a write operation.
    WriteError,
    /// A command or message did not fit its fixed-size buffer.
    BufferOverflow,
    /// A protocol-specific error occurred.
    ProtocolError,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::NotOpen => defmt::write!(f, "NotOpen"),
            Error::WriteError => defmt::write!(f, "WriteError"),
            Error::BufferOverflow => defmt::write!(f, "BufferOverflow"),
            Error::ProtocolError => defmt::write!(f, "ProtocolError"),
        }
    }
}
