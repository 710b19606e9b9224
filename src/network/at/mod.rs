//! Driver for ESP8266-class AT-command Wi-Fi modems.
//!
//! The modem sits on a serial link and speaks a line-oriented text protocol:
//! the host writes a command such as `AT+CIPSEND=0,42`, the modem answers
//! with status lines (`OK`, `>`, `SEND OK`, `CLOSED`, ...) and interleaves
//! unsolicited `+IPD` lines whenever a peer sends data. This module turns
//! that stream into a minimal HTTP transport.
//!
//! # Architecture
//!
//! ```text
//!  ByteSource ──▶ ResponseBuffer ──┬──▶ matcher (await terminator) ──┐
//!                                  └──▶ LineFramer ──▶ frame decoder ─┤
//!                                                                      ▼
//!                         Write ◀──────────── commands ◀──────────── Modem
//! ```
//!
//! - [`buffer`]: the bounded buffer every response lands in
//! - [`matcher`]: waits for a terminator under a deadline
//! - [`framer`]: yields complete CR-LF lines one byte at a time
//! - [`frame`]: decodes `+IPD` frames and the request line inside them
//! - [`command`]: renders outbound commands
//! - [`modem`]: the session driver sequencing all of the above
//!
//! Everything is single-threaded and blocking: a wait spins until its
//! marker shows up or its deadline passes, and nothing else runs meanwhile.
//!
//! # Usage
//!
//! ```rust,no_run
//! use esplink::network::at::{Modem, ModemConfig, Mode};
//! use esplink::network::application::http::ResponseHeader;
//! # use esplink::network::{ByteSource, Write};
//! # use esplink::system::clock::Clock;
//! # struct Uart;
//! # impl ByteSource for Uart {
//! #     fn available(&mut self) -> bool { false }
//! #     fn read_byte(&mut self) -> Option<u8> { None }
//! # }
//! # impl Write for Uart {
//! #     type Error = ();
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct Millis;
//! # impl Clock for Millis { fn now_ms(&self) -> u64 { 0 } }
//!
//! let config = ModemConfig::new(Mode::AccessPointServer, "lab", "secret").unwrap();
//! let mut modem: Modem<_, _> = Modem::new(Uart, Millis, config);
//! modem.join().unwrap();
//!
//! loop {
//!     if let Some(frame) = modem.listen(1000) {
//!         let body: &[u8] = match frame.target.name() {
//!             Some("status") => b"{\"ok\":true}",
//!             _ => b"<h1>hello</h1>",
//!         };
//!         let header = ResponseHeader::html(body.len()).encode().unwrap();
//!         modem.respond(header.as_bytes(), body).unwrap();
//!     }
//! }
//! ```

pub mod buffer;
pub mod command;
pub mod config;
pub mod frame;
pub mod framer;
pub mod matcher;
pub mod modem;

pub use buffer::{DEFAULT_CAPACITY, ResponseBuffer};
pub use command::Command;
pub use config::{ConfigError, Mode, ModemConfig, Timeouts};
pub use frame::{InboundFrame, RequestTarget};
pub use framer::LineFramer;
pub use matcher::await_terminator;
pub use modem::{
    InboundState, JoinReport, Modem, OutboundReport, OutboundState, ResponseReport, Session,
    Stats,
};

/// Plain command acknowledgement.
pub const OK: &[u8] = b"OK\r\n";
/// Printed once the station has an address.
pub const GOT_IP: &[u8] = b"WIFI GOT IP\r\n";
/// Data-ready prompt after a length announcement.
pub const PROMPT: &[u8] = b">";
/// Confirmation that announced data went out.
pub const SEND_OK: &[u8] = b"SEND OK\r\n";
/// Printed when a connection closes.
pub const CLOSED: &[u8] = b"CLOSED";

/// Largest payload a single send command accepts.
pub const MAX_SEND_LEN: usize = 2048;

/// Number of links the modem multiplexes.
pub const MAX_LINKS: u8 = 5;

/// Link used for outbound connections in multiplexed mode, kept clear of
/// the low ids the server hands to inbound clients.
pub const OUTBOUND_LINK_ID: u8 = MAX_LINKS - 1;
