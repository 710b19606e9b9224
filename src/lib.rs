//! # esplink - HTTP over AT-command Wi-Fi modems
//!
//! A `no_std` driver that turns a byte-oriented serial link to an
//! ESP8266-class AT-command modem into a minimal HTTP transport. It can join
//! a network, make outbound HTTP requests, and run a single-socket HTTP
//! server that answers `GET` requests with caller-supplied content.
//!
//! ## Features
//!
//! ### Protocol Engine
//! - **Terminator Matcher**: waits for a modem marker under a wall-clock deadline
//! - **Line Framer**: incremental CR-LF line reader for unsolicited output
//! - **Frame Decoder**: parses `+IPD` frames and the HTTP request line inside
//!
//! ### Session Driver
//! - Station, access-point server and reconnect-only bring-up sequences
//! - Outbound request exchange with best-effort close on failure
//! - Inbound request handling with a single tracked session
//!
//! ### HTTP Helpers
//! - Request encoding with `Host`, `Connection` and `Content-Length`
//! - Response headers for bodies of known length
//!
//! ## Usage
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! esplink = "0.1.0"
//! ```
//!
//! ### Outbound Request Example
//!
//! ```rust,no_run
//! use esplink::network::at::{Modem, ModemConfig, Mode};
//! use esplink::network::application::http::Request;
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
//! let config = ModemConfig::new(Mode::Station, "home", "secret").unwrap();
//! let mut modem: Modem<_, _> = Modem::new(Uart, Millis, config);
//! modem.join().unwrap();
//!
//! let request = Request::post("/api/power", br#"{"watts":42}"#)
//!     .header("Content-Type", "application/json")
//!     .unwrap();
//! let report = modem.send_http("192.168.1.20", 80, &request, b"json").unwrap();
//! // report.path tells whether the payload went out or the link was closed
//! ```
//!
//! ## Platform Support
//!
//! The driver needs two things from the platform: a UART implementing
//! [`network::ByteSource`] and [`network::Write`], and a millisecond
//! [`system::clock::Clock`]. It runs anywhere Rust's `core` library does.
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library support, including a `SystemClock`
//! - `defmt`: Enable defmt logging support for embedded debugging

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

/// Network abstraction layer: link traits, errors, the AT modem driver and
/// the HTTP helpers layered on it.
pub mod network;

/// System utilities: time source and diagnostic console.
pub mod system;
