//! HTTP/1.1 message helpers for the modem transport.
//!
//! The modem moves opaque bytes; these helpers produce the bytes. Outbound,
//! a [`Request`] is encoded once and handed to
//! [`Modem::send_request`](crate::network::at::Modem::send_request).
//! Inbound, a [`ResponseHeader`] is rendered for a body of known length and
//! both are passed to [`Modem::respond`](crate::network::at::Modem::respond).
//!
//! # Features
//!
//! - Fixed-size buffers for predictable memory usage
//! - `GET` and `POST` requests with custom headers
//! - `Content-Length` framed responses, no chunking
//!
//! ```rust
//! use esplink::network::application::http::{Request, ResponseHeader};
//!
//! let request = Request::get("/api/status")
//!     .header("Accept", "application/json")
//!     .unwrap();
//! let bytes = request.encode("192.168.4.2").unwrap();
//! assert!(bytes.starts_with(b"GET /api/status HTTP/1.1\r\n"));
//!
//! let body = b"<h1>ok</h1>";
//! let header = ResponseHeader::html(body.len()).encode().unwrap();
//! assert!(header.ends_with("\r\n\r\n"));
//! ```

/// Outbound request encoding.
pub mod request;

/// Response header rendering for the server side.
pub mod response;

pub use request::{EncodedRequest, Header, Method, Request};
pub use response::{ResponseHeader, Status};
