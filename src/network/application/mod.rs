//! # Application Layer Helpers
//!
//! The modem carries raw TCP payloads. This module holds the application
//! protocols that are layered on top of that link.
//!
//! ## Available Protocols
//!
//! - **[`http`]**: HTTP/1.1 request encoding and response headers
//!
//! ## Design Principles
//!
//! - **No-std Compatible**: Designed for embedded systems without heap allocation
//! - **Resource Conscious**: Use fixed-size buffers and minimal memory
//! - **Transport Agnostic**: Produce bytes; the driver decides how they travel

/// HTTP/1.1 helpers.
///
/// Request encoding for outbound exchanges and response headers for the
/// single-socket server.
pub mod http;
