//! Decoder for the modem's inbound-data frames.
//!
//! When a remote peer sends data the modem prints a single line:
//!
//! ```text
//! +IPD,<id>,<length>[,<remote ip>,<remote port>]:<payload>     (multiplexed)
//! +IPD,<length>:<payload>                                      (single connection)
//! ```
//!
//! Only the first line of the payload shares the framed line, which for an
//! HTTP client is the request line. This module recovers the link id, the
//! announced length and the requested resource from it.
//!
//! # Examples
//!
//! ```rust
//! use esplink::network::at::frame::{self, RequestTarget};
//!
//! let frame = frame::decode(b"+IPD,2,18:GET /temp HTTP/1.1\r\n").unwrap();
//! assert_eq!(frame.link_id, 2);
//! assert_eq!(frame.length, 18);
//! assert_eq!(frame.target, RequestTarget::Named("temp".try_into().unwrap()));
//!
//! assert!(frame::decode(b"+IPD,2,0:").is_none());
//! ```

use heapless::String;

/// Prefix of every inbound-data line.
pub const IPD_PREFIX: &[u8] = b"+IPD,";

/// Link id reported for frames received in single-connection mode.
pub const IMPLICIT_LINK_ID: u8 = 0;

/// Longest resource name kept from a request line; longer names are cut.
pub const MAX_RESOURCE_LEN: usize = 16;

/// Request line for the root resource, compared byte for byte.
const ROOT_REQUEST: &[u8] = b"GET / ";
/// Request lines we understand start with this.
const GET_REQUEST: &[u8] = b"GET /";
/// Offset of the resource name within `GET /<name> HTTP/1.1`.
const RESOURCE_OFFSET: usize = GET_REQUEST.len();

/// What an inbound request line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestTarget {
    /// `GET / ...`
    Root,
    /// `GET /<name> ...`, without the leading slash.
    Named(String<MAX_RESOURCE_LEN>),
    /// Anything else: another method, a truncated line or non-ASCII bytes.
    Malformed,
}

impl RequestTarget {
    /// Resource name, or `None` for the root and malformed requests.
    pub fn name(&self) -> Option<&str> {
        match self {
            RequestTarget::Named(name) => Some(name.as_str()),
            _ => None,
        }
    }
}

/// A decoded `+IPD` frame header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundFrame {
    /// Link the data arrived on.
    pub link_id: u8,
    /// Payload length announced by the modem, always positive.
    pub length: usize,
    /// Offset of the payload within the framed line.
    pub payload_offset: usize,
    /// Resource requested by the embedded request line.
    pub target: RequestTarget,
}

/// Decodes a multiplexed-mode frame: `+IPD,<id>,<length>[,...]:<payload>`.
///
/// Returns `None` when the line is not a frame, when the id or length is not
/// a well-formed integer, when there is no colon, or when the announced
/// length is zero or negative.
pub fn decode(line: &[u8]) -> Option<InboundFrame> {
    let fields = line.strip_prefix(IPD_PREFIX)?;
    let (id, rest) = parse_int(fields)?;
    let rest = rest.strip_prefix(b",")?;
    let (length, rest) = parse_int(rest)?;
    match rest.first() {
        Some(b',') | Some(b':') => {}
        _ => return None,
    }
    let link_id = u8::try_from(id).ok()?;
    finish(line, link_id, length)
}

/// Decodes a single-connection frame: `+IPD,<length>:<payload>`.
///
/// The link id is [`IMPLICIT_LINK_ID`].
pub fn decode_single(line: &[u8]) -> Option<InboundFrame> {
    let fields = line.strip_prefix(IPD_PREFIX)?;
    let (length, rest) = parse_int(fields)?;
    if rest.first() != Some(&b':') {
        return None;
    }
    finish(line, IMPLICIT_LINK_ID, length)
}

fn finish(line: &[u8], link_id: u8, length: i32) -> Option<InboundFrame> {
    if length <= 0 {
        return None;
    }
    let colon = IPD_PREFIX.len() + line[IPD_PREFIX.len()..].iter().position(|&b| b == b':')?;
    let payload_offset = colon + 1;
    Some(InboundFrame {
        link_id,
        length: length as usize,
        payload_offset,
        target: parse_request_line(&line[payload_offset..]),
    })
}

/// Classifies the first line of an HTTP request.
///
/// `GET / ` is the root. Otherwise the name starts right after `GET /` and
/// runs to the first space or line ending, cut to [`MAX_RESOURCE_LEN`]
/// bytes. `GET /` with nothing after it is also treated as the root.
pub fn parse_request_line(payload: &[u8]) -> RequestTarget {
    if payload.starts_with(ROOT_REQUEST) {
        return RequestTarget::Root;
    }
    if !payload.starts_with(GET_REQUEST) {
        return RequestTarget::Malformed;
    }

    let rest = &payload[RESOURCE_OFFSET..];
    let end = rest
        .iter()
        .position(|&b| matches!(b, b' ' | b'\r' | b'\n'))
        .unwrap_or(rest.len());
    if end == 0 {
        return RequestTarget::Root;
    }
    let token = &rest[..end.min(MAX_RESOURCE_LEN)];
    if !token.iter().all(|b| b.is_ascii_graphic()) {
        return RequestTarget::Malformed;
    }
    match core::str::from_utf8(token).ok().and_then(|s| String::try_from(s).ok()) {
        Some(name) => RequestTarget::Named(name),
        None => RequestTarget::Malformed,
    }
}

/// Parses an optionally signed decimal integer from the start of `bytes`.
///
/// Needs at least one digit; returns the value and the unparsed rest.
fn parse_int(bytes: &[u8]) -> Option<(i32, &[u8])> {
    let (negative, digits) = match bytes.first() {
        Some(b'-') => (true, &bytes[1..]),
        _ => (false, bytes),
    };
    let len = digits.iter().take_while(|b| b.is_ascii_digit()).count();
    if len == 0 {
        return None;
    }
    let mut value: i32 = 0;
    for &d in &digits[..len] {
        value = value.checked_mul(10)?.checked_add(i32::from(d - b'0'))?;
    }
    Some((if negative { -value } else { value }, &digits[len..]))
}

#[cfg(feature = "defmt")]
impl defmt::Format for RequestTarget {
    fn format(&self, f: defmt::Formatter) {
        match self {
            RequestTarget::Root => defmt::write!(f, "Root"),
            RequestTarget::Named(name) => defmt::write!(f, "Named({=str})", name.as_str()),
            RequestTarget::Malformed => defmt::write!(f, "Malformed"),
        }
    }
}
