use crate::network::error::Error;
use core::fmt::Write;
use heapless::{String, Vec};

const MAX_HEADERS: usize = 16;
const MAX_HEADER_NAME_LEN: usize = 64;
const MAX_HEADER_VALUE_LEN: usize = 256;

/// Largest encoded request; the modem accepts at most 2048 bytes per send.
pub const MAX_REQUEST_LEN: usize = 2048;

/// An encoded request, ready to hand to [`Modem::send_request`](crate::network::at::Modem::send_request).
pub type EncodedRequest = Vec<u8, MAX_REQUEST_LEN>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Header {
    pub name: String<MAX_HEADER_NAME_LEN>,
    pub value: String<MAX_HEADER_VALUE_LEN>,
}

impl Header {
    /// Builds a header, failing if either part is too long.
    pub fn new(name: &str, value: &str) -> Result<Self, Error> {
        Ok(Self {
            name: String::try_from(name).map_err(|_| Error::BufferOverflow)?,
            value: String::try_from(value).map_err(|_| Error::BufferOverflow)?,
        })
    }
}

#[derive(Debug)]
pub struct Request<'a> {
    pub method: Method,
    pub path: &'a str,
    pub headers: Vec<Header, MAX_HEADERS>,
    pub body: Option<&'a [u8]>,
}

impl<'a> Request<'a> {
    /// A `GET` with no headers.
    pub fn get(path: &'a str) -> Self {
        Self {
            method: Method::Get,
            path,
            headers: Vec::new(),
            body: None,
        }
    }

    /// A `POST` carrying `body`.
    pub fn post(path: &'a str, body: &'a [u8]) -> Self {
        Self {
            method: Method::Post,
            path,
            headers: Vec::new(),
            body: Some(body),
        }
    }

    /// Appends a header.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self, Error> {
        self.headers
            .push(Header::new(name, value)?)
            .map_err(|_| Error::BufferOverflow)?;
        Ok(self)
    }

    /// Serializes the request as HTTP/1.1.
    ///
    /// A `Host` header is added from `host` unless one was given, and
    /// `Connection: close` is always sent so the modem reports `CLOSED` once
    /// the server is done.
    pub fn encode(&self, host: &str) -> Result<EncodedRequest, Error> {
        let mut buf = EncodedRequest::new();
        let mut put = |bytes: &[u8]| buf.extend_from_slice(bytes).map_err(|_| Error::BufferOverflow);

        // Request line
        put(self.method.as_str().as_bytes())?;
        put(b" ")?;
        put(self.path.as_bytes())?;
        put(b" HTTP/1.1\r\n")?;

        // Headers
        let mut has_host = false;
        let mut has_connection = false;
        for header in &self.headers {
            if header.name.eq_ignore_ascii_case("Host") {
                has_host = true;
            }
            if header.name.eq_ignore_ascii_case("Connection") {
                has_connection = true;
            }
            put(header.name.as_bytes())?;
            put(b": ")?;
            put(header.value.as_bytes())?;
            put(b"\r\n")?;
        }
        if !has_host {
            put(b"Host: ")?;
            put(host.as_bytes())?;
            put(b"\r\n")?;
        }
        if !has_connection {
            put(b"Connection: close\r\n")?;
        }

        // Body
        if let Some(body) = self.body {
            let mut len_str: String<10> = String::new();
            write!(len_str, "{}", body.len()).map_err(|_| Error::BufferOverflow)?;

            put(b"Content-Length: ")?;
            put(len_str.as_bytes())?;
            put(b"\r\n\r\n")?;
            put(body)?;
        } else {
            put(b"\r\n")?;
        }

        Ok(buf)
    }
}
