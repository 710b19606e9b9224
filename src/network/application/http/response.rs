use crate::network::error::Error;
use core::fmt::Write;
use heapless::String;

/// Largest rendered response header.
pub const MAX_RESPONSE_HEADER_LEN: usize = 256;

/// Status codes the server side produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadRequest,
    NotFound,
    InternalServerError,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::InternalServerError => 500,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::BadRequest => "Bad Request",
            Status::NotFound => "Not Found",
            Status::InternalServerError => "Internal Server Error",
        }
    }
}

/// Header block for a response whose body length is known up front.
///
/// The modem needs the full byte count before any data is written, so
/// responses are never chunked and always close the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader<'a> {
    pub status: Status,
    pub content_type: &'a str,
    pub content_length: usize,
}

impl<'a> ResponseHeader<'a> {
    pub fn new(status: Status, content_type: &'a str, content_length: usize) -> Self {
        Self {
            status,
            content_type,
            content_length,
        }
    }

    /// `200 OK` with an HTML body.
    pub fn html(content_length: usize) -> Self {
        Self::new(Status::Ok, "text/html", content_length)
    }

    /// `200 OK` with a JSON body.
    pub fn json(content_length: usize) -> Self {
        Self::new(Status::Ok, "application/json", content_length)
    }

    pub fn encode(&self) -> Result<String<MAX_RESPONSE_HEADER_LEN>, Error> {
        let mut out = String::new();
        write!(
            out,
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status.code(),
            self.status.reason(),
            self.content_type,
            self.content_length
        )
        .map_err(|_| Error::BufferOverflow)?;
        Ok(out)
    }
}
