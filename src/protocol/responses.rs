//! HTTP response handling
//!
//! Defines response status codes and wire formatting.

/// Standard HTTP status codes used by the avatar API
pub const OK: u16 = 200;
pub const BAD_REQUEST: u16 = 400;
pub const NOT_FOUND: u16 = 404;
pub const PAYLOAD_TOO_LARGE: u16 = 413;

/// A JSON response ready to be written back to the client.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn json(status: u16, body: String) -> Self {
        Self { status, body }
    }

    /// Formats the full HTTP/1.1 response. Connections are one-shot, so
    /// the server always closes after writing.
    pub fn to_http(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status,
            reason_phrase(self.status),
            self.body.len(),
            self.body
        )
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        OK => "OK",
        BAD_REQUEST => "Bad Request",
        NOT_FOUND => "Not Found",
        PAYLOAD_TOO_LARGE => "Payload Too Large",
        _ => "Internal Server Error",
    }
}
