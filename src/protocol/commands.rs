//! Module `commands`
//!
//! Data structures representing a raw HTTP request and the decoded avatar
//! API operation it maps to.

/// A raw HTTP request as read off the wire by the connection handler.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    /// Content-Type header value, if present.
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// A decoded avatar API operation.
///
/// Each variant corresponds to one route of the original client contract.
#[derive(Debug, PartialEq)]
pub enum Request {
    /// POST /avatar/new
    NewAvatar,
    /// GET /avatar/list
    ListAvatars,
    /// POST /avatar/update with form fields `id`, `x`, `y`
    UpdateAvatar { id: u32, x: i32, y: i32 },
    /// POST /avatar/speak with form fields `id`, `text`
    Speak { id: u32, text: String },
}
