//! HTTP protocol implementation
//!
//! Handles request parsing, form decoding, routing, and JSON response
//! generation for the avatar API.

pub mod commands;
pub mod handlers;
pub mod parser;
pub mod responses;

pub use commands::{HttpRequest, Request};
pub use handlers::{handle_request, protocol_error_response};
pub use parser::parse_request;
pub use responses::Response;
