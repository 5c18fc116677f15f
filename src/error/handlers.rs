//! Error handlers
//!
//! Maps domain errors onto the HTTP boundary.

use log::error;

use crate::error::types::{ProtocolError, RegistryError, ServerError};

/// Log a server error.
pub fn handle_error(err: &ServerError) {
    error!("Server error: {}", err);
}

/// HTTP status for a registry error.
pub fn registry_error_status(err: &RegistryError) -> u16 {
    match err {
        RegistryError::AvatarNotFound(_) => 404,
    }
}

/// HTTP status for a protocol error.
pub fn protocol_error_status(err: &ProtocolError) -> u16 {
    match err {
        ProtocolError::UnknownRoute(_) => 404,
        ProtocolError::RequestTooLarge(_) => 413,
        ProtocolError::MalformedRequest(_)
        | ProtocolError::MissingField(_)
        | ProtocolError::InvalidField { .. }
        | ProtocolError::UnsupportedContentType(_) => 400,
    }
}
