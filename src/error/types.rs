//! Error types
//!
//! Defines domain-specific error types for each module of the server.

use std::fmt;
use std::io;

/// Registry module errors.
///
/// The registry boundary deliberately has a single error kind: every other
/// input (out-of-range coordinates, arbitrary chat text) is normalized
/// rather than rejected.
#[derive(Debug, PartialEq)]
pub enum RegistryError {
    AvatarNotFound(u32),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::AvatarNotFound(id) => {
                write!(f, "No avatar found with id {}.", id)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Protocol module errors.
#[derive(Debug, PartialEq)]
pub enum ProtocolError {
    MalformedRequest(String),
    UnknownRoute(String),
    RequestTooLarge(usize),
    MissingField(String),
    InvalidField { field: String, value: String },
    UnsupportedContentType(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::MalformedRequest(msg) => write!(f, "Malformed request: {}", msg),
            ProtocolError::UnknownRoute(route) => write!(f, "Unknown route: {}", route),
            ProtocolError::RequestTooLarge(len) => {
                write!(f, "Request too large: {} bytes", len)
            }
            ProtocolError::MissingField(field) => write!(f, "Missing form field: {}", field),
            ProtocolError::InvalidField { field, value } => {
                write!(f, "Invalid value for field {}: {:?}", field, value)
            }
            ProtocolError::UnsupportedContentType(ct) => {
                write!(f, "Unsupported content type: {}", ct)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

/// General server error that encompasses all error types.
#[derive(Debug)]
pub enum ServerError {
    Registry(RegistryError),
    Protocol(ProtocolError),
    Config(config::ConfigError),
    Io(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Registry(e) => write!(f, "Registry error: {}", e),
            ServerError::Protocol(e) => write!(f, "Protocol error: {}", e),
            ServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ServerError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<RegistryError> for ServerError {
    fn from(error: RegistryError) -> Self {
        ServerError::Registry(error)
    }
}

impl From<ProtocolError> for ServerError {
    fn from(error: ProtocolError) -> Self {
        ServerError::Protocol(error)
    }
}

impl From<config::ConfigError> for ServerError {
    fn from(error: config::ConfigError) -> Self {
        ServerError::Config(error)
    }
}

impl From<io::Error> for ServerError {
    fn from(error: io::Error) -> Self {
        ServerError::Io(error)
    }
}
