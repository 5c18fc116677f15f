//! Error handling
//!
//! Defines error types and handling for the avatar presence server.

pub mod handlers;
pub mod types;

pub use types::*;
