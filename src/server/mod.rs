//! Server core functionality
//!
//! This module contains the accept loop and per-connection handling for
//! the avatar presence server.

pub mod core;

pub use core::Server;
