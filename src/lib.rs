//! Gridwalk avatar presence server.
//!
//! Tracks ephemeral avatars (position, sprite, transient chat text) for
//! browser clients polling and posting over HTTP. The [`registry`] module
//! is the core; [`protocol`] and [`server`] put it on the wire.

pub mod config;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod utils;

pub use config::ServerConfig;
pub use registry::{AvatarRegistry, RegistryConfig};
pub use server::Server;
