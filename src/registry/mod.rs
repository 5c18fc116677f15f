//! Avatar registry
//!
//! The in-memory heart of the server: tracks every avatar spawned during
//! the process lifetime and serializes all access behind one lock.

pub mod avatar;
pub mod core;

pub use avatar::{AvatarRecord, AvatarView};
pub use core::{AvatarRegistry, RegistryConfig};
