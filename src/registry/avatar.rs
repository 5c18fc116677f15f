//! Module `avatar`
//!
//! Defines the `AvatarRecord` stored in the registry and the `AvatarView`
//! projection sent to clients.

use serde::Serialize;

/// One avatar's full state, as stored in the registry.
///
/// Records are created by `AvatarRegistry::create` and mutated in place by
/// the update and speak operations. They are never deleted: an avatar whose
/// `last_seen` falls outside the liveness window merely disappears from
/// list output while the record itself persists.
#[derive(Debug, Clone)]
pub struct AvatarRecord {
    /// Unique, monotonically assigned identifier. Never reused.
    pub id: u32,
    /// Grid column, always within `[0, max_x - 1]`.
    pub x: i32,
    /// Grid row, always within `[0, max_y - 1]`.
    pub y: i32,
    /// Sprite identifier chosen at creation, immutable afterwards.
    pub image: String,
    /// Current utterance; empty string when nothing is being said.
    pub chat_text: String,
    /// Absolute timestamp (ms) after which `chat_text` is stale.
    pub chat_expiry: u64,
    /// Absolute timestamp (ms) of the most recent create/update/speak.
    pub last_seen: u64,
}

impl AvatarRecord {
    /// Builds the public projection of this record.
    pub fn view(&self) -> AvatarView {
        AvatarView {
            id: self.id,
            x: self.x,
            y: self.y,
            image: self.image.clone(),
            text: self.chat_text.clone(),
        }
    }
}

/// The subset of avatar state exposed to clients by the list operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvatarView {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub image: String,
    pub text: String,
}
