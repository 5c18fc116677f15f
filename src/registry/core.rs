//! Registry core
//!
//! Implements the four registry operations. All of them, including the
//! expiry-clear performed while listing, run under a single internal lock
//! so concurrent request tasks never observe a half-written record or lose
//! an update.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;

use crate::error::RegistryError;
use crate::registry::avatar::{AvatarRecord, AvatarView};

/// Tunable parameters of the registry.
///
/// Kept separate from the server configuration so the core can be tested
/// without touching the config file machinery.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Grid width in tiles; x coordinates are clamped to `[0, max_x - 1]`.
    pub max_x: i32,
    /// Grid height in tiles; y coordinates are clamped to `[0, max_y - 1]`.
    pub max_y: i32,
    /// Number of sprite images to choose from at creation.
    pub sprite_count: u32,
    /// Avatars unseen for longer than this are omitted from list output.
    pub liveness_window_ms: u64,
    /// How long a spoken message stays visible.
    pub chat_duration_ms: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_x: 16,
            max_y: 12,
            sprite_count: 43,
            liveness_window_ms: 30_000,
            chat_duration_ms: 5_000,
        }
    }
}

/// Everything the lock protects: the records and the random source.
///
/// The RNG lives inside the lock so id assignment, spawn placement and the
/// append happen as one critical section.
struct RegistryState {
    avatars: Vec<AvatarRecord>,
    rng: StdRng,
}

/// The avatar registry.
///
/// Cheap to share via `Arc`; every method takes `&self` and synchronizes
/// internally. Callers never see the lock.
pub struct AvatarRegistry {
    config: RegistryConfig,
    state: Mutex<RegistryState>,
}

impl AvatarRegistry {
    /// Creates a registry with an entropy-seeded random source.
    pub fn new(config: RegistryConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Creates a registry with a caller-supplied random source.
    ///
    /// Tests pass a seeded `StdRng` to make spawn positions and sprite
    /// choices deterministic.
    pub fn with_rng(config: RegistryConfig, rng: StdRng) -> Self {
        Self {
            config,
            state: Mutex::new(RegistryState {
                avatars: Vec::new(),
                rng,
            }),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Spawns a new avatar and returns its id.
    ///
    /// The id is the current record count plus one. Ids are only unique
    /// because assignment and append share the critical section and records
    /// are never removed; both invariants are load-bearing.
    pub async fn create(&self, now_ms: u64) -> u32 {
        let mut state = self.state.lock().await;

        let id = state.avatars.len() as u32 + 1;
        let x = state.rng.gen_range(0..self.config.max_x);
        let y = state.rng.gen_range(0..self.config.max_y);
        let sprite = state.rng.gen_range(1..=self.config.sprite_count);

        state.avatars.push(AvatarRecord {
            id,
            x,
            y,
            image: format!("{}.png", sprite),
            chat_text: String::new(),
            chat_expiry: now_ms,
            last_seen: now_ms,
        });

        info!("Avatar {} spawned at ({}, {})", id, x, y);
        id
    }

    /// Lists every recently-seen avatar, in insertion order.
    ///
    /// Avatars whose `last_seen` is older than the liveness window are
    /// skipped, not deleted. Visiting a record whose chat has expired
    /// clears the text in place; holding the lock across the whole
    /// traversal keeps that clear from racing a concurrent `speak`.
    pub async fn list(&self, now_ms: u64) -> Vec<AvatarView> {
        let mut state = self.state.lock().await;
        let window = self.config.liveness_window_ms;

        let mut views = Vec::new();
        for avatar in state.avatars.iter_mut() {
            if now_ms.saturating_sub(avatar.last_seen) > window {
                continue;
            }
            if now_ms > avatar.chat_expiry && !avatar.chat_text.is_empty() {
                debug!("Avatar {} chat expired", avatar.id);
                avatar.chat_text.clear();
            }
            views.push(avatar.view());
        }
        views
    }

    /// Moves an avatar to the requested tile.
    ///
    /// Out-of-range coordinates are clamped onto the grid rather than
    /// rejected; the move itself is taken on trust. `x`, `y` and
    /// `last_seen` become visible together or not at all.
    pub async fn update_position(
        &self,
        id: u32,
        x: i32,
        y: i32,
        now_ms: u64,
    ) -> Result<(), RegistryError> {
        let mut state = self.state.lock().await;

        let avatar = state
            .avatars
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(RegistryError::AvatarNotFound(id))?;

        avatar.x = x.clamp(0, self.config.max_x - 1);
        avatar.y = y.clamp(0, self.config.max_y - 1);
        avatar.last_seen = now_ms;

        debug!("Avatar {} moved to ({}, {})", id, avatar.x, avatar.y);
        Ok(())
    }

    /// Puts a message above an avatar's head.
    ///
    /// Text is stored verbatim; the transport layer owns any sanitization.
    /// `chat_text`, `chat_expiry` and `last_seen` are written as one
    /// update.
    pub async fn speak(&self, id: u32, text: &str, now_ms: u64) -> Result<(), RegistryError> {
        let mut state = self.state.lock().await;

        let avatar = state
            .avatars
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(RegistryError::AvatarNotFound(id))?;

        avatar.chat_text = text.to_string();
        avatar.chat_expiry = now_ms + self.config.chat_duration_ms;
        avatar.last_seen = now_ms;

        debug!("Avatar {} says {:?}", id, text);
        Ok(())
    }

    /// Number of avatars ever created.
    pub async fn len(&self) -> usize {
        self.state.lock().await.avatars.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.avatars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_registry() -> AvatarRegistry {
        AvatarRegistry::with_rng(RegistryConfig::default(), StdRng::seed_from_u64(7))
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let registry = seeded_registry();
        assert_eq!(registry.create(1_000).await, 1);
        assert_eq!(registry.create(1_000).await, 2);
        assert_eq!(registry.create(1_000).await, 3);
        assert_eq!(registry.len().await, 3);
    }

    #[tokio::test]
    async fn test_create_spawns_inside_grid() {
        let registry = seeded_registry();
        for _ in 0..50 {
            registry.create(1_000).await;
        }
        for view in registry.list(1_000).await {
            assert!((0..16).contains(&view.x));
            assert!((0..12).contains(&view.y));
            assert!(view.image.ends_with(".png"));
        }
    }

    #[tokio::test]
    async fn test_new_avatar_has_no_chat() {
        let registry = seeded_registry();
        let id = registry.create(1_000).await;
        let views = registry.list(1_000).await;
        assert_eq!(views[0].id, id);
        assert_eq!(views[0].text, "");
    }

    #[tokio::test]
    async fn test_update_clamps_coordinates() {
        let registry = seeded_registry();
        let id = registry.create(1_000).await;

        registry.update_position(id, 20, -5, 2_000).await.unwrap();
        let views = registry.list(2_000).await;
        assert_eq!((views[0].x, views[0].y), (15, 0));

        registry
            .update_position(id, i32::MIN, i32::MAX, 3_000)
            .await
            .unwrap();
        let views = registry.list(3_000).await;
        assert_eq!((views[0].x, views[0].y), (0, 11));
    }

    #[tokio::test]
    async fn test_unknown_id_is_reported_and_harmless() {
        let registry = seeded_registry();
        registry.create(1_000).await;

        let err = registry.update_position(99, 1, 1, 2_000).await.unwrap_err();
        assert!(matches!(err, RegistryError::AvatarNotFound(99)));
        let err = registry.speak(99, "hi", 2_000).await.unwrap_err();
        assert!(matches!(err, RegistryError::AvatarNotFound(99)));

        // No record appeared as a side effect.
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_chat_expires_during_list() {
        let registry = seeded_registry();
        let id = registry.create(1_000).await;
        registry.speak(id, "hi", 1_000).await.unwrap();

        let views = registry.list(1_000 + 4_999).await;
        assert_eq!(views[0].text, "hi");

        let views = registry.list(1_000 + 5_001).await;
        assert_eq!(views[0].text, "");

        // No resurrection on a later list.
        let views = registry.list(1_000 + 6_000).await;
        assert_eq!(views[0].text, "");
    }

    #[tokio::test]
    async fn test_speak_overwrites_pending_chat() {
        let registry = seeded_registry();
        let id = registry.create(1_000).await;
        registry.speak(id, "first", 1_000).await.unwrap();
        registry.speak(id, "second", 2_000).await.unwrap();

        let views = registry.list(2_000).await;
        assert_eq!(views[0].text, "second");

        // Expiry follows the second message, not the first.
        let views = registry.list(6_500).await;
        assert_eq!(views[0].text, "second");
        let views = registry.list(7_001).await;
        assert_eq!(views[0].text, "");
    }

    #[tokio::test]
    async fn test_liveness_window_boundaries() {
        let registry = seeded_registry();
        let stale = registry.create(1_000).await;
        let fresh = registry.create(1_000).await;

        let now = 100_000;
        registry
            .update_position(stale, 0, 0, now - 30_001)
            .await
            .unwrap();
        registry
            .update_position(fresh, 0, 0, now - 29_999)
            .await
            .unwrap();

        let ids: Vec<u32> = registry.list(now).await.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![fresh]);
    }

    #[tokio::test]
    async fn test_hidden_avatar_reappears_when_seen_again() {
        let registry = seeded_registry();
        let id = registry.create(1_000).await;

        assert!(registry.list(1_000 + 60_000).await.is_empty());

        // The record was never deleted, so touching it brings it back.
        registry
            .update_position(id, 3, 3, 1_000 + 60_000)
            .await
            .unwrap();
        let views = registry.list(1_000 + 60_000).await;
        assert_eq!(views[0].id, id);
        assert_eq!((views[0].x, views[0].y), (3, 3));
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let registry = seeded_registry();
        for _ in 0..5 {
            registry.create(1_000).await;
        }
        let ids: Vec<u32> = registry.list(1_000).await.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_custom_grid_config() {
        let config = RegistryConfig {
            max_x: 4,
            max_y: 3,
            sprite_count: 1,
            liveness_window_ms: 100,
            chat_duration_ms: 50,
        };
        let registry = AvatarRegistry::with_rng(config, StdRng::seed_from_u64(1));
        let id = registry.create(0).await;

        registry.update_position(id, 100, 100, 0).await.unwrap();
        let views = registry.list(0).await;
        assert_eq!((views[0].x, views[0].y), (3, 2));
        assert_eq!(views[0].image, "1.png");

        registry.speak(id, "hey", 10).await.unwrap();
        assert_eq!(registry.list(59).await[0].text, "hey");
        assert_eq!(registry.list(61).await[0].text, "");
    }
}
