//! Collision layer system for filtering collision detection
//!
//! Based on Game Engine Architecture 3rd Edition, Section 13.3.8:
//! "Most games need to filter collisions... This is typically done via
//! collision layers or groups."

use crate::physics::CollisionError;

bitflags::bitflags! {
    /// Collision layer set. A collider has one set naming the groups it
    /// belongs to (`layer`) and one naming the groups it tests against (`mask`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct CollisionLayers: u32 {
        // Standard game entity layers (bits 0-7)
        /// Player character layer
        const PLAYER = 1 << 0;
        /// Enemy character layer
        const ENEMY = 1 << 1;
        /// Projectiles (bullets, missiles, etc.)
        const PROJECTILE = 1 << 2;
        /// Static environment geometry
        const ENVIRONMENT = 1 << 3;
        /// Trigger volumes (no physical response)
        const TRIGGER = 1 << 4;
        /// Debris and small physics objects
        const DEBRIS = 1 << 5;
        /// Vehicles
        const VEHICLE = 1 << 6;
        /// Pickups and collectibles
        const PICKUP = 1 << 7;
        /// All collision layers, including the user-defined bits 8-31
        const ALL = u32::MAX;
    }
}

impl CollisionLayers {
    /// No collision layer
    pub const NONE: Self = Self::empty();

    /// First bit available for game-defined layers
    pub const FIRST_CUSTOM_BIT: u32 = 8;

    /// A user-defined layer on bit 8..=31
    pub fn custom(bit: u32) -> Result<Self, CollisionError> {
        if !(Self::FIRST_CUSTOM_BIT..u32::BITS).contains(&bit) {
            return Err(CollisionError::Configuration(format!(
                "custom collision layer bit must be in 8..=31, got {bit}"
            )));
        }
        Ok(Self::from_bits_retain(1 << bit))
    }

    /// Check if two entities should collide based on their layers and masks
    ///
    /// A's layer must be in B's mask AND B's layer must be in A's mask, so the
    /// answer never depends on argument order.
    ///
    /// # Example
    /// ```
    /// use collision_engine::physics::CollisionLayers;
    ///
    /// // Player collides with enemies and environment
    /// let player_layer = CollisionLayers::PLAYER;
    /// let player_mask = CollisionLayers::ENEMY | CollisionLayers::ENVIRONMENT;
    ///
    /// // Enemy collides with player and projectiles
    /// let enemy_layer = CollisionLayers::ENEMY;
    /// let enemy_mask = CollisionLayers::PLAYER | CollisionLayers::PROJECTILE;
    ///
    /// assert!(CollisionLayers::should_collide(
    ///     player_layer, player_mask,
    ///     enemy_layer, enemy_mask,
    /// ));
    /// ```
    pub fn should_collide(
        layer_a: Self,
        mask_a: Self,
        layer_b: Self,
        mask_b: Self,
    ) -> bool {
        layer_a.intersects(mask_b) && layer_b.intersects(mask_a)
    }

    /// Helper to create a mask from multiple layers
    pub fn mask(layers: &[Self]) -> Self {
        layers.iter().fold(Self::NONE, |acc, &layer| acc | layer)
    }
}

impl Default for CollisionLayers {
    fn default() -> Self {
        Self::ALL
    }
}
