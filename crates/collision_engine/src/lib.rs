//! # Collision Engine
//!
//! Spatial collision detection and resolution for tick-stepped simulations.
//!
//! ## Features
//!
//! - **Broad Phase**: Uniform spatial hash behind a swappable `SpatialQuery` trait
//! - **Narrow Phase**: Exact sphere-sphere and sphere-box, bounds-based fallback for the rest
//! - **Resolution**: Positional correction with velocity cancellation against static bodies
//! - **Events**: Enter/stay/exit for collisions and triggers, per body or system-wide
//! - **Queries**: Raycasts and radius queries with layer filtering
//!
//! ## Quick Start
//!
//! ```rust
//! use collision_engine::prelude::*;
//!
//! fn main() -> Result<(), CollisionError> {
//!     let mut system: CollisionSystem = CollisionSystem::new(CollisionConfig::default())?;
//!
//!     let wall = Collider::cuboid(Vec3::new(5.0, 5.0, 0.5))?.as_static();
//!     system.add_entity(Body::new(1, Vec3::zeros(), wall))?;
//!
//!     let ball = Body::new(2, Vec3::new(0.0, 0.0, 0.8), Collider::sphere(0.5)?)
//!         .with_velocity(Vec3::new(0.0, 0.0, -1.0));
//!     system.add_entity(ball)?;
//!
//!     system.on_collision(|event| {
//!         if event.phase == ContactPhase::Enter {
//!             println!("{} hit {}", event.result.body_a, event.result.body_b);
//!         }
//!     });
//!
//!     system.update();
//!
//!     let ball = system.body(BodyId(2)).expect("registered");
//!     assert!(ball.position.z >= 1.0);
//!     assert_eq!(ball.velocity, Some(Vec3::zeros()));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;

pub mod config;
pub mod events;
pub mod foundation;
pub mod physics;
pub mod spatial;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        core::{CollisionConfig, Config, ConfigError, ConfigFormat},
        events::{ColliderHooks, CollisionEvent, ContactKind, ContactPhase, SubscriptionHandle},
        foundation::math::Vec3,
        physics::{
            Body, BodyId, Collider, ColliderShape, CollisionError, CollisionLayers,
            CollisionResult, CollisionStats, CollisionSystem, PairKey, RayHit,
        },
        spatial::{SpatialHash, SpatialQuery, AABB},
    };
}
