//! Physics module for collision detection and response
//!
//! Provides collision detection using a uniform spatial hash for the broad
//! phase and simplified positional response for spheres, boxes and capsules.

pub mod body;
pub mod collision;
pub mod collision_layers;
pub mod collision_system;
pub mod error;

#[cfg(test)]
mod tests;

pub use body::{Body, BodyId};
pub use collision::{BoundingSphere, Collider, ColliderShape, Contact, Ray, RayHit};
pub use collision_layers::CollisionLayers;
pub use collision_system::{CollisionResult, CollisionStats, CollisionSystem, PairKey};
pub use error::CollisionError;
