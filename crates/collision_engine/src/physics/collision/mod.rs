//! Collision shapes, primitives and narrow-phase tests

pub mod narrow;
pub mod primitives;
pub mod shape;

pub use narrow::Contact;
pub use primitives::{BoundingSphere, Ray, RayHit};
pub use shape::{Collider, ColliderShape};
