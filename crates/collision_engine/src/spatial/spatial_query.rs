//! Abstract spatial query interface for broad-phase collision detection
//!
//! Based on Game Engine Architecture 3rd Edition, Section 13.3.2:
//! "Spatial partitioning schemes... allow us to quickly cull out pairs of
//! objects that cannot possibly be colliding."
//!
//! This abstraction allows swapping different spatial partitioning schemes
//! (grid, octree, BVH, etc.) without changing the collision system.

use crate::foundation::math::Vec3;
use crate::physics::BodyId;
use crate::spatial::AABB;

/// Abstract interface for spatial partitioning used in broad-phase collision detection
///
/// Implementations index bodies by their world-space AABB. Query results are
/// exact with respect to the stored AABBs: no false negatives, and no entry
/// whose box misses the query region.
pub trait SpatialQuery: Send + Sync {
    /// Insert a body with its current bounds and query radius
    fn insert(&mut self, id: BodyId, bounds: AABB, radius: f32) {
        self.update(id, bounds, radius);
    }

    /// Replace any previous registration of `id` with the given bounds
    fn update(&mut self, id: BodyId, bounds: AABB, radius: f32);

    /// Remove a body, returning whether it was registered
    fn remove(&mut self, id: BodyId) -> bool;

    /// Bodies whose stored AABB intersects `bounds`
    fn query_aabb(&self, bounds: &AABB) -> Vec<BodyId>;

    /// Bodies whose AABB centre lies within `radius` plus their own radius of `center`
    fn query_radius(&self, center: Vec3, radius: f32) -> Vec<BodyId>;

    /// Clear all bodies from the spatial structure
    fn clear(&mut self);

    /// Get the number of bodies in the structure
    fn entity_count(&self) -> usize;
}
