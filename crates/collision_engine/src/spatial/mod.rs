//! Spatial partitioning for the broad phase

pub mod aabb;
pub mod spatial_hash;
pub mod spatial_query;

pub use aabb::AABB;
pub use spatial_hash::{CellKey, SpatialEntry, SpatialHash};
pub use spatial_query::SpatialQuery;
