//! Collider shapes and the per-body collider descriptor
//!
//! Shapes are stored relative to the body (an offset from its position) and
//! placed in world space on demand. The only cached world-space data is the
//! AABB, which the system refreshes every time the body moves.

use serde::{Serialize, Deserialize};

use crate::foundation::math::Vec3;
use crate::physics::{CollisionError, CollisionLayers};
use crate::spatial::AABB;

/// Collision shape types
///
/// A closed set: narrow-phase dispatch matches on pairs of these, so a new
/// variant cannot be added without visiting every test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    /// Sphere around the collider centre
    Sphere {
        /// Sphere radius
        radius: f32,
    },
    /// Axis-aligned box around the collider centre
    Box {
        /// Half the box size along each axis
        half_extents: Vec3,
    },
    /// Upright capsule, treated as a vertical cylinder for bounds
    Capsule {
        /// Radius in the horizontal plane
        radius: f32,
        /// Total height along y
        height: f32,
    },
}

impl ColliderShape {
    /// Reject shapes that cannot describe real geometry
    pub fn validate(&self) -> Result<(), CollisionError> {
        match *self {
            Self::Sphere { radius } => {
                if !radius.is_finite() || radius < 0.0 {
                    return Err(CollisionError::Configuration(format!(
                        "sphere radius must be finite and non-negative, got {radius}"
                    )));
                }
            }
            Self::Box { half_extents } => {
                if half_extents.iter().any(|e| !e.is_finite() || *e <= 0.0) {
                    return Err(CollisionError::Configuration(format!(
                        "box half extents must be finite and positive, got ({}, {}, {})",
                        half_extents.x, half_extents.y, half_extents.z
                    )));
                }
            }
            Self::Capsule { radius, height } => {
                if !radius.is_finite() || radius < 0.0 || !height.is_finite() || height < 0.0 {
                    return Err(CollisionError::Configuration(format!(
                        "capsule radius and height must be finite and non-negative, got r={radius} h={height}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Half-size of the shape's bounding box
    pub fn half_extents(&self) -> Vec3 {
        match *self {
            Self::Sphere { radius } => Vec3::repeat(radius),
            Self::Box { half_extents } => half_extents,
            // Cylinder approximation: no swept caps
            Self::Capsule { radius, height } => Vec3::new(radius, height * 0.5, radius),
        }
    }

    /// Radius used by radius queries (not by the narrow phase)
    pub fn radius(&self) -> f32 {
        match *self {
            Self::Sphere { radius } => radius,
            Self::Box { half_extents } => half_extents.max(),
            Self::Capsule { radius, height } => radius.max(height * 0.5),
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sphere { .. } => "sphere",
            Self::Box { .. } => "box",
            Self::Capsule { .. } => "capsule",
        }
    }
}

/// Per-body geometric descriptor: shape, filtering and flags
///
/// Event hooks do not live here; they are registered on the system by body id.
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    shape: ColliderShape,
    offset: Vec3,
    pub(crate) layer: CollisionLayers,
    pub(crate) mask: CollisionLayers,
    pub(crate) is_trigger: bool,
    pub(crate) is_static: bool,
    /// Valid only right after `update_bounds`
    bounds: AABB,
}

impl Collider {
    /// Create a collider on all layers, testing against all layers
    pub fn new(shape: ColliderShape) -> Result<Self, CollisionError> {
        shape.validate()?;
        let half = shape.half_extents();
        Ok(Self {
            shape,
            offset: Vec3::zeros(),
            layer: CollisionLayers::ALL,
            mask: CollisionLayers::ALL,
            is_trigger: false,
            is_static: false,
            bounds: AABB::from_center_extents(Vec3::zeros(), half),
        })
    }

    /// Creates a spherical collider with given radius
    pub fn sphere(radius: f32) -> Result<Self, CollisionError> {
        Self::new(ColliderShape::Sphere { radius })
    }

    /// Creates a box collider with given half extents
    pub fn cuboid(half_extents: Vec3) -> Result<Self, CollisionError> {
        Self::new(ColliderShape::Box { half_extents })
    }

    /// Creates an upright capsule collider
    pub fn capsule(radius: f32, height: f32) -> Result<Self, CollisionError> {
        Self::new(ColliderShape::Capsule { radius, height })
    }

    /// Displace the shape centre from the body position
    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    /// Create a collider with specific layer and mask
    pub fn with_layers(mut self, layer: CollisionLayers, mask: CollisionLayers) -> Self {
        self.layer = layer;
        self.mask = mask;
        self
    }

    /// Mark this as a trigger volume
    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    /// Mark this collider as immovable by resolution
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// The collider's shape
    pub fn shape(&self) -> &ColliderShape {
        &self.shape
    }

    /// Offset from body position to shape centre
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Groups this collider belongs to
    pub fn layer(&self) -> CollisionLayers {
        self.layer
    }

    /// Groups this collider tests against
    pub fn mask(&self) -> CollisionLayers {
        self.mask
    }

    /// Overlaps are reported but never resolved
    pub fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    /// Never moved by resolution
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Cached world-space bounds from the last `update_bounds`
    pub fn bounds(&self) -> &AABB {
        &self.bounds
    }

    /// World-space shape centre for a body at `position`
    pub fn center(&self, position: Vec3) -> Vec3 {
        position + self.offset
    }

    /// Recompute the cached AABB for a body at `position`
    pub fn update_bounds(&mut self, position: Vec3) {
        self.bounds = AABB::from_center_extents(self.center(position), self.shape.half_extents());
    }

    /// Both colliders must accept each other's layer
    pub fn can_collide_with(&self, other: &Collider) -> bool {
        CollisionLayers::should_collide(self.layer, self.mask, other.layer, other.mask)
    }

    /// Radius used by radius queries
    pub fn radius(&self) -> f32 {
        self.shape.radius()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_bounds() {
        let mut collider = Collider::sphere(0.5).unwrap();
        collider.update_bounds(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(collider.bounds().min, Vec3::new(0.5, 1.5, 2.5));
        assert_eq!(collider.bounds().max, Vec3::new(1.5, 2.5, 3.5));
    }

    #[test]
    fn test_box_bounds_with_offset() {
        let mut collider = Collider::cuboid(Vec3::new(1.0, 2.0, 3.0))
            .unwrap()
            .with_offset(Vec3::new(0.0, 1.0, 0.0));
        collider.update_bounds(Vec3::zeros());
        assert_eq!(collider.bounds().min, Vec3::new(-1.0, -1.0, -3.0));
        assert_eq!(collider.bounds().max, Vec3::new(1.0, 3.0, 3.0));
    }

    #[test]
    fn test_capsule_is_vertical_cylinder() {
        let mut collider = Collider::capsule(0.5, 4.0).unwrap();
        collider.update_bounds(Vec3::zeros());
        assert_eq!(collider.bounds().extents(), Vec3::new(0.5, 2.0, 0.5));
    }

    #[test]
    fn test_radius_per_shape() {
        assert_eq!(Collider::sphere(2.0).unwrap().radius(), 2.0);
        assert_eq!(Collider::cuboid(Vec3::new(1.0, 3.0, 2.0)).unwrap().radius(), 3.0);
        assert_eq!(Collider::capsule(0.5, 4.0).unwrap().radius(), 2.0);
        assert_eq!(Collider::capsule(1.5, 1.0).unwrap().radius(), 1.5);
    }

    #[test]
    fn test_invalid_shapes_rejected() {
        assert!(matches!(Collider::sphere(-1.0), Err(CollisionError::Configuration(_))));
        assert!(Collider::cuboid(Vec3::new(1.0, 0.0, 1.0)).is_err());
        assert!(Collider::cuboid(Vec3::new(1.0, -1.0, 1.0)).is_err());
        assert!(Collider::capsule(0.5, -2.0).is_err());
        assert!(Collider::sphere(f32::NAN).is_err());
    }

    #[test]
    fn test_can_collide_with_is_symmetric() {
        let wall = Collider::cuboid(Vec3::repeat(1.0))
            .unwrap()
            .with_layers(CollisionLayers::ENVIRONMENT, CollisionLayers::ALL);
        let ball = Collider::sphere(0.5)
            .unwrap()
            .with_layers(CollisionLayers::PROJECTILE, CollisionLayers::ENVIRONMENT);
        let ghost = Collider::sphere(0.5)
            .unwrap()
            .with_layers(CollisionLayers::PLAYER, CollisionLayers::ENEMY);

        assert!(wall.can_collide_with(&ball));
        assert!(ball.can_collide_with(&wall));
        assert!(!ghost.can_collide_with(&wall));
        assert!(!wall.can_collide_with(&ghost));
    }
}
