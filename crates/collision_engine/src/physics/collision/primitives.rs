//! Rays and bounding spheres
//!
//! Rays feed the system raycast; bounding spheres back the exact
//! sphere-sphere contact test.

use crate::foundation::math::{normalize_or_up, Vec3, EPSILON};
use crate::physics::BodyId;

/// Half-line used by raycasts
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// World-space start point
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray, or `None` when `direction` has no length
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let length = direction.magnitude();
        if !length.is_finite() || length <= EPSILON {
            return None;
        }
        Some(Self {
            origin,
            direction: direction / length,
        })
    }

    /// Point `t` units along the ray
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Nearest body found by a raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Body whose bounds were entered
    pub body: BodyId,
    /// Distance from the origin to the entry point (0 when starting inside)
    pub distance: f32,
    /// Entry point in world space
    pub point: Vec3,
    /// Normal of the bounding-box face that was entered
    pub normal: Vec3,
}

/// World-space sphere used by the narrow phase
#[derive(Debug, Clone, Copy)]
pub struct BoundingSphere {
    /// Centre in world space
    pub center: Vec3,
    /// Radius
    pub radius: f32,
}

impl BoundingSphere {
    /// Sphere of `radius` around `center`
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if this sphere overlaps another (touching does not count)
    pub fn intersects(&self, other: &BoundingSphere) -> bool {
        let reach = self.radius + other.radius;
        (other.center - self.center).magnitude_squared() < reach * reach
    }

    /// Overlap depth, 0.0 when apart or touching
    pub fn penetration_depth(&self, other: &BoundingSphere) -> f32 {
        let reach = self.radius + other.radius;
        (reach - (other.center - self.center).magnitude()).max(0.0)
    }

    /// Unit direction from this sphere's centre towards `other`'s,
    /// the up axis when the centres coincide
    pub fn direction_to(&self, other: &BoundingSphere) -> Vec3 {
        normalize_or_up(other.center - self.center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ray_normalizes_direction() {
        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -5.0)).unwrap();
        assert_relative_eq!(ray.direction.magnitude(), 1.0, epsilon = 1e-6);
        assert_eq!(ray.point_at(2.0), Vec3::new(0.0, 0.0, -2.0));
    }

    #[test]
    fn test_ray_rejects_zero_direction() {
        assert!(Ray::new(Vec3::zeros(), Vec3::zeros()).is_none());
    }

    #[test]
    fn test_sphere_overlap_is_strict() {
        let a = BoundingSphere::new(Vec3::zeros(), 1.0);
        let touching = BoundingSphere::new(Vec3::new(2.0, 0.0, 0.0), 1.0);
        let overlapping = BoundingSphere::new(Vec3::new(1.5, 0.0, 0.0), 1.0);

        assert!(!a.intersects(&touching));
        assert!(a.intersects(&overlapping));
        assert_relative_eq!(a.penetration_depth(&overlapping), 0.5, epsilon = 1e-6);
        assert_eq!(a.penetration_depth(&touching), 0.0);
    }

    #[test]
    fn test_direction_between_coincident_centres() {
        let a = BoundingSphere::new(Vec3::new(1.0, 1.0, 1.0), 1.0);
        assert_eq!(a.direction_to(&a), Vec3::new(0.0, 1.0, 0.0));
    }
}
