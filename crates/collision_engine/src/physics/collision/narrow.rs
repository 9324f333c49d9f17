//! Narrow-phase shape tests
//!
//! GEA 13.3.4: "The narrow phase performs detailed shape-to-shape tests".
//! Sphere-sphere and sphere-box are exact. Box-box and anything involving a
//! capsule only check bounding-box overlap and report a fixed penetration,
//! which is enough to nudge bodies apart but is not a true separation depth.

use crate::foundation::math::{normalize_or_up, Vec3, EPSILON};
use crate::physics::collision::{BoundingSphere, Collider, ColliderShape};
use crate::spatial::AABB;

/// Contact between two colliders, normal pointing from the first to the second
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Contact point in world space
    pub point: Vec3,
    /// Unit normal from A towards B
    pub normal: Vec3,
    /// Overlap depth along the normal (>= 0)
    pub penetration: f32,
}

impl Contact {
    /// Same contact seen from the other body
    fn reversed(self) -> Self {
        Self { normal: -self.normal, ..self }
    }
}

/// Test two colliders whose cached bounds are current.
///
/// `approximate_penetration` is reported for shape pairs without an exact
/// depth computation.
pub fn test_pair(
    a: &Collider,
    position_a: Vec3,
    b: &Collider,
    position_b: Vec3,
    approximate_penetration: f32,
) -> Option<Contact> {
    if !a.bounds().intersects(b.bounds()) {
        return None;
    }

    use ColliderShape::{Box, Capsule, Sphere};
    match (*a.shape(), *b.shape()) {
        (Sphere { radius: radius_a }, Sphere { radius: radius_b }) => sphere_sphere(
            BoundingSphere::new(a.center(position_a), radius_a),
            BoundingSphere::new(b.center(position_b), radius_b),
        ),
        (Sphere { radius }, Box { .. }) => {
            sphere_box(a.center(position_a), radius, b.bounds()).map(Contact::reversed)
        }
        (Box { .. }, Sphere { radius }) => sphere_box(b.center(position_b), radius, a.bounds()),
        (Box { .. }, Box { .. })
        | (Capsule { .. }, Sphere { .. } | Box { .. } | Capsule { .. })
        | (Sphere { .. } | Box { .. }, Capsule { .. }) => {
            Some(bounds_overlap(a.bounds(), b.bounds(), approximate_penetration))
        }
    }
}

/// Exact sphere-sphere contact
pub fn sphere_sphere(a: BoundingSphere, b: BoundingSphere) -> Option<Contact> {
    if !a.intersects(&b) {
        return None;
    }
    let normal = a.direction_to(&b);
    Some(Contact {
        point: a.center + normal * a.radius,
        normal,
        penetration: a.penetration_depth(&b),
    })
}

/// Sphere against a box. The normal points from the box to the sphere.
pub fn sphere_box(center: Vec3, radius: f32, bounds: &AABB) -> Option<Contact> {
    let closest = bounds.closest_point(center);
    let offset = center - closest;
    let distance = offset.magnitude();

    if distance > EPSILON {
        if distance >= radius {
            return None;
        }
        return Some(Contact {
            point: closest,
            normal: offset / distance,
            penetration: radius - distance,
        });
    }

    // A point sphere resting on the surface does not overlap
    if radius <= 0.0 && !strictly_inside(bounds, center) {
        return None;
    }

    // Centre inside the box: leave through the nearest face
    let (normal, depth) = nearest_face(bounds, center);
    Some(Contact {
        point: center + normal * depth,
        normal,
        penetration: radius + depth,
    })
}

fn strictly_inside(bounds: &AABB, point: Vec3) -> bool {
    (0..3).all(|axis| bounds.min[axis] < point[axis] && point[axis] < bounds.max[axis])
}

/// Outward normal and distance of the face closest to an interior point.
/// Ties go to y, then x, then z, and to the positive face within an axis.
fn nearest_face(bounds: &AABB, point: Vec3) -> (Vec3, f32) {
    let mut best_normal = Vec3::new(0.0, 1.0, 0.0);
    let mut best_depth = f32::INFINITY;

    for axis in [1, 0, 2] {
        let to_max = bounds.max[axis] - point[axis];
        let to_min = point[axis] - bounds.min[axis];
        let (depth, sign) = if to_max <= to_min { (to_max, 1.0) } else { (to_min, -1.0) };
        if depth < best_depth {
            best_depth = depth;
            best_normal = Vec3::zeros();
            best_normal[axis] = sign;
        }
    }
    (best_normal, best_depth.max(0.0))
}

/// Bounding-box contact: centre-to-centre normal, midpoint, fixed depth
pub fn bounds_overlap(a: &AABB, b: &AABB, penetration: f32) -> Contact {
    let center_a = a.center();
    let center_b = b.center();
    Contact {
        point: (center_a + center_b) * 0.5,
        normal: normalize_or_up(center_b - center_a),
        penetration,
    }
}
