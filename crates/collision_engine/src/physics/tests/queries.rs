use super::*;
use approx::assert_relative_eq;

use crate::physics::CollisionLayers;
use crate::spatial::AABB;

/// Small deterministic generator so the scatter is the same on every run
struct Lcg(u64);

impl Lcg {
    fn next_f32(&mut self) -> f32 {
        self.0 = self.0.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        ((self.0 >> 40) as f32) / ((1u64 << 24) as f32)
    }

    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_f32()
    }
}

fn scatter(system: &mut CollisionSystem, count: u64) {
    let mut rng = Lcg(0x5eed);
    for id in 0..count {
        let position = Vec3::new(rng.range(-20.0, 20.0), rng.range(-20.0, 20.0), rng.range(-20.0, 20.0));
        let collider = match id % 3 {
            0 => Collider::sphere(rng.range(0.2, 3.0)).unwrap(),
            1 => Collider::cuboid(Vec3::new(rng.range(0.2, 2.0), rng.range(0.2, 2.0), rng.range(0.2, 2.0))).unwrap(),
            _ => Collider::capsule(rng.range(0.2, 1.0), rng.range(0.5, 4.0)).unwrap(),
        };
        let layer = if id % 2 == 0 { CollisionLayers::ENEMY } else { CollisionLayers::PICKUP };
        // Static so that update() leaves the scatter where it is
        let collider = collider.with_layers(layer, CollisionLayers::ALL).as_static();
        system.add_entity(Body::new(id, position, collider)).unwrap();
    }
}

/// Every body, no spatial index involved
fn brute_force(system: &CollisionSystem, center: Vec3, radius: f32, layer: Option<CollisionLayers>) -> Vec<BodyId> {
    let region = AABB::from_center_extents(center, Vec3::repeat(radius));
    let mut found: Vec<BodyId> = system
        .bodies()
        .filter(|body| layer.map_or(true, |layer| body.collider.layer().intersects(layer)))
        .filter(|body| {
            let bounds = body.collider.bounds();
            bounds.intersects(&region) && (bounds.center() - center).magnitude() <= radius + body.collider.radius()
        })
        .map(|body| body.id)
        .collect();
    found.sort();
    found
}

#[test]
fn test_query_radius_matches_brute_force() {
    let mut system = system();
    scatter(&mut system, 90);
    system.update();

    let mut rng = Lcg(42);
    let mut non_empty = 0;
    for _ in 0..40 {
        let center = Vec3::new(rng.range(-22.0, 22.0), rng.range(-22.0, 22.0), rng.range(-22.0, 22.0));
        let radius = rng.range(0.0, 9.0);
        for layer in [None, Some(CollisionLayers::PICKUP)] {
            let expected = brute_force(&system, center, radius, layer);
            non_empty += usize::from(!expected.is_empty());
            assert_eq!(system.query_radius(center, radius, layer), expected, "center {center:?} radius {radius}");
        }
    }
    assert!(non_empty > 0);
}

#[test]
fn test_query_radius_rejects_bad_input() {
    let mut system = system();
    system.add_entity(sphere(1, Vec3::zeros(), 1.0)).unwrap();

    assert!(system.query_radius(Vec3::zeros(), -1.0, None).is_empty());
    assert!(system.query_radius(Vec3::zeros(), f32::NAN, None).is_empty());
    assert!(system.query_radius(Vec3::new(f32::NAN, 0.0, 0.0), 1.0, None).is_empty());
    assert!(system.query_radius(Vec3::zeros(), f32::INFINITY, None).is_empty());
    assert_eq!(system.query_radius(Vec3::zeros(), 0.0, None), vec![BodyId(1)]);
}

fn target(id: u64, x: f32, layer: CollisionLayers) -> Body {
    let collider = Collider::cuboid(Vec3::repeat(1.0))
        .unwrap()
        .with_layers(layer, CollisionLayers::ALL)
        .as_static();
    Body::new(id, Vec3::new(x, 0.0, 0.0), collider)
}

#[test]
fn test_raycast_nearest_hit() {
    let mut system = system();
    system.add_entity(target(2, 10.0, CollisionLayers::ENVIRONMENT)).unwrap();
    system.add_entity(target(1, 5.0, CollisionLayers::ENEMY)).unwrap();

    let hit = system.raycast(Vec3::zeros(), Vec3::new(2.0, 0.0, 0.0), 100.0).unwrap();
    assert_eq!(hit.body, BodyId(1));
    assert_relative_eq!(hit.distance, 4.0, epsilon = 1e-5);
    assert_relative_eq!(hit.point, Vec3::new(4.0, 0.0, 0.0), epsilon = 1e-5);
    assert_eq!(hit.normal, Vec3::new(-1.0, 0.0, 0.0));

    let filtered = system
        .raycast_filtered(Vec3::zeros(), Vec3::x(), 100.0, Some(CollisionLayers::ENVIRONMENT))
        .unwrap();
    assert_eq!(filtered.body, BodyId(2));
    assert_relative_eq!(filtered.distance, 9.0, epsilon = 1e-5);
}

#[test]
fn test_raycast_misses() {
    let mut system = system();
    system.add_entity(target(1, 5.0, CollisionLayers::ENEMY)).unwrap();

    assert!(system.raycast(Vec3::zeros(), Vec3::x(), 3.0).is_none());
    assert!(system.raycast(Vec3::zeros(), -Vec3::x(), 100.0).is_none());
    assert!(system.raycast(Vec3::zeros(), Vec3::y(), 100.0).is_none());
    assert!(system.raycast(Vec3::zeros(), Vec3::zeros(), 100.0).is_none());
    assert!(system.raycast(Vec3::zeros(), Vec3::x(), -1.0).is_none());
    assert!(system.raycast(Vec3::repeat(f32::NAN), Vec3::new(1.0, 1.0, 1.0), 100.0).is_none());
    assert!(system.raycast(Vec3::new(f32::INFINITY, 0.0, 0.0), -Vec3::x(), f32::INFINITY).is_none());
    assert!(system
        .raycast_filtered(Vec3::zeros(), Vec3::x(), 100.0, Some(CollisionLayers::PLAYER))
        .is_none());
}

#[test]
fn test_raycast_from_inside_and_after_move() {
    let mut system = system();
    system.add_entity(target(1, 5.0, CollisionLayers::ENEMY)).unwrap();

    let inside = system.raycast(Vec3::new(5.0, 0.0, 0.0), Vec3::x(), 100.0).unwrap();
    assert_eq!(inside.body, BodyId(1));
    assert_eq!(inside.distance, 0.0);

    system.update_entity(BodyId(1), Vec3::new(0.0, 8.0, 0.0)).unwrap();
    assert!(system.raycast(Vec3::zeros(), Vec3::x(), 100.0).is_none());
    let up = system.raycast(Vec3::zeros(), Vec3::y(), 100.0).unwrap();
    assert_relative_eq!(up.distance, 7.0, epsilon = 1e-5);
}

#[test]
fn test_huge_floor_with_large_query() {
    let mut system = system();
    let floor = Collider::cuboid(Vec3::new(1.0e5, 1.0, 1.0e5)).unwrap().as_static();
    system.add_entity(Body::new(1, Vec3::new(0.0, -1.0, 0.0), floor)).unwrap();
    system.add_entity(sphere(2, Vec3::new(250.0, 0.3, -40.0), 0.5)).unwrap();

    system.update();

    assert!(system.is_colliding(BodyId(1), BodyId(2)));
    assert!(position(&system, 2).y >= 0.5 - 1e-4);
    assert_eq!(system.query_radius(Vec3::new(250.0, 0.0, -40.0), 1.0e6, None), vec![BodyId(1), BodyId(2)]);
    assert_eq!(system.query_radius(Vec3::new(250.0, 5.0, -40.0), 1.0, None), Vec::<BodyId>::new());
}
