//! Bounce demo
//!
//! Drives the collision engine the way a game loop would: a fixed-step
//! stepper integrates velocities, writes positions back with
//! `update_entity`, then calls `update()` once per tick.
//!
//! The scene is a static wall, a ball thrown at it, a drifting crate and a
//! pickup zone the crate passes through. Every event is logged.
//!
//! Usage: `bounce_demo [config.toml|config.ron]`

use std::cell::RefCell;
use std::rc::Rc;

use collision_engine::prelude::*;

const TICK_RATE: f32 = 60.0;
const TICKS: u32 = 180;

const WALL: BodyId = BodyId(1);
const BALL: BodyId = BodyId(2);
const CRATE: BodyId = BodyId(3);
const ZONE: BodyId = BodyId(4);

/// Payload handed back to callbacks
#[derive(Debug, Clone, Copy)]
struct Tag(&'static str);

fn load_config() -> Result<CollisionConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading collision config from {path}");
            CollisionConfig::load_from_file(path)
        }
        None => Ok(CollisionConfig::default()),
    }
}

fn build_scene(system: &mut CollisionSystem<Tag>) -> Result<(), CollisionError> {
    let wall = Collider::cuboid(Vec3::new(1.0, 1.0, 1.0))?
        .as_static()
        .with_layers(CollisionLayers::ENVIRONMENT, CollisionLayers::ALL);
    system.add_entity(Body::with_user_data(WALL.id(), Vec3::zeros(), wall, Tag("wall")))?;

    let ball = Collider::sphere(0.5)?.with_layers(CollisionLayers::PROJECTILE, CollisionLayers::ENVIRONMENT);
    system.add_entity(
        Body::with_user_data(BALL.id(), Vec3::new(0.0, 0.0, 5.0), ball, Tag("ball"))
            .with_velocity(Vec3::new(0.0, 0.0, -10.0)),
    )?;

    let crate_box = Collider::cuboid(Vec3::new(0.4, 0.4, 0.4))?
        .with_layers(CollisionLayers::DEBRIS, CollisionLayers::ALL);
    system.add_entity(
        Body::with_user_data(CRATE.id(), Vec3::new(-6.0, 3.0, 0.0), crate_box, Tag("crate"))
            .with_velocity(Vec3::new(3.0, 0.0, 0.0)),
    )?;

    let zone = Collider::sphere(1.5)?
        .as_trigger()
        .with_layers(CollisionLayers::PICKUP, CollisionLayers::DEBRIS);
    system.add_entity(Body::with_user_data(ZONE.id(), Vec3::new(0.0, 3.0, 0.0), zone, Tag("zone")))?;

    let pickups = Rc::new(RefCell::new(0u32));
    let counter = Rc::clone(&pickups);
    system.set_hooks(
        ZONE,
        ColliderHooks::new()
            .on_trigger_enter(move |event| {
                *counter.borrow_mut() += 1;
                log::info!("Zone entered by {}", visitor(event));
            })
            .on_trigger_exit(move |event| {
                log::info!("Zone left by {} ({} entries so far)", visitor(event), pickups.borrow());
            }),
    )?;
    Ok(())
}

/// Name of whatever is overlapping the zone
fn visitor(event: &CollisionEvent<'_, Tag>) -> &'static str {
    event
        .other(ZONE)
        .and_then(|id| event.user_data_of(id))
        .map_or("?", |tag| tag.0)
}

/// Advance every moving body by one fixed step
fn step(system: &mut CollisionSystem<Tag>, dt: f32) -> Result<(), CollisionError> {
    let moves: Vec<(BodyId, Vec3)> = system
        .bodies()
        .filter(|body| !body.collider.is_static())
        .filter_map(|body| body.velocity.map(|v| (body.id, body.position + v * dt)))
        .collect();
    for (id, position) in moves {
        system.update_entity(id, position)?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = load_config()?;
    let mut system: CollisionSystem<Tag> = CollisionSystem::new(config)?;

    system.on_collision(|event| {
        log::info!(
            "Collision {:?}: {} / {} depth {:.3}",
            event.phase,
            event.user_data_a.0,
            event.user_data_b.0,
            event.result.penetration
        );
    });
    system.on_trigger(|event| {
        log::debug!("Trigger {:?}: {} / {}", event.phase, event.user_data_a.0, event.user_data_b.0);
    });

    build_scene(&mut system)?;

    let dt = 1.0 / TICK_RATE;
    for tick in 0..TICKS {
        step(&mut system, dt)?;
        system.update();

        let stats = system.last_stats();
        if stats.enters + stats.exits > 0 {
            log::info!("Tick {tick}: {} contacts, {} resolved", stats.contacts, stats.resolved);
        }
    }

    if let Some(ball) = system.body(BALL) {
        log::info!("Ball at rest against the wall: z = {:.4}", ball.position.z);
    }
    if let Some(hit) = system.raycast(Vec3::new(0.0, 0.0, 10.0), -Vec3::z(), 20.0) {
        log::info!("Raycast from above the wall hits {} at distance {:.3}", hit.body, hit.distance);
    }
    let near_zone = system.query_radius(Vec3::new(0.0, 3.0, 0.0), 5.0, Some(CollisionLayers::DEBRIS));
    log::info!("Debris within 5 units of the zone: {near_zone:?}");

    Ok(())
}
