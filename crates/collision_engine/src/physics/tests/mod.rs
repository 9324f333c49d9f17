//! Multi-tick scenarios driving the whole collision system

mod queries;

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::CollisionConfig;
use crate::events::{CollisionEvent, ContactKind, ContactPhase};
use crate::foundation::math::Vec3;
use crate::physics::{Body, BodyId, Collider, CollisionSystem};

/// One delivered event, reduced to what the assertions need
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Seen {
    kind: ContactKind,
    phase: ContactPhase,
    a: BodyId,
    b: BodyId,
}

impl Seen {
    fn of<U>(event: &CollisionEvent<'_, U>) -> Self {
        Self {
            kind: event.kind,
            phase: event.phase,
            a: event.result.body_a,
            b: event.result.body_b,
        }
    }
}

type EventLog = Rc<RefCell<Vec<Seen>>>;

fn system() -> CollisionSystem {
    CollisionSystem::new(CollisionConfig::default()).unwrap()
}

/// Subscribe to both kinds, collecting every event in delivery order
fn record(system: &mut CollisionSystem) -> EventLog {
    let log = EventLog::default();
    let sink = Rc::clone(&log);
    system.on_collision(move |event| sink.borrow_mut().push(Seen::of(event)));
    let sink = Rc::clone(&log);
    system.on_trigger(move |event| sink.borrow_mut().push(Seen::of(event)));
    log
}

fn sphere(id: u64, position: Vec3, radius: f32) -> Body {
    Body::new(id, position, Collider::sphere(radius).unwrap())
}

fn position(system: &CollisionSystem, id: u64) -> Vec3 {
    system.body(BodyId(id)).unwrap().position
}
