//! Core collision detection system
//!
//! Based on Game Engine Architecture 3rd Edition, Chapter 13:
//! "The collision detection system is typically split into two phases:
//! broad-phase and narrow-phase."
//!
//! [`CollisionSystem`] owns the body arena, the broad-phase index and the set
//! of pairs that overlapped last tick. One call to [`CollisionSystem::update`]
//! detects, classifies and resolves overlaps, then reports enter/stay/exit
//! transitions synchronously.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::{debug, trace, warn};
use slotmap::{new_key_type, SlotMap};

use crate::core::CollisionConfig;
use crate::config::Config;
use crate::events::{
    ColliderHooks, CollisionEvent, ContactKind, ContactPhase, EventDispatcher, SubscriptionHandle,
};
use crate::foundation::math::{is_finite, Vec3};
use crate::physics::collision::{narrow, Ray, RayHit};
use crate::physics::{Body, BodyId, CollisionError, CollisionLayers};
use crate::spatial::{SpatialHash, SpatialQuery};

/// Unordered pair of bodies, stored with the smaller id first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    /// Smaller id
    pub first: BodyId,
    /// Larger id
    pub second: BodyId,
}

impl PairKey {
    /// Create a new pair key (always stores the smaller id first for consistency)
    pub fn new(a: BodyId, b: BodyId) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// True if `id` is one of the two bodies
    pub fn contains(&self, id: BodyId) -> bool {
        self.first == id || self.second == id
    }
}

/// Contact data for one overlapping pair on one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// First body (the smaller id)
    pub body_a: BodyId,
    /// Second body
    pub body_b: BodyId,
    /// Contact point in world space
    pub point: Vec3,
    /// Unit normal pointing from A towards B
    pub normal: Vec3,
    /// Overlap depth along the normal (>= 0)
    pub penetration: f32,
}

/// Counters from the most recent `update()`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionStats {
    /// Registered bodies
    pub bodies: usize,
    /// Candidate pairs that passed layer filtering
    pub candidate_pairs: usize,
    /// Pairs found overlapping by the narrow phase
    pub contacts: usize,
    /// Of those, pairs reported as triggers
    pub triggers: usize,
    /// Pairs that moved at least one body
    pub resolved: usize,
    /// Enter transitions emitted
    pub enters: usize,
    /// Stay transitions emitted
    pub stays: usize,
    /// Exit transitions emitted
    pub exits: usize,
}

#[derive(Debug, Clone, Copy)]
struct ActivePair {
    kind: ContactKind,
    result: CollisionResult,
}

new_key_type! {
    struct BodyKey;
}

/// Collision detection and resolution for a set of bodies (GEA 13.3)
///
/// Single-owner, single-thread: callbacks run inside `update()` and the
/// `*_entity` calls, and receive event data only, never the system itself.
pub struct CollisionSystem<U = ()> {
    config: CollisionConfig,

    /// Spatial partitioning structure for broad-phase
    spatial_query: Box<dyn SpatialQuery>,

    /// Body arena; iteration order is slot order, which keeps resolution
    /// order stable for a given sequence of add/remove calls
    bodies: SlotMap<BodyKey, Body<U>>,

    /// External id -> arena slot
    index: HashMap<BodyId, BodyKey>,

    /// Pairs overlapping as of the last tick
    active_pairs: BTreeMap<PairKey, ActivePair>,

    events: EventDispatcher<U>,

    stats: CollisionStats,
}

impl<U> CollisionSystem<U> {
    /// Create a collision system backed by a spatial hash sized from `config`
    pub fn new(config: CollisionConfig) -> Result<Self, CollisionError> {
        config.validate()?;
        let spatial = SpatialHash::new(config.cell_size)?;
        Self::with_spatial_query(config, Box::new(spatial))
    }

    /// Create a collision system with the given spatial query implementation
    pub fn with_spatial_query(
        config: CollisionConfig,
        spatial_query: Box<dyn SpatialQuery>,
    ) -> Result<Self, CollisionError> {
        config.validate()?;
        debug!("Collision system created (cell size {})", config.cell_size);
        Ok(Self {
            config,
            spatial_query,
            bodies: SlotMap::with_key(),
            index: HashMap::new(),
            active_pairs: BTreeMap::new(),
            events: EventDispatcher::new(),
            stats: CollisionStats::default(),
        })
    }

    /// Active configuration
    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Register a body. Its bounds are computed and indexed immediately.
    pub fn add_entity(&mut self, mut body: Body<U>) -> Result<(), CollisionError> {
        if self.index.contains_key(&body.id) {
            warn!("add_entity: {} is already registered", body.id);
            return Err(CollisionError::DuplicateEntity(body.id));
        }
        check_finite("position", body.position)?;
        if let Some(velocity) = body.velocity {
            check_finite("velocity", velocity)?;
        }

        body.refresh_bounds();
        let id = body.id;
        self.spatial_query
            .insert(id, *body.collider.bounds(), body.collider.radius());
        debug!(
            "Added {} ({}, trigger: {}, static: {})",
            id,
            body.collider.shape().name(),
            body.collider.is_trigger(),
            body.collider.is_static()
        );
        let key = self.bodies.insert(body);
        self.index.insert(id, key);
        Ok(())
    }

    /// Unregister a body. Active pairs involving it get their exit events now.
    pub fn remove_entity(&mut self, id: BodyId) -> Result<(), CollisionError> {
        let Some(&key) = self.index.get(&id) else {
            warn!("remove_entity: {id} is not registered");
            return Err(CollisionError::UnknownEntity(id));
        };

        let ended: Vec<PairKey> = self
            .active_pairs
            .keys()
            .filter(|pair| pair.contains(id))
            .copied()
            .collect();

        let Self { bodies, index, events, active_pairs, stats, .. } = self;
        for pair in ended {
            if let Some(active) = active_pairs.remove(&pair) {
                stats.exits += 1;
                emit(events, bodies, index, active.kind, ContactPhase::Exit, &active.result);
            }
        }

        self.spatial_query.remove(id);
        self.events.remove_hooks(id);
        self.index.remove(&id);
        self.bodies.remove(key);
        debug!("Removed {id}");
        Ok(())
    }

    /// Move a body. Bounds are recomputed and re-indexed immediately.
    pub fn update_entity(&mut self, id: BodyId, position: Vec3) -> Result<(), CollisionError> {
        let key = self.key_of(id)?;
        check_finite("position", position)?;
        self.bodies[key].position = position;
        self.reindex(key);
        Ok(())
    }

    /// Replace a body's velocity
    pub fn set_velocity(&mut self, id: BodyId, velocity: Option<Vec3>) -> Result<(), CollisionError> {
        let key = self.key_of(id)?;
        if let Some(velocity) = velocity {
            check_finite("velocity", velocity)?;
        }
        self.bodies[key].velocity = velocity;
        Ok(())
    }

    /// Change the trigger flag. Pairs already overlapping keep their kind
    /// until they exit.
    pub fn set_trigger(&mut self, id: BodyId, is_trigger: bool) -> Result<(), CollisionError> {
        let key = self.key_of(id)?;
        self.bodies[key].collider.is_trigger = is_trigger;
        Ok(())
    }

    /// Change the static flag
    pub fn set_static(&mut self, id: BodyId, is_static: bool) -> Result<(), CollisionError> {
        let key = self.key_of(id)?;
        self.bodies[key].collider.is_static = is_static;
        Ok(())
    }

    /// Change layer and mask; takes effect on the next `update()`
    pub fn set_layers(
        &mut self,
        id: BodyId,
        layer: CollisionLayers,
        mask: CollisionLayers,
    ) -> Result<(), CollisionError> {
        let key = self.key_of(id)?;
        let collider = &mut self.bodies[key].collider;
        collider.layer = layer;
        collider.mask = mask;
        Ok(())
    }

    /// Attach per-body hooks, replacing any previous set
    pub fn set_hooks(&mut self, id: BodyId, hooks: ColliderHooks<U>) -> Result<(), CollisionError> {
        self.key_of(id)?;
        self.events.set_hooks(id, hooks);
        Ok(())
    }

    /// Detach per-body hooks, returning whether any were set
    pub fn clear_hooks(&mut self, id: BodyId) -> bool {
        self.events.remove_hooks(id)
    }

    /// Subscribe to every collision enter/stay/exit
    pub fn on_collision(
        &mut self,
        callback: impl FnMut(&CollisionEvent<'_, U>) + 'static,
    ) -> SubscriptionHandle {
        debug!("Collision subscriber added");
        self.events.subscribe(ContactKind::Collision, Box::new(callback))
    }

    /// Subscribe to every trigger enter/stay/exit
    pub fn on_trigger(
        &mut self,
        callback: impl FnMut(&CollisionEvent<'_, U>) + 'static,
    ) -> SubscriptionHandle {
        debug!("Trigger subscriber added");
        self.events.subscribe(ContactKind::Trigger, Box::new(callback))
    }

    /// Drop a subscription, returning whether it existed
    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool {
        self.events.unsubscribe(handle)
    }

    /// Number of system-wide subscribers
    pub fn subscriber_count(&self) -> usize {
        self.events.subscriber_count()
    }

    /// Advance one tick: detect, classify, resolve, then report transitions
    pub fn update(&mut self) {
        let mut stats = CollisionStats {
            bodies: self.bodies.len(),
            ..CollisionStats::default()
        };
        let mut current: BTreeMap<PairKey, ActivePair> = BTreeMap::new();
        let mut processed: HashSet<PairKey> = HashSet::new();

        let keys: Vec<BodyKey> = self.bodies.keys().collect();
        for key in keys {
            let (id, bounds) = {
                let body = &self.bodies[key];
                (body.id, *body.collider.bounds())
            };

            // Phase 1: Broad-phase
            for other_id in self.spatial_query.query_aabb(&bounds) {
                if other_id == id {
                    continue;
                }
                let pair = PairKey::new(id, other_id);
                if processed.contains(&pair) {
                    continue;
                }
                let (Some(&a_key), Some(&b_key)) =
                    (self.index.get(&pair.first), self.index.get(&pair.second))
                else {
                    continue;
                };

                let (a, b) = (&self.bodies[a_key], &self.bodies[b_key]);
                if !a.collider.can_collide_with(&b.collider) {
                    continue;
                }
                processed.insert(pair);
                stats.candidate_pairs += 1;

                // Phase 2: Narrow-phase
                let Some(contact) = narrow::test_pair(
                    &a.collider,
                    a.position,
                    &b.collider,
                    b.position,
                    self.config.approximate_penetration,
                ) else {
                    continue;
                };

                let result = CollisionResult {
                    body_a: pair.first,
                    body_b: pair.second,
                    point: contact.point,
                    normal: contact.normal,
                    penetration: contact.penetration,
                };

                // The kind is decided on entry and kept for the whole overlap
                let kind = match self.active_pairs.get(&pair) {
                    Some(previous) => previous.kind,
                    None if a.collider.is_trigger() || b.collider.is_trigger() => ContactKind::Trigger,
                    None => ContactKind::Collision,
                };

                stats.contacts += 1;
                match kind {
                    ContactKind::Trigger => stats.triggers += 1,
                    ContactKind::Collision => {
                        if self.resolve(a_key, b_key, &result) {
                            stats.resolved += 1;
                        }
                    }
                }
                current.insert(pair, ActivePair { kind, result });
            }
        }

        let previous = std::mem::replace(&mut self.active_pairs, current);
        let Self { bodies, index, events, active_pairs, .. } = self;

        for (pair, ended) in &previous {
            if !active_pairs.contains_key(pair) {
                stats.exits += 1;
                emit(events, bodies, index, ended.kind, ContactPhase::Exit, &ended.result);
            }
        }
        for (pair, active) in active_pairs.iter() {
            let phase = if previous.contains_key(pair) {
                stats.stays += 1;
                ContactPhase::Stay
            } else {
                stats.enters += 1;
                ContactPhase::Enter
            };
            emit(events, bodies, index, active.kind, phase, &active.result);
        }

        if self.config.debug_enabled {
            trace!("Collision tick: {stats:?}");
        }
        self.stats = stats;
    }

    /// Push a colliding pair apart. Returns whether anything moved.
    fn resolve(&mut self, a_key: BodyKey, b_key: BodyKey, result: &CollisionResult) -> bool {
        let a_static = self.bodies[a_key].collider.is_static();
        let b_static = self.bodies[b_key].collider.is_static();
        let normal = result.normal;
        let depth = result.penetration;

        match (a_static, b_static) {
            (true, true) => return false,
            (true, false) => self.push_off_static(b_key, normal, depth),
            (false, true) => self.push_off_static(a_key, -normal, depth),
            (false, false) => {
                let half = normal * (depth * 0.5);
                self.translate(a_key, -half);
                self.translate(b_key, half);
                if self.config.resolve_dynamic_velocity {
                    cancel_closing_velocity(&mut self.bodies[a_key], -normal);
                    cancel_closing_velocity(&mut self.bodies[b_key], normal);
                }
            }
        }
        trace!(
            "Resolved {} <-> {} (depth {:.4})",
            result.body_a,
            result.body_b,
            depth
        );
        true
    }

    /// Move a dynamic body out of a static one along `direction`
    fn push_off_static(&mut self, key: BodyKey, direction: Vec3, depth: f32) {
        self.translate(key, direction * (depth * self.config.separation_margin));
        cancel_closing_velocity(&mut self.bodies[key], direction);
    }

    fn translate(&mut self, key: BodyKey, delta: Vec3) {
        self.bodies[key].position += delta;
        self.reindex(key);
    }

    /// Recompute bounds and refresh the broad-phase entry right away, so
    /// later pairs in the same tick see the new position
    fn reindex(&mut self, key: BodyKey) {
        let body = &mut self.bodies[key];
        body.refresh_bounds();
        self.spatial_query
            .update(body.id, *body.collider.bounds(), body.collider.radius());
    }

    /// Nearest body whose bounding box the ray enters within `max_distance`
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        self.raycast_filtered(origin, direction, max_distance, None)
    }

    /// [`raycast`](Self::raycast) restricted to bodies on `layer_filter`
    pub fn raycast_filtered(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layer_filter: Option<CollisionLayers>,
    ) -> Option<RayHit> {
        if max_distance.is_nan() || max_distance < 0.0 || !is_finite(&origin) {
            return None;
        }
        let ray = Ray::new(origin, direction)?;

        let mut nearest: Option<RayHit> = None;
        for body in self.bodies.values() {
            if layer_filter.is_some_and(|filter| !body.collider.layer().intersects(filter)) {
                continue;
            }
            let Some((distance, normal)) = body
                .collider
                .bounds()
                .intersect_ray_detailed(ray.origin, ray.direction)
            else {
                continue;
            };
            if distance > max_distance {
                continue;
            }
            if nearest.map_or(true, |hit| distance < hit.distance) {
                nearest = Some(RayHit {
                    body: body.id,
                    distance,
                    point: ray.point_at(distance),
                    normal,
                });
            }
        }
        nearest
    }

    /// Bodies near `center`, optionally only those on `layer_filter`.
    /// Sorted by id.
    pub fn query_radius(
        &self,
        center: Vec3,
        radius: f32,
        layer_filter: Option<CollisionLayers>,
    ) -> Vec<BodyId> {
        if !radius.is_finite() || radius < 0.0 || !is_finite(&center) {
            return Vec::new();
        }
        let mut found: Vec<BodyId> = self
            .spatial_query
            .query_radius(center, radius)
            .into_iter()
            .filter(|id| match layer_filter {
                None => true,
                Some(filter) => self
                    .body(*id)
                    .is_some_and(|body| body.collider.layer().intersects(filter)),
            })
            .collect();
        found.sort_unstable();
        found
    }

    /// Drop every body, hook and pair. No exit events are sent;
    /// system-wide subscribers are kept.
    pub fn clear(&mut self) {
        debug!("Clearing {} bodies and {} active pairs", self.bodies.len(), self.active_pairs.len());
        self.spatial_query.clear();
        self.bodies.clear();
        self.index.clear();
        self.active_pairs.clear();
        self.events.clear_hooks();
        self.stats = CollisionStats::default();
    }

    /// Look up a registered body
    pub fn body(&self, id: BodyId) -> Option<&Body<U>> {
        self.index.get(&id).map(|&key| &self.bodies[key])
    }

    /// Check if a body is registered
    pub fn contains(&self, id: BodyId) -> bool {
        self.index.contains_key(&id)
    }

    /// Get the number of registered bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// All registered bodies in arena order
    pub fn bodies(&self) -> impl Iterator<Item = &Body<U>> {
        self.bodies.values()
    }

    /// Pairs overlapping as of the last `update()`, ordered by pair key
    pub fn active_pairs(&self) -> impl Iterator<Item = (PairKey, ContactKind, &CollisionResult)> {
        self.active_pairs
            .iter()
            .map(|(pair, active)| (*pair, active.kind, &active.result))
    }

    /// Current contact between two bodies, if any
    pub fn contact(&self, a: BodyId, b: BodyId) -> Option<(ContactKind, &CollisionResult)> {
        self.active_pairs
            .get(&PairKey::new(a, b))
            .map(|active| (active.kind, &active.result))
    }

    /// Check if two bodies overlapped on the last `update()`
    pub fn is_colliding(&self, a: BodyId, b: BodyId) -> bool {
        self.contact(a, b).is_some()
    }

    /// Counters from the last `update()`
    pub fn last_stats(&self) -> &CollisionStats {
        &self.stats
    }

    /// Get spatial query for direct access (e.g., for visualization)
    pub fn spatial_query(&self) -> &dyn SpatialQuery {
        self.spatial_query.as_ref()
    }

    fn key_of(&self, id: BodyId) -> Result<BodyKey, CollisionError> {
        self.index.get(&id).copied().ok_or_else(|| {
            warn!("{id} is not registered");
            CollisionError::UnknownEntity(id)
        })
    }
}

/// Remove the part of a body's velocity that points against `direction`.
/// Tangential velocity is left alone.
fn cancel_closing_velocity<U>(body: &mut Body<U>, direction: Vec3) {
    if let Some(velocity) = body.velocity.as_mut() {
        let closing = velocity.dot(&direction);
        if closing < 0.0 {
            *velocity -= direction * closing;
        }
    }
}

fn check_finite(what: &str, v: Vec3) -> Result<(), CollisionError> {
    if is_finite(&v) {
        Ok(())
    } else {
        Err(CollisionError::Configuration(format!(
            "{what} must be finite, got ({}, {}, {})",
            v.x, v.y, v.z
        )))
    }
}

/// Build the event for one transition and hand it to the dispatcher
fn emit<U>(
    events: &mut EventDispatcher<U>,
    bodies: &SlotMap<BodyKey, Body<U>>,
    index: &HashMap<BodyId, BodyKey>,
    kind: ContactKind,
    phase: ContactPhase,
    result: &CollisionResult,
) {
    let user_data = |id: BodyId| index.get(&id).map(|&key| &bodies[key].user_data);
    let (Some(user_data_a), Some(user_data_b)) = (user_data(result.body_a), user_data(result.body_b)) else {
        warn!("Dropping {phase:?} event for {} / {}: body missing", result.body_a, result.body_b);
        return;
    };
    events.dispatch(&CollisionEvent {
        kind,
        phase,
        result,
        user_data_a,
        user_data_b,
    });
}
