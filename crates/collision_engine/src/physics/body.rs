//! Bodies registered with the collision system

use std::fmt;

use crate::foundation::math::Vec3;
use crate::physics::collision::Collider;

/// Externally assigned, stable body identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u64);

impl BodyId {
    /// Get the raw identifier
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl From<u64> for BodyId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The unit registered with the collision system
///
/// `position` and `velocity` are written by the owning movement code between
/// ticks and, for non-static bodies, by the resolution step during
/// [`update`](crate::physics::CollisionSystem::update). `user_data` is never
/// looked at; it is handed to event callbacks as-is.
#[derive(Debug, Clone)]
pub struct Body<U = ()> {
    /// Stable identifier
    pub id: BodyId,
    /// World-space position (the collider offset is applied on top)
    pub position: Vec3,
    /// Shape, filtering and flags
    pub collider: Collider,
    /// Linear velocity, if the body moves on its own
    pub velocity: Option<Vec3>,
    /// Opaque payload passed through to callbacks
    pub user_data: U,
}

impl Body<()> {
    /// Body without user data
    pub fn new(id: u64, position: Vec3, collider: Collider) -> Self {
        Self::with_user_data(id, position, collider, ())
    }
}

impl<U> Body<U> {
    /// Body carrying a payload for event callbacks
    pub fn with_user_data(id: u64, position: Vec3, collider: Collider, user_data: U) -> Self {
        Self {
            id: BodyId(id),
            position,
            collider,
            velocity: None,
            user_data,
        }
    }

    /// Builder-style velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = Some(velocity);
        self
    }

    /// World-space centre of the collider shape
    pub fn center(&self) -> Vec3 {
        self.collider.center(self.position)
    }

    /// Recompute the collider's cached bounds from the current position
    pub(crate) fn refresh_bounds(&mut self) {
        self.collider.update_bounds(self.position);
    }
}
