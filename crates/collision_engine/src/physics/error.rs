//! Collision system errors
//!
//! Every variant is a caller mistake surfaced immediately; nothing here is
//! retried or recovered from inside the engine.

use thiserror::Error;

use crate::config::ConfigError;
use crate::physics::BodyId;

/// Errors returned by colliders, the spatial hash and the collision system
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollisionError {
    /// Invalid collider or system configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// `add_entity` with an id that is already registered
    #[error("Entity {0} is already registered")]
    DuplicateEntity(BodyId),

    /// Operation on an id that is not registered
    #[error("Unknown entity: {0}")]
    UnknownEntity(BodyId),
}

impl From<ConfigError> for CollisionError {
    fn from(err: ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}
