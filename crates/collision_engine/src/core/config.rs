//! # Collision Configuration
//!
//! Tunables for the collision system. Every field has a default, so a config
//! file only needs to name the values it overrides:
//!
//! ```toml
//! cell_size = 2.0
//! debug_enabled = true
//! ```

use serde::{Serialize, Deserialize};

use crate::config::{Config, ConfigError};

/// # Collision System Configuration
///
/// Grid resolution for the broad phase and the constants used by the
/// simplified resolution step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Edge length of one spatial hash cell, in world units
    pub cell_size: f32,
    /// Multiplier applied to penetration when pushing a body off a static one.
    /// Slightly above 1 so the pair does not touch again next tick.
    pub separation_margin: f32,
    /// Penetration reported for pairs without an exact depth test
    /// (box-box and anything involving a capsule)
    pub approximate_penetration: f32,
    /// Also cancel the closing velocity of two dynamic bodies.
    /// Off by default: only the static case touches velocity.
    pub resolve_dynamic_velocity: bool,
    /// Log per-tick statistics at trace level
    pub debug_enabled: bool,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            cell_size: 4.0,
            separation_margin: 1.01,
            approximate_penetration: 0.1,
            resolve_dynamic_velocity: false,
            debug_enabled: false,
        }
    }
}

impl CollisionConfig {
    /// Builder-style cell size override
    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }
}

impl Config for CollisionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "cell_size must be positive and finite, got {}",
                self.cell_size
            )));
        }
        if !(self.separation_margin.is_finite() && self.separation_margin >= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "separation_margin must be >= 1.0, got {}",
                self.separation_margin
            )));
        }
        if !(self.approximate_penetration.is_finite() && self.approximate_penetration >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "approximate_penetration must be >= 0.0, got {}",
                self.approximate_penetration
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFormat;

    #[test]
    fn test_defaults_are_valid() {
        let config = CollisionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.approximate_penetration, 0.1);
        assert_eq!(config.separation_margin, 1.01);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = CollisionConfig::from_str_as("cell_size = 2.5\n", ConfigFormat::Toml).unwrap();
        assert_eq!(config.cell_size, 2.5);
        assert_eq!(config.separation_margin, 1.01);
        assert!(!config.debug_enabled);
    }

    #[test]
    fn test_ron_text_round_trip() {
        let config = CollisionConfig { debug_enabled: true, ..CollisionConfig::default() }
            .with_cell_size(8.0);
        let text = config.to_string_as(ConfigFormat::Ron).unwrap();
        let parsed = CollisionConfig::from_str_as(&text, ConfigFormat::Ron).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad_cell = CollisionConfig::default().with_cell_size(0.0);
        assert!(matches!(bad_cell.validate(), Err(ConfigError::Invalid(_))));

        let bad_margin = CollisionConfig { separation_margin: 0.5, ..CollisionConfig::default() };
        assert!(bad_margin.validate().is_err());

        let parsed = CollisionConfig::from_str_as("cell_size = -1.0\n", ConfigFormat::Toml);
        assert!(matches!(parsed, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("collision_config_{}.toml", std::process::id()));
        let config = CollisionConfig::default().with_cell_size(3.0);

        config.save_to_file(&path).unwrap();
        let loaded = CollisionConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }
}
