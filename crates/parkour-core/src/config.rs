//! Course configuration.
//!
//! Every value has a reference default, so an empty JSON object is a valid
//! config. [`CourseConfig::validate`] rejects values the simulation cannot run
//! with.

use std::path::{Path, PathBuf};

use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::Archetype;
use crate::physics::{PHYSICS_DT, SurfaceMaterial, default_gravity};
use crate::player::PlayerTuning;

/// Largest accepted `world.max_delta`, in seconds.
pub const MAX_DELTA_LIMIT: f32 = 0.25;

/// Error type for loading and validating a [`CourseConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tuning of the moving obstacles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObstacleTuning {
    pub material: SurfaceMaterial,
}

impl Default for ObstacleTuning {
    fn default() -> Self {
        Self {
            material: SurfaceMaterial::new(0.2, 0.0),
        }
    }
}

/// World-wide physics and loop settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldTuning {
    pub gravity: [f32; 3],
    /// Largest delta a single tick may integrate; longer frames are clamped.
    pub max_delta: f32,
    /// A player whose centre drops below this height has fallen off.
    pub fall_height: f32,
    pub wall_material: SurfaceMaterial,
    pub floor_material: SurfaceMaterial,
}

impl Default for WorldTuning {
    fn default() -> Self {
        let gravity = default_gravity();
        Self {
            gravity: [gravity.x, gravity.y, gravity.z],
            max_delta: PHYSICS_DT * 6.0,
            fall_height: -5.0,
            wall_material: SurfaceMaterial::new(0.2, 0.0),
            floor_material: SurfaceMaterial::new(0.2, 1.0),
        }
    }
}

impl WorldTuning {
    pub fn gravity(&self) -> Vector<Real> {
        Vector::from(self.gravity)
    }
}

/// Everything needed to build and run one course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CourseConfig {
    /// Seed of the course RNG; the same seed replays the same tracks.
    pub seed: u64,
    pub obstacle_count: usize,
    pub obstacle_pool: Vec<Archetype>,
    pub player: PlayerTuning,
    pub obstacles: ObstacleTuning,
    pub world: WorldTuning,
}

impl Default for CourseConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            obstacle_count: 5,
            obstacle_pool: Archetype::ALL.to_vec(),
            player: PlayerTuning::default(),
            obstacles: ObstacleTuning::default(),
            world: WorldTuning::default(),
        }
    }
}

impl CourseConfig {
    /// Parses and validates a config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads, parses and validates a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        tracing::info!("[config] Loaded {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.obstacle_pool.is_empty() {
            return Err(invalid("obstacle_pool must not be empty"));
        }

        let world = &self.world;
        if !(world.max_delta.is_finite() && world.max_delta > 0.0) {
            return Err(invalid(format!(
                "world.max_delta must be positive, got {}",
                world.max_delta
            )));
        }
        if world.max_delta > MAX_DELTA_LIMIT {
            return Err(invalid(format!(
                "world.max_delta must be at most {MAX_DELTA_LIMIT}, got {}",
                world.max_delta
            )));
        }
        require_finite("world.fall_height", world.fall_height)?;
        for (i, g) in world.gravity.iter().enumerate() {
            require_finite(&format!("world.gravity[{i}]"), *g)?;
        }

        let player = &self.player;
        require_positive("player.radius", player.radius)?;
        require_positive("player.ground_range", player.ground_range)?;
        require_finite("player.impulse_strength", player.impulse_strength)?;
        require_finite("player.torque_strength", player.torque_strength)?;
        require_finite("player.jump_impulse", player.jump_impulse)?;
        require_non_negative("player.ground_ray_offset", player.ground_ray_offset)?;
        require_non_negative("player.damping.linear", player.damping.linear)?;
        require_non_negative("player.damping.angular", player.damping.angular)?;
        for (i, p) in player.spawn_position.iter().enumerate() {
            require_finite(&format!("player.spawn_position[{i}]"), *p)?;
        }

        for (name, material) in [
            ("player.material", player.material),
            ("obstacles.material", self.obstacles.material),
            ("world.wall_material", world.wall_material),
            ("world.floor_material", world.floor_material),
        ] {
            require_non_negative(&format!("{name}.restitution"), material.restitution)?;
            require_non_negative(&format!("{name}.friction"), material.friction)?;
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

fn require_finite(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be finite, got {value}")))
    }
}

fn require_positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be positive, got {value}")))
    }
}

fn require_non_negative(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be non-negative, got {value}")))
    }
}
