//! Motion laws of the moving obstacles.
//!
//! Every law is a pure function of elapsed time and parameters drawn once
//! when the obstacle is spawned, so replaying the same time sequence gives
//! bit-identical poses.

use std::f32::consts::TAU;

use rand::Rng;
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::Archetype;
use crate::physics::KinematicPose;

/// Lower bound of a spinner's angular speed (rad/s).
pub const SPINNER_MIN_SPEED: f32 = 0.5;
/// Upper bound (exclusive) of a spinner's angular speed (rad/s).
pub const SPINNER_MAX_SPEED: f32 = 1.5;

/// Centre height of the limbo bar's sweep above the tile.
pub const LIMBO_CENTER_HEIGHT: f32 = 1.15;

/// Lateral reach of the axe swing.
pub const AXE_AMPLITUDE: f32 = 1.25;
/// Height of the axe block's centre above the tile.
pub const AXE_HEIGHT: f32 = 0.75;

/// Yaw rotation of a spinner.
pub fn spinner(elapsed: f32, sign: f32, magnitude: f32) -> KinematicPose {
    let angle = elapsed * (sign * magnitude);
    KinematicPose::Rotation(Rotation::from_axis_angle(&Vector::y_axis(), angle))
}

/// Vertical sweep of a limbo bar.
pub fn limbo(elapsed: f32, phase: f32, base: Vector<Real>) -> KinematicPose {
    let y = base.y + (elapsed + phase).sin() + LIMBO_CENTER_HEIGHT;
    KinematicPose::Translation(vector![base.x, y, base.z])
}

/// Lateral swing of an axe.
pub fn axe(elapsed: f32, phase: f32, base: Vector<Real>) -> KinematicPose {
    let x = base.x + (elapsed + phase).sin() * AXE_AMPLITUDE;
    KinematicPose::Translation(vector![x, base.y + AXE_HEIGHT, base.z])
}

/// Per-instance motion parameters, fixed at spawn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "archetype", rename_all = "snake_case")]
pub enum Motion {
    Spinner { sign: f32, magnitude: f32 },
    Axe { phase: f32 },
    Limbo { phase: f32 },
}

impl Motion {
    /// Draws the parameters for one obstacle of `archetype`.
    pub fn draw(archetype: Archetype, rng: &mut impl Rng) -> Self {
        match archetype {
            Archetype::Spinner => {
                let magnitude = rng.random_range(SPINNER_MIN_SPEED..SPINNER_MAX_SPEED);
                let sign = if rng.random_bool(0.5) { -1.0 } else { 1.0 };
                Self::Spinner { sign, magnitude }
            }
            Archetype::Axe => Self::Axe {
                phase: rng.random_range(0.0..TAU),
            },
            Archetype::Limbo => Self::Limbo {
                phase: rng.random_range(0.0..TAU),
            },
        }
    }

    pub fn archetype(&self) -> Archetype {
        match self {
            Self::Spinner { .. } => Archetype::Spinner,
            Self::Axe { .. } => Archetype::Axe,
            Self::Limbo { .. } => Archetype::Limbo,
        }
    }

    /// Pose at `elapsed` seconds for an obstacle whose tile sits at `base`.
    pub fn pose(&self, elapsed: f32, base: Vector<Real>) -> KinematicPose {
        match *self {
            Self::Spinner { sign, magnitude } => spinner(elapsed, sign, magnitude),
            Self::Axe { phase } => axe(elapsed, phase, base),
            Self::Limbo { phase } => limbo(elapsed, phase, base),
        }
    }
}
