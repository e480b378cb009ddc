//! Parkour-Live Core Library
//!
//! Procedural obstacle tracks, kinematic obstacle motion and a rolling player
//! ball, simulated with `Rapier3D` with deterministic behavior.
//!
//! [`Simulation`] owns everything and is driven one tick at a time; the
//! [`bevy`] module wraps it in a plugin for use inside a Bevy app.

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod course;
pub mod level;
pub mod motion;
pub mod obstacle;
pub mod physics;
pub mod player;
pub mod simulation;

// Bevy integration
pub mod bevy;

#[cfg(test)]
mod test_utils;

pub use catalog::{Archetype, SegmentKind, TILE_SIZE};
pub use config::{ConfigError, CourseConfig, ObstacleTuning, WorldTuning};
pub use level::{Level, LevelError, SegmentDescriptor, TrackBounds};
pub use motion::Motion;
pub use obstacle::{ObstacleController, ObstacleState};
pub use physics::{PHYSICS_DT, PhysicsAdapter, PhysicsError, PhysicsWorld, default_gravity};
pub use player::{InputIntent, PlayerController, PlayerState, PlayerTuning};
pub use simulation::{
    BodyRole, BodyTransform, CourseStatus, Simulation, SimulationError, TickClock, TickReport,
};
