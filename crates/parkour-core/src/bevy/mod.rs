//! Bevy integration for the parkour course.
//!
//! The simulation lives in a resource and is ticked from `FixedUpdate`;
//! every rigid body gets an entity whose `Transform` follows rapier.

pub mod components;
pub mod events;
pub mod plugin;
pub mod resources;
pub mod systems;

#[cfg(test)]
mod test_utils;

pub use components::*;
pub use events::*;
pub use plugin::{CourseSet, ParkourHeadlessPlugin};
pub use resources::*;
