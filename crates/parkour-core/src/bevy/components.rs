//! ECS components for course entities.

use bevy::prelude::*;
use rapier3d::prelude::RigidBodyHandle;

use crate::catalog::{Archetype, SegmentKind};

/// Entity ↔ rigid body mapping.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsBody(pub RigidBodyHandle);

/// Marker for the player ball.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PlayerBall;

/// A moving obstacle and its archetype.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObstacleBody(pub Archetype);

/// Marker for the fixed walls-and-floor body.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Enclosure;

/// One tile of the track. Renderers attach the floor slab and decoration
/// from [`SegmentKind::footprint`].
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentTile {
    pub kind: SegmentKind,
    pub index: usize,
}
