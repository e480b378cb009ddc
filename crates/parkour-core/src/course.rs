//! Turns a generated [`Level`] into physics bodies.

use rand::Rng;
use rapier3d::prelude::*;

use crate::catalog::BoundsPart;
use crate::config::{ObstacleTuning, WorldTuning};
use crate::level::Level;
use crate::obstacle::ObstacleController;
use crate::physics::{BodyShape, ColliderSpec, PhysicsAdapter};

/// Bodies created for one track. The player is spawned separately.
#[derive(Debug)]
pub struct SpawnedCourse {
    /// Single fixed body carrying the walls and the floor collider.
    pub bounds: RigidBodyHandle,
    pub obstacles: ObstacleController,
}

impl SpawnedCourse {
    /// Removes every body of the course.
    pub fn despawn(&mut self, physics: &mut impl PhysicsAdapter) {
        self.obstacles.despawn(physics);
        if let Err(err) = physics.remove_body(self.bounds) {
            tracing::debug!("[course] {err}");
        }
    }
}

/// Collider layout of the track enclosure, relative to a body at the origin.
pub fn bounds_colliders(level: &Level, world: &WorldTuning) -> Vec<ColliderSpec> {
    level
        .bounds
        .pieces()
        .iter()
        .map(|piece| {
            let material = match piece.part {
                BoundsPart::Floor => world.floor_material,
                BoundsPart::RightWall | BoundsPart::LeftWall | BoundsPart::BackWall => {
                    world.wall_material
                }
            };
            ColliderSpec::new(
                BodyShape::Cuboid {
                    half_extents: piece.half_extents,
                },
                material,
            )
            .with_offset(piece.center)
        })
        .collect()
}

/// Creates the enclosure and the obstacles of `level`.
pub fn spawn_course(
    level: &Level,
    physics: &mut impl PhysicsAdapter,
    world: &WorldTuning,
    obstacles: &ObstacleTuning,
    rng: &mut impl Rng,
) -> SpawnedCourse {
    let bounds = physics.create_fixed_body(Vector::zeros(), &bounds_colliders(level, world));
    let obstacles = ObstacleController::spawn(level, physics, obstacles.material, rng);

    tracing::debug!(
        "[course] Spawned bounds of length {} and {} obstacles",
        level.bounds.length,
        obstacles.len()
    );

    SpawnedCourse { bounds, obstacles }
}
