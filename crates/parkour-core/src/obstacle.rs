//! Moving obstacles: spawning and per-tick kinematic updates.

use rand::Rng;
use rapier3d::prelude::*;

use crate::catalog::OBSTACLE_SPAWN_HEIGHT;
use crate::level::Level;
use crate::motion::Motion;
use crate::physics::{BodyShape, ColliderSpec, PhysicsAdapter, PhysicsError, SurfaceMaterial};

/// One live obstacle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleState {
    /// Index of the tile carrying the obstacle.
    pub segment_index: usize,
    /// Origin of that tile.
    pub base_position: Vector<Real>,
    pub motion: Motion,
    pub body: RigidBodyHandle,
}

/// Drives every obstacle of a track.
#[derive(Debug)]
pub struct ObstacleController {
    obstacles: Vec<ObstacleState>,
}

impl ObstacleController {
    /// Spawns a kinematic body for every obstacle tile of `level`, drawing
    /// each obstacle's motion parameters from `rng` in track order.
    pub fn spawn(
        level: &Level,
        physics: &mut impl PhysicsAdapter,
        material: SurfaceMaterial,
        rng: &mut impl Rng,
    ) -> Self {
        let obstacles = level
            .obstacles()
            .map(|(segment, archetype)| {
                let base_position = segment.position();
                let motion = Motion::draw(archetype, rng);
                let collider = ColliderSpec::new(
                    BodyShape::Cuboid {
                        half_extents: archetype.half_extents(),
                    },
                    material,
                );
                let body = physics.create_kinematic_body(
                    base_position + vector![0.0, OBSTACLE_SPAWN_HEIGHT, 0.0],
                    collider,
                );
                ObstacleState {
                    segment_index: segment.index,
                    base_position,
                    motion,
                    body,
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!("[obstacle] Spawned {} obstacles", obstacles.len());

        Self { obstacles }
    }

    /// Submits the next pose of every obstacle for time `elapsed`.
    ///
    /// Obstacles whose body is gone are skipped.
    pub fn on_tick(&self, elapsed: f32, physics: &mut impl PhysicsAdapter) {
        for obstacle in &self.obstacles {
            let pose = obstacle.motion.pose(elapsed, obstacle.base_position);
            match physics.set_next_kinematic_pose(obstacle.body, pose) {
                Ok(()) => {}
                Err(err @ PhysicsError::StaleHandle(_)) => {
                    tracing::debug!(
                        "[obstacle] Skipping obstacle on segment {}: {err}",
                        obstacle.segment_index
                    );
                }
                Err(err) => {
                    tracing::warn!(
                        "[obstacle] Pose update rejected on segment {}: {err}",
                        obstacle.segment_index
                    );
                }
            }
        }
    }

    /// Removes every obstacle body from the world.
    pub fn despawn(&mut self, physics: &mut impl PhysicsAdapter) {
        for obstacle in self.obstacles.drain(..) {
            if let Err(err) = physics.remove_body(obstacle.body) {
                tracing::debug!("[obstacle] {err}");
            }
        }
    }

    pub fn obstacles(&self) -> &[ObstacleState] {
        &self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}
