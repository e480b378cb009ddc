//! Course entities and rapier → `Transform` write-back.

use bevy::prelude::*;
use rapier3d::prelude::{Real, Rotation, Vector};

use crate::bevy::components::{Enclosure, ObstacleBody, PhysicsBody, PlayerBall, SegmentTile};
use crate::bevy::resources::{SimulationRes, SpawnedGeneration};
use crate::simulation::BodyRole;

pub fn to_vec3(v: Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub fn to_quat(rotation: &Rotation<Real>) -> Quat {
    let c = rotation.coords;
    Quat::from_xyzw(c.x, c.y, c.z, c.w)
}

/// (Re)spawns one entity per tile and per body whenever the simulation was
/// rebuilt since the last spawn.
pub fn spawn_course_entities(
    mut commands: Commands,
    sim: Res<SimulationRes>,
    mut generation: ResMut<SpawnedGeneration>,
    existing: Query<Entity, Or<(With<PhysicsBody>, With<SegmentTile>)>>,
) {
    let simulation = &sim.simulation;
    let current = simulation.restarts();
    if generation.0 == Some(current) {
        return;
    }

    for entity in &existing {
        commands.entity(entity).despawn();
    }

    for segment in &simulation.level().segments {
        commands.spawn((
            SegmentTile {
                kind: segment.kind,
                index: segment.index,
            },
            Transform::from_translation(to_vec3(segment.position())),
            Name::new(format!("segment {}", segment.index)),
        ));
    }

    for body in simulation.body_transforms() {
        let mut entity = commands.spawn((
            PhysicsBody(body.handle),
            Transform::from_translation(to_vec3(body.translation))
                .with_rotation(to_quat(&body.rotation)),
        ));
        match body.role {
            BodyRole::Bounds => entity.insert((Enclosure, Name::new("enclosure"))),
            BodyRole::Obstacle(archetype) => {
                entity.insert((ObstacleBody(archetype), Name::new(archetype.name())))
            }
            BodyRole::Player => entity.insert((PlayerBall, Name::new("player"))),
        };
    }

    generation.0 = Some(current);
    tracing::info!(
        "[entities] Spawned course #{current} ({} segments)",
        simulation.level().segments.len()
    );
}

/// Copies rapier poses onto the `Transform` of every body entity.
pub fn sync_body_transforms(
    sim: Res<SimulationRes>,
    mut bodies: Query<(&PhysicsBody, &mut Transform)>,
) {
    let physics = sim.simulation.physics();
    for (body, mut transform) in &mut bodies {
        if let Some(rigid_body) = physics.get_rigid_body(body.0) {
            transform.translation = to_vec3(*rigid_body.translation());
            transform.rotation = to_quat(rigid_body.rotation());
        }
    }
}
