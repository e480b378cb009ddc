//! Bevy plugin for the parkour course.
//!
//! `ParkourHeadlessPlugin` holds all game logic without rendering or window
//! dependencies; an embedding application adds its own cameras and meshes
//! on top of the spawned entities.

use bevy::prelude::*;

use crate::bevy::events::{CourseStatusChangedEvent, RestartCourseEvent};
use crate::bevy::resources::{InputIntentRes, KeyBindings, SimulationRes, SpawnedGeneration};
use crate::bevy::systems;
use crate::config::CourseConfig;
use crate::physics::PHYSICS_DT;
use crate::simulation::Simulation;

/// System sets of the fixed-step course loop, in order.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CourseSet {
    /// Keyboard → intent.
    Input,
    /// Obstacles, player and physics step.
    Tick,
    /// Rapier → `Transform`.
    Writeback,
}

/// Headless plugin: simulation, input and transform write-back.
///
/// Requires `bevy::input::InputPlugin` (or `DefaultPlugins`) for keyboard
/// state.
#[derive(Default)]
pub struct ParkourHeadlessPlugin {
    pub config: CourseConfig,
    pub bindings: KeyBindings,
}

impl ParkourHeadlessPlugin {
    pub fn new(config: CourseConfig) -> Self {
        Self {
            config,
            bindings: KeyBindings::default(),
        }
    }
}

impl Plugin for ParkourHeadlessPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_seconds(f64::from(PHYSICS_DT)));

        // ====================================================================
        // Resources
        // ====================================================================
        match Simulation::new(self.config.clone()) {
            Ok(simulation) => {
                app.insert_resource(SimulationRes::new(simulation));
            }
            Err(err) => {
                tracing::error!("[plugin] Course not started: {err}");
            }
        }
        app.insert_resource(self.bindings.clone())
            .init_resource::<InputIntentRes>()
            .init_resource::<SpawnedGeneration>();

        // ====================================================================
        // Messages
        // ====================================================================
        app.add_message::<RestartCourseEvent>()
            .add_message::<CourseStatusChangedEvent>();

        // ====================================================================
        // Fixed-step systems
        // ====================================================================
        app.configure_sets(
            FixedUpdate,
            (CourseSet::Input, CourseSet::Tick, CourseSet::Writeback)
                .chain()
                .run_if(resource_exists::<SimulationRes>),
        );
        app.add_systems(
            FixedUpdate,
            systems::sample_keyboard_intent.in_set(CourseSet::Input),
        );
        app.add_systems(FixedUpdate, systems::tick_simulation.in_set(CourseSet::Tick));
        app.add_systems(
            FixedUpdate,
            systems::sync_body_transforms.in_set(CourseSet::Writeback),
        );

        // ====================================================================
        // Restart and entity spawning (per frame)
        // ====================================================================
        app.add_systems(
            Update,
            (
                systems::request_restart_on_key,
                systems::handle_restart_requests,
                systems::spawn_course_entities,
            )
                .chain()
                .run_if(resource_exists::<SimulationRes>),
        );
    }
}
