//! Test utilities for headless Bevy integration tests.
//!
//! Provides `TestApp`, a wrapper around `bevy::app::App` that uses
//! `MinimalPlugins` + `ParkourHeadlessPlugin` for testing course logic
//! without a rendering or windowing backend.

use bevy::prelude::*;

use crate::bevy::plugin::ParkourHeadlessPlugin;
use crate::bevy::resources::SimulationRes;
use crate::config::CourseConfig;
use crate::simulation::Simulation;

/// A headless Bevy app wrapper for testing.
pub(crate) struct TestApp {
    pub app: App,
}

impl TestApp {
    /// Create a new test app with the default course and seed 12345.
    pub fn new() -> Self {
        Self::with_config(CourseConfig {
            seed: 12345,
            ..CourseConfig::default()
        })
    }

    pub fn with_config(config: CourseConfig) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(bevy::input::InputPlugin);
        app.add_plugins(ParkourHeadlessPlugin::new(config));
        // Pause virtual time so that only explicit step_physics calls
        // advance the simulation.
        app.world_mut().resource_mut::<Time<Virtual>>().pause();
        // Run one update to spawn the course entities.
        app.update();
        Self { app }
    }

    /// Run a single frame update.
    pub fn update(&mut self) {
        self.app.update();
    }

    /// Advance the simulation by exactly `n` fixed timesteps.
    ///
    /// Feeds time directly into the `Time<Fixed>` accumulator; with paused
    /// virtual time this gives fully deterministic stepping.
    pub fn step_physics(&mut self, n: usize) {
        let dt = self.app.world().resource::<Time<Fixed>>().timestep();
        for _ in 0..n {
            self.app
                .world_mut()
                .resource_mut::<Time<Fixed>>()
                .accumulate_overstep(dt);
            self.app.update();
        }
    }

    /// Hold a key down until released.
    pub fn press(&mut self, key: KeyCode) {
        self.app
            .world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(key);
    }

    pub fn simulation(&self) -> &Simulation {
        &self.app.world().resource::<SimulationRes>().simulation
    }

    pub fn world(&self) -> &World {
        self.app.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }
}
