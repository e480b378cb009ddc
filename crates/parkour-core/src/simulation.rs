//! The simulation loop: one call per frame drives obstacles, player and physics.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::{Archetype, TILE_SIZE};
use crate::config::{ConfigError, CourseConfig};
use crate::course::{SpawnedCourse, spawn_course};
use crate::level::{Level, LevelError};
use crate::physics::PhysicsWorld;
use crate::player::{InputIntent, PlayerController, PlayerState, PlayerTickOutcome};

/// Error type for building a [`Simulation`].
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Level(#[from] LevelError),
}

/// Progress of the current run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    #[default]
    Running,
    /// The player reached the end tile.
    Finished,
    /// The player dropped off the track.
    Fallen,
}

/// Monotonic course time with clamped per-tick deltas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickClock {
    elapsed: f32,
    max_delta: f32,
}

impl TickClock {
    pub fn new(max_delta: f32) -> Self {
        Self {
            elapsed: 0.0,
            max_delta,
        }
    }

    /// Advances by `raw_delta` clamped into `[0, max_delta]` and returns the
    /// delta actually applied. Non-finite deltas count as zero.
    pub fn advance(&mut self, raw_delta: f32) -> f32 {
        let delta = if raw_delta.is_finite() {
            raw_delta.clamp(0.0, self.max_delta)
        } else {
            0.0
        };
        self.elapsed += delta;
        delta
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn max_delta(&self) -> f32 {
        self.max_delta
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

/// What a body represents, for whoever draws it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyRole {
    Bounds,
    Obstacle(Archetype),
    Player,
}

/// World pose of one live body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyTransform {
    pub handle: RigidBodyHandle,
    pub role: BodyRole,
    pub translation: Vector<Real>,
    pub rotation: Rotation<Real>,
}

/// Summary of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub elapsed: f32,
    /// Delta after clamping.
    pub delta: f32,
    pub player: PlayerTickOutcome,
    pub status: CourseStatus,
}

/// A running course: track, bodies, player and clock.
#[derive(Debug)]
pub struct Simulation {
    config: CourseConfig,
    rng: ChaCha8Rng,
    physics: PhysicsWorld,
    level: Level,
    course: SpawnedCourse,
    player: PlayerController,
    clock: TickClock,
    status: CourseStatus,
    restarts: u32,
}

impl Simulation {
    /// Validates `config`, generates the first track and spawns every body.
    pub fn new(config: CourseConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut physics = PhysicsWorld::with_gravity(config.world.gravity());

        let level = Level::generate(config.obstacle_count, &config.obstacle_pool, &mut rng)?;
        let course = spawn_course(
            &level,
            &mut physics,
            &config.world,
            &config.obstacles,
            &mut rng,
        );
        let mut player = PlayerController::new(config.player);
        player.spawn(&mut physics);

        tracing::info!(
            "[simulation] Course ready: seed {}, {} obstacles",
            config.seed,
            level.obstacle_count()
        );

        Ok(Self {
            clock: TickClock::new(config.world.max_delta),
            config,
            rng,
            physics,
            level,
            course,
            player,
            status: CourseStatus::Running,
            restarts: 0,
        })
    }

    /// Runs one tick with `raw_delta` seconds of frame time.
    pub fn tick(&mut self, raw_delta: f32, intent: &InputIntent) -> TickReport {
        let delta = self.clock.advance(raw_delta);
        let elapsed = self.clock.elapsed();

        self.course.obstacles.on_tick(elapsed, &mut self.physics);
        let player = self
            .player
            .on_tick(elapsed, delta, intent, &mut self.physics);

        // Rapier divides by dt; a zero-length step is skipped.
        if delta > 0.0 {
            self.physics.step_by(delta);
        }

        if let Some(position) = self.player.refresh(&self.physics) {
            self.update_status(position);
        }

        tracing::trace!(
            "[simulation] Tick at {elapsed:.3}s (dt {delta:.4}): {:?}",
            self.status
        );

        TickReport {
            elapsed,
            delta,
            player,
            status: self.status,
        }
    }

    /// Tears the course down and builds a fresh one from the continuing RNG.
    pub fn restart(&mut self) -> Result<(), SimulationError> {
        let level = Level::generate(
            self.config.obstacle_count,
            &self.config.obstacle_pool,
            &mut self.rng,
        )?;

        self.course.despawn(&mut self.physics);
        self.player.despawn(&mut self.physics);

        self.course = spawn_course(
            &level,
            &mut self.physics,
            &self.config.world,
            &self.config.obstacles,
            &mut self.rng,
        );
        self.level = level;
        self.player.spawn(&mut self.physics);
        self.clock.reset();
        self.status = CourseStatus::Running;
        self.restarts += 1;

        tracing::info!("[simulation] Restarted course (#{})", self.restarts);
        Ok(())
    }

    fn update_status(&mut self, position: Vector<Real>) {
        if self.status != CourseStatus::Running {
            return;
        }

        let status = if position.y < self.config.world.fall_height {
            CourseStatus::Fallen
        } else if self
            .level
            .end()
            .is_some_and(|end| on_tile(position, end.position()))
        {
            CourseStatus::Finished
        } else {
            return;
        };

        tracing::info!(
            "[simulation] Course {:?} at {:.2}s",
            status,
            self.clock.elapsed()
        );
        self.status = status;
    }

    /// Poses of every live body, for rendering.
    pub fn body_transforms(&self) -> Vec<BodyTransform> {
        let obstacles = self
            .course
            .obstacles
            .obstacles()
            .iter()
            .map(|o| (o.body, BodyRole::Obstacle(o.motion.archetype())));
        let player = self
            .player
            .state()
            .map(|state| (state.body, BodyRole::Player));

        std::iter::once((self.course.bounds, BodyRole::Bounds))
            .chain(obstacles)
            .chain(player)
            .filter_map(|(handle, role)| {
                let body = self.physics.get_rigid_body(handle)?;
                Some(BodyTransform {
                    handle,
                    role,
                    translation: *body.translation(),
                    rotation: *body.rotation(),
                })
            })
            .collect()
    }

    pub fn config(&self) -> &CourseConfig {
        &self.config
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn status(&self) -> CourseStatus {
        self.status
    }

    pub fn elapsed(&self) -> f32 {
        self.clock.elapsed()
    }

    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    pub fn player(&self) -> Option<&PlayerState> {
        self.player.state()
    }

    pub fn is_player_grounded(&self) -> bool {
        self.player.is_grounded(&self.physics)
    }

    pub fn course(&self) -> &SpawnedCourse {
        &self.course
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    /// Number of restarts since construction.
    pub fn restarts(&self) -> u32 {
        self.restarts
    }
}

fn on_tile(position: Vector<Real>, tile: Vector<Real>) -> bool {
    let half = TILE_SIZE / 2.0;
    (position.x - tile.x).abs() <= half && (position.z - tile.z).abs() <= half
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{PHYSICS_DT, PhysicsAdapter};

    fn forward() -> InputIntent {
        InputIntent {
            forward: true,
            ..InputIntent::IDLE
        }
    }

    fn config(seed: u64) -> CourseConfig {
        CourseConfig {
            seed,
            ..CourseConfig::default()
        }
    }

    #[test]
    fn test_clock_clamps_delta() {
        let mut clock = TickClock::new(0.1);

        assert_eq!(clock.advance(0.05), 0.05);
        assert_eq!(clock.advance(5.0), 0.1);
        assert_eq!(clock.advance(-1.0), 0.0);
        assert_eq!(clock.advance(f32::NAN), 0.0);
        assert_eq!(clock.advance(f32::INFINITY), 0.0);
        assert!((clock.elapsed() - 0.15).abs() < 1e-6);

        clock.reset();
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn test_new_spawns_every_body() {
        let sim = Simulation::new(config(42)).unwrap();

        assert_eq!(sim.status(), CourseStatus::Running);
        assert_eq!(sim.elapsed(), 0.0);
        assert_eq!(sim.level().obstacle_count(), 5);
        // Bounds, five obstacles, player.
        assert_eq!(sim.physics().rigid_body_set.len(), 7);
        assert_eq!(sim.body_transforms().len(), 7);
        let player = sim.player().unwrap();
        assert_eq!(player.last_known_position, vector![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let bad = CourseConfig {
            obstacle_pool: Vec::new(),
            ..CourseConfig::default()
        };
        assert!(matches!(
            Simulation::new(bad),
            Err(SimulationError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn test_tick_reports_clamped_delta() {
        let mut sim = Simulation::new(config(1)).unwrap();
        let max = sim.clock().max_delta();

        let report = sim.tick(10.0, &InputIntent::IDLE);
        assert_eq!(report.delta, max);
        assert_eq!(report.elapsed, max);

        let report = sim.tick(f32::NAN, &InputIntent::IDLE);
        assert_eq!(report.delta, 0.0);
        assert_eq!(report.elapsed, max);
    }

    #[test]
    fn test_forward_rolls_toward_end() {
        let mut sim = Simulation::new(config(3)).unwrap();
        for _ in 0..30 {
            sim.tick(PHYSICS_DT, &forward());
        }
        let z = sim.player().unwrap().last_known_position.z;
        assert!(z < -0.05, "player should roll toward -z, z = {z}");
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let mut a = Simulation::new(config(77)).unwrap();
        let mut b = Simulation::new(config(77)).unwrap();
        assert_eq!(a.level(), b.level());

        for i in 0..180 {
            let intent = InputIntent {
                jump: i % 40 == 0,
                ..forward()
            };
            assert_eq!(a.tick(PHYSICS_DT, &intent), b.tick(PHYSICS_DT, &intent));
        }
        assert_eq!(a.physics().compute_hash(), b.physics().compute_hash());
        assert_eq!(a.body_transforms(), b.body_transforms());
    }

    #[test]
    fn test_falling_below_threshold_latches() {
        let mut cfg = config(5);
        cfg.world.fall_height = 0.9;
        let mut sim = Simulation::new(cfg).unwrap();

        for _ in 0..30 {
            sim.tick(PHYSICS_DT, &InputIntent::IDLE);
        }
        assert_eq!(sim.status(), CourseStatus::Fallen);

        // Latched even though nothing changes afterwards.
        let report = sim.tick(PHYSICS_DT, &forward());
        assert_eq!(report.status, CourseStatus::Fallen);
    }

    #[test]
    fn test_reaching_end_tile_finishes() {
        let mut cfg = config(6);
        cfg.obstacle_count = 0;
        cfg.player.spawn_position = [0.0, 1.0, -4.0];
        let mut sim = Simulation::new(cfg).unwrap();

        let report = sim.tick(PHYSICS_DT, &InputIntent::IDLE);
        assert_eq!(report.status, CourseStatus::Finished);
    }

    #[test]
    fn test_start_tile_keeps_running() {
        let mut sim = Simulation::new(config(8)).unwrap();
        for _ in 0..60 {
            sim.tick(PHYSICS_DT, &InputIntent::IDLE);
        }
        assert_eq!(sim.status(), CourseStatus::Running);
    }

    #[test]
    fn test_restart_rebuilds_course() {
        let mut sim = Simulation::new(config(9)).unwrap();
        let old_player = sim.player().unwrap().body;
        let old_obstacles: Vec<_> = sim
            .course()
            .obstacles
            .obstacles()
            .iter()
            .map(|o| o.body)
            .collect();

        for _ in 0..90 {
            sim.tick(PHYSICS_DT, &forward());
        }
        sim.restart().unwrap();

        assert_eq!(sim.restarts(), 1);
        assert_eq!(sim.elapsed(), 0.0);
        assert_eq!(sim.status(), CourseStatus::Running);
        assert_eq!(sim.physics().rigid_body_set.len(), 7);
        assert!(sim.physics().get_rigid_body(old_player).is_none());
        for handle in old_obstacles {
            assert!(sim.physics().get_rigid_body(handle).is_none());
        }

        let player = sim.player().unwrap();
        assert_eq!(player.last_known_position, vector![0.0, 1.0, 0.0]);
        assert_eq!(
            sim.physics().translation(player.body).unwrap(),
            vector![0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn test_restart_sequence_is_reproducible() {
        let mut a = Simulation::new(config(10)).unwrap();
        let mut b = Simulation::new(config(10)).unwrap();

        for _ in 0..3 {
            a.restart().unwrap();
            b.restart().unwrap();
            assert_eq!(a.level(), b.level());
        }
    }

    #[test]
    fn test_body_roles() {
        let sim = Simulation::new(config(11)).unwrap();
        let transforms = sim.body_transforms();

        assert_eq!(transforms[0].role, BodyRole::Bounds);
        assert_eq!(transforms.last().unwrap().role, BodyRole::Player);
        let obstacle_roles: Vec<_> = transforms
            .iter()
            .filter_map(|t| match t.role {
                BodyRole::Obstacle(a) => Some(a),
                _ => None,
            })
            .collect();
        assert_eq!(obstacle_roles, sim.level().archetypes());
    }
}
