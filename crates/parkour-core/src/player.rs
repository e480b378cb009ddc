//! Player ball: input intents to impulses, ground check for jumps.

use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::physics::{
    BodyShape, ColliderSpec, Damping, PhysicsAdapter, PhysicsError, SurfaceMaterial,
};

/// Decoded input for one tick.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputIntent {
    pub forward: bool,
    pub backward: bool,
    pub leftward: bool,
    pub rightward: bool,
    pub jump: bool,
}

impl InputIntent {
    pub const IDLE: InputIntent = InputIntent {
        forward: false,
        backward: false,
        leftward: false,
        rightward: false,
        jump: false,
    };
}

/// Tuning constants of the player body and controls.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerTuning {
    /// Linear impulse per second of held direction.
    pub impulse_strength: f32,
    /// Torque impulse per second of held direction.
    pub torque_strength: f32,
    /// Upward impulse of a granted jump.
    pub jump_impulse: f32,
    pub radius: f32,
    pub spawn_position: [f32; 3],
    pub material: SurfaceMaterial,
    pub damping: Damping,
    /// How far below the body centre the ground ray starts.
    pub ground_ray_offset: f32,
    /// Longest ground ray that still counts as standing.
    pub ground_range: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            impulse_strength: 0.6,
            torque_strength: 0.2,
            jump_impulse: 0.5,
            radius: 0.3,
            spawn_position: [0.0, 1.0, 0.0],
            material: SurfaceMaterial::new(0.2, 1.0),
            damping: Damping {
                linear: 0.5,
                angular: 0.5,
            },
            ground_ray_offset: 0.31,
            ground_range: 0.15,
        }
    }
}

/// The player's body and last observed position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerState {
    pub body: RigidBodyHandle,
    pub last_known_position: Vector<Real>,
}

/// What the controller did during one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerTickOutcome {
    pub impulse: Vector<Real>,
    pub torque: Vector<Real>,
    pub jumped: bool,
}

impl PlayerTickOutcome {
    fn idle() -> Self {
        Self {
            impulse: Vector::zeros(),
            torque: Vector::zeros(),
            jumped: false,
        }
    }
}

/// Impulse and torque impulse for `intent` held during `delta` seconds.
pub fn directional_impulse(
    intent: &InputIntent,
    delta: f32,
    tuning: &PlayerTuning,
) -> (Vector<Real>, Vector<Real>) {
    let mut impulse = Vector::zeros();
    let mut torque = Vector::zeros();

    let impulse_strength = tuning.impulse_strength * delta;
    let torque_strength = tuning.torque_strength * delta;

    if intent.forward {
        impulse.z -= impulse_strength;
        torque.x -= torque_strength;
    }
    if intent.backward {
        impulse.z += impulse_strength;
        torque.x += torque_strength;
    }
    if intent.rightward {
        impulse.x -= impulse_strength;
        torque.z -= torque_strength;
    }
    if intent.leftward {
        impulse.x += impulse_strength;
        torque.z += torque_strength;
    }

    (impulse, torque)
}

/// Controls the player ball.
#[derive(Debug, Clone)]
pub struct PlayerController {
    tuning: PlayerTuning,
    state: Option<PlayerState>,
    jump_held: bool,
}

impl PlayerController {
    /// Creates a controller with no body yet.
    pub fn new(tuning: PlayerTuning) -> Self {
        Self {
            tuning,
            state: None,
            jump_held: false,
        }
    }

    /// Creates the player's dynamic body at the configured spawn position.
    /// Any previous body is removed first.
    pub fn spawn(&mut self, physics: &mut impl PhysicsAdapter) -> RigidBodyHandle {
        self.despawn(physics);

        let position = Vector::from(self.tuning.spawn_position);
        let collider = ColliderSpec::new(
            BodyShape::Ball {
                radius: self.tuning.radius,
            },
            self.tuning.material,
        );
        let body = physics.create_dynamic_body(position, collider, self.tuning.damping);

        self.state = Some(PlayerState {
            body,
            last_known_position: position,
        });
        self.jump_held = false;
        body
    }

    /// Removes the player's body, if any.
    pub fn despawn(&mut self, physics: &mut impl PhysicsAdapter) {
        if let Some(state) = self.state.take() {
            if let Err(err) = physics.remove_body(state.body) {
                tracing::debug!("[player] {err}");
            }
        }
        self.jump_held = false;
    }

    pub fn state(&self) -> Option<&PlayerState> {
        self.state.as_ref()
    }

    pub fn tuning(&self) -> &PlayerTuning {
        &self.tuning
    }

    /// Applies one tick of input. Without a live body the tick is a no-op.
    pub fn on_tick(
        &mut self,
        elapsed: f32,
        delta: f32,
        intent: &InputIntent,
        physics: &mut impl PhysicsAdapter,
    ) -> PlayerTickOutcome {
        let Some(state) = self.state else {
            return PlayerTickOutcome::idle();
        };
        if let Err(err) = physics.translation(state.body) {
            tracing::debug!("[player] Skipping tick at {elapsed:.3}s: {err}");
            return PlayerTickOutcome::idle();
        }

        let (impulse, torque) = directional_impulse(intent, delta, &self.tuning);
        log_rejected(physics.apply_impulse(state.body, impulse));
        log_rejected(physics.apply_torque_impulse(state.body, torque));

        let rising_edge = intent.jump && !self.jump_held;
        self.jump_held = intent.jump;

        let jumped = rising_edge && self.try_jump(state.body, physics);

        PlayerTickOutcome {
            impulse,
            torque,
            jumped,
        }
    }

    /// Re-reads the body position into [`PlayerState::last_known_position`].
    pub fn refresh(&mut self, physics: &impl PhysicsAdapter) -> Option<Vector<Real>> {
        let state = self.state.as_mut()?;
        match physics.translation(state.body) {
            Ok(position) => {
                state.last_known_position = position;
                Some(position)
            }
            Err(err) => {
                tracing::debug!("[player] {err}");
                None
            }
        }
    }

    /// Whether a ray cast straight down from just below the ball hits
    /// something within the ground range.
    pub fn is_grounded(&self, physics: &impl PhysicsAdapter) -> bool {
        self.state
            .is_some_and(|state| self.ground_hit(state.body, physics))
    }

    fn ground_hit(&self, body: RigidBodyHandle, physics: &impl PhysicsAdapter) -> bool {
        let Ok(position) = physics.translation(body) else {
            return false;
        };
        let origin = Point::from(position - vector![0.0, self.tuning.ground_ray_offset, 0.0]);
        physics
            .cast_ray(
                origin,
                vector![0.0, -1.0, 0.0],
                self.tuning.ground_range,
                Some(body),
            )
            .is_some()
    }

    fn try_jump(&self, body: RigidBodyHandle, physics: &mut impl PhysicsAdapter) -> bool {
        if !self.ground_hit(body, &*physics) {
            tracing::debug!("[player] Jump ignored: not grounded");
            return false;
        }
        match physics.apply_impulse(body, vector![0.0, self.tuning.jump_impulse, 0.0]) {
            Ok(()) => {
                tracing::trace!("[player] Jump");
                true
            }
            Err(err) => {
                tracing::debug!("[player] Jump dropped: {err}");
                false
            }
        }
    }
}

fn log_rejected(result: Result<(), PhysicsError>) {
    if let Err(err) = result {
        tracing::debug!("[player] {err}");
    }
}
