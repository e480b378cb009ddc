//! ECS resources holding the simulation and its input.

use bevy::prelude::*;

use crate::player::InputIntent;
use crate::simulation::Simulation;

/// Bevy resource wrapping the course [`Simulation`].
#[derive(Resource, Debug)]
pub struct SimulationRes {
    pub simulation: Simulation,
}

impl SimulationRes {
    pub fn new(simulation: Simulation) -> Self {
        Self { simulation }
    }
}

/// Intent sampled from the keyboard for the next tick.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct InputIntentRes {
    pub intent: InputIntent,
}

/// Keyboard layout. Any key of a binding activates the intent.
#[derive(Resource, Debug, Clone)]
pub struct KeyBindings {
    pub forward: Vec<KeyCode>,
    pub backward: Vec<KeyCode>,
    pub leftward: Vec<KeyCode>,
    pub rightward: Vec<KeyCode>,
    pub jump: Vec<KeyCode>,
    pub restart: Vec<KeyCode>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: vec![KeyCode::ArrowUp, KeyCode::KeyW],
            backward: vec![KeyCode::ArrowDown, KeyCode::KeyS],
            leftward: vec![KeyCode::ArrowLeft, KeyCode::KeyA],
            rightward: vec![KeyCode::ArrowRight, KeyCode::KeyD],
            jump: vec![KeyCode::Space],
            restart: vec![KeyCode::KeyR],
        }
    }
}

impl KeyBindings {
    /// Decodes the currently held keys into an intent.
    pub fn intent(&self, keys: &ButtonInput<KeyCode>) -> InputIntent {
        let held = |codes: &[KeyCode]| keys.any_pressed(codes.iter().copied());
        InputIntent {
            forward: held(&self.forward),
            backward: held(&self.backward),
            leftward: held(&self.leftward),
            rightward: held(&self.rightward),
            jump: held(&self.jump),
        }
    }
}

/// Restart generation the spawned entities belong to.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SpawnedGeneration(pub Option<u32>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let bindings = KeyBindings::default();
        let mut keys = ButtonInput::<KeyCode>::default();

        assert_eq!(bindings.intent(&keys), InputIntent::IDLE);

        keys.press(KeyCode::KeyW);
        keys.press(KeyCode::ArrowRight);
        keys.press(KeyCode::Space);
        let intent = bindings.intent(&keys);
        assert!(intent.forward && intent.rightward && intent.jump);
        assert!(!intent.backward && !intent.leftward);

        keys.release(KeyCode::KeyW);
        keys.press(KeyCode::ArrowUp);
        assert!(bindings.intent(&keys).forward);
    }
}
