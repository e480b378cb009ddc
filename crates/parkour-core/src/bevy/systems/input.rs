//! Keyboard sampling.

use bevy::prelude::*;

use crate::bevy::events::RestartCourseEvent;
use crate::bevy::resources::{InputIntentRes, KeyBindings};

/// Decodes held keys into the intent used by the next tick.
pub fn sample_keyboard_intent(
    keys: Res<ButtonInput<KeyCode>>,
    bindings: Res<KeyBindings>,
    mut intent: ResMut<InputIntentRes>,
) {
    intent.intent = bindings.intent(&keys);
}

/// Requests a restart when a restart key is pressed.
pub fn request_restart_on_key(
    keys: Res<ButtonInput<KeyCode>>,
    bindings: Res<KeyBindings>,
    mut writer: MessageWriter<RestartCourseEvent>,
) {
    if keys.any_just_pressed(bindings.restart.iter().copied()) {
        writer.write(RestartCourseEvent);
    }
}
