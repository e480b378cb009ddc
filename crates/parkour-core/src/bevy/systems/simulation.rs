//! Fixed-step course simulation.

use bevy::prelude::*;

use crate::bevy::events::{CourseStatusChangedEvent, RestartCourseEvent};
use crate::bevy::resources::{InputIntentRes, SimulationRes};
use crate::simulation::CourseStatus;

/// Runs one simulation tick per fixed step.
pub fn tick_simulation(
    time: Res<Time>,
    intent: Res<InputIntentRes>,
    mut sim: ResMut<SimulationRes>,
    mut writer: MessageWriter<CourseStatusChangedEvent>,
) {
    let before = sim.simulation.status();
    let report = sim.simulation.tick(time.delta_secs(), &intent.intent);

    if before == CourseStatus::Running && report.status != CourseStatus::Running {
        writer.write(CourseStatusChangedEvent {
            status: report.status,
            elapsed: report.elapsed,
        });
    }
}

/// Applies pending restart requests. Several requests in one frame restart once.
pub fn handle_restart_requests(
    mut reader: MessageReader<RestartCourseEvent>,
    mut sim: ResMut<SimulationRes>,
) {
    if reader.read().count() == 0 {
        return;
    }
    if let Err(err) = sim.simulation.restart() {
        tracing::error!("[simulation] Restart failed: {err}");
    }
}
