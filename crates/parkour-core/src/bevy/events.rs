//! ECS messages of the course.

use bevy::prelude::*;

use crate::simulation::CourseStatus;

/// Request to tear down the current track and build a new one.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct RestartCourseEvent;

/// Fired when the course leaves [`CourseStatus::Running`].
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct CourseStatusChangedEvent {
    pub status: CourseStatus,
    /// Course time at which it happened.
    pub elapsed: f32,
}
