//! Procedural track generation.
//!
//! A level is a start tile, a run of randomly chosen obstacle tiles and an
//! end tile, enclosed by walls sized to the whole run.

use rand::Rng;
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::{Archetype, BoundsPiece, SegmentKind, bounds_geometry, tile_position};

/// Error type for level generation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    #[error("obstacle pool is empty")]
    EmptyObstaclePool,
}

/// One tile of a generated track.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SegmentDescriptor {
    pub kind: SegmentKind,
    pub index: usize,
    pub position: [f32; 3],
}

impl SegmentDescriptor {
    fn new(kind: SegmentKind, index: usize) -> Self {
        let position = tile_position(index);
        Self {
            kind,
            index,
            position: [position.x, position.y, position.z],
        }
    }

    pub fn position(&self) -> Vector<Real> {
        Vector::from(self.position)
    }
}

/// Extent of the enclosure around a track, in tiles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackBounds {
    pub length: usize,
}

impl TrackBounds {
    /// Bounds for a track with `obstacle_count` obstacle tiles.
    pub fn for_obstacles(obstacle_count: usize) -> Self {
        Self {
            length: obstacle_count + 2,
        }
    }

    pub fn pieces(&self) -> [BoundsPiece; 4] {
        bounds_geometry(self.length)
    }
}

/// A generated track.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Level {
    pub segments: Vec<SegmentDescriptor>,
    pub bounds: TrackBounds,
}

impl Level {
    /// Generates a track with `obstacle_count` obstacles drawn uniformly,
    /// with replacement, from `pool`.
    pub fn generate(
        obstacle_count: usize,
        pool: &[Archetype],
        rng: &mut impl Rng,
    ) -> Result<Self, LevelError> {
        if pool.is_empty() {
            return Err(LevelError::EmptyObstaclePool);
        }

        let mut segments = Vec::with_capacity(obstacle_count + 2);
        segments.push(SegmentDescriptor::new(SegmentKind::Start, 0));

        for index in 1..=obstacle_count {
            let archetype = pool[rng.random_range(0..pool.len())];
            segments.push(SegmentDescriptor::new(
                SegmentKind::Obstacle(archetype),
                index,
            ));
        }

        segments.push(SegmentDescriptor::new(
            SegmentKind::End,
            obstacle_count + 1,
        ));

        let level = Self {
            segments,
            bounds: TrackBounds::for_obstacles(obstacle_count),
        };

        tracing::info!(
            "[level] Generated track: {} obstacles, length {}",
            obstacle_count,
            level.bounds.length
        );

        Ok(level)
    }

    pub fn obstacle_count(&self) -> usize {
        self.bounds.length.saturating_sub(2)
    }

    /// Obstacle tiles in track order.
    pub fn obstacles(&self) -> impl Iterator<Item = (&SegmentDescriptor, Archetype)> {
        self.segments
            .iter()
            .filter_map(|segment| segment.kind.archetype().map(|a| (segment, a)))
    }

    /// The end tile, `None` for a hand-built level without one.
    pub fn end(&self) -> Option<&SegmentDescriptor> {
        self.segments
            .iter()
            .rev()
            .find(|segment| segment.kind == SegmentKind::End)
    }

    /// Archetype sequence, handy for comparing tracks.
    pub fn archetypes(&self) -> Vec<Archetype> {
        self.obstacles().map(|(_, archetype)| archetype).collect()
    }
}
