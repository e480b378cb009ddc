//! Segment catalog: the fixed geometry every track is assembled from.
//!
//! A track is a row of square tiles laid out along -Z. Each tile is either
//! the start, the end, or carries one moving obstacle archetype. The walls
//! and the floor collider enclosing the whole row are described here too.

use std::fmt;

use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

/// Edge length of one square tile.
pub const TILE_SIZE: Real = 4.0;

/// Thickness of the floor slab under each tile.
pub const FLOOR_THICKNESS: Real = 0.2;

/// Height above the tile origin at which an obstacle body is spawned.
pub const OBSTACLE_SPAWN_HEIGHT: Real = 0.3;

pub const WALL_HEIGHT: Real = 1.5;
pub const WALL_THICKNESS: Real = 0.3;

/// Model shown on the end tile.
pub const END_MODEL_ASSET: &str = "house.glb";
pub const END_MODEL_SCALE: Real = 0.2;

/// Moving obstacle behavior template.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    /// Bar rotating about the vertical axis.
    Spinner,
    /// Block swinging left and right.
    Axe,
    /// Bar moving up and down.
    Limbo,
}

impl Archetype {
    /// Every archetype, in the default pool order.
    pub const ALL: [Archetype; 3] = [Archetype::Spinner, Archetype::Axe, Archetype::Limbo];

    /// Half extents of the archetype's moving body.
    pub fn half_extents(self) -> Vector<Real> {
        match self {
            Self::Spinner | Self::Limbo => vector![1.75, 0.15, 0.15],
            Self::Axe => vector![0.75, 0.75, 0.15],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Spinner => "spinner",
            Self::Axe => "axe",
            Self::Limbo => "limbo",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What occupies a tile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type", content = "archetype", rename_all = "snake_case")]
pub enum SegmentKind {
    Start,
    End,
    Obstacle(Archetype),
}

impl SegmentKind {
    pub fn archetype(self) -> Option<Archetype> {
        match self {
            Self::Obstacle(archetype) => Some(archetype),
            Self::Start | Self::End => None,
        }
    }

    /// Static layout of a tile of this kind.
    pub fn footprint(self) -> SegmentFootprint {
        match self {
            Self::Start => SegmentFootprint {
                floor_offset: vector![0.0, -FLOOR_THICKNESS / 2.0, 0.0],
                floor_style: FloorStyle::Primary,
                decoration: None,
            },
            // The end slab sits flush with the tile origin.
            Self::End => SegmentFootprint {
                floor_offset: Vector::zeros(),
                floor_style: FloorStyle::Primary,
                decoration: Some(Decoration {
                    asset: END_MODEL_ASSET,
                    scale: END_MODEL_SCALE,
                }),
            },
            Self::Obstacle(_) => SegmentFootprint {
                floor_offset: vector![0.0, -FLOOR_THICKNESS / 2.0, 0.0],
                floor_style: FloorStyle::Secondary,
                decoration: None,
            },
        }
    }
}

/// Floor color family, picked by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorStyle {
    Primary,
    Secondary,
}

/// Static model placed on a tile. Loading and drawing it is the renderer's job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decoration {
    pub asset: &'static str,
    pub scale: Real,
}

/// Visual floor slab and decoration of one tile, relative to the tile origin.
///
/// Floor slabs are not colliders; the walkable surface is the single floor
/// collider of [`bounds_geometry`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentFootprint {
    pub floor_offset: Vector<Real>,
    pub floor_style: FloorStyle,
    pub decoration: Option<Decoration>,
}

impl SegmentFootprint {
    pub fn floor_half_extents(&self) -> Vector<Real> {
        vector![TILE_SIZE / 2.0, FLOOR_THICKNESS / 2.0, TILE_SIZE / 2.0]
    }
}

/// World position of the tile at `index`.
pub fn tile_position(index: usize) -> Vector<Real> {
    #[allow(clippy::cast_precision_loss)]
    let index = index as Real;
    vector![0.0, 0.0, -index * TILE_SIZE]
}

/// Part of the enclosure around a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsPart {
    RightWall,
    LeftWall,
    BackWall,
    Floor,
}

/// One cuboid of the track enclosure, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsPiece {
    pub part: BoundsPart,
    pub center: Vector<Real>,
    pub half_extents: Vector<Real>,
}

/// Walls and floor collider enclosing a track of `length` tiles.
///
/// The enclosure starts at the front edge of tile 0 (`z = TILE_SIZE / 2`) and
/// ends behind the last tile.
pub fn bounds_geometry(length: usize) -> [BoundsPiece; 4] {
    #[allow(clippy::cast_precision_loss)]
    let span = length as Real * TILE_SIZE;
    let front = TILE_SIZE / 2.0;
    let mid_z = front - span / 2.0;
    let wall_y = WALL_HEIGHT / 2.0;
    let side_x = TILE_SIZE / 2.0 + WALL_THICKNESS / 2.0;

    let side = vector![WALL_THICKNESS / 2.0, WALL_HEIGHT / 2.0, span / 2.0];

    [
        BoundsPiece {
            part: BoundsPart::RightWall,
            center: vector![side_x, wall_y, mid_z],
            half_extents: side,
        },
        BoundsPiece {
            part: BoundsPart::LeftWall,
            center: vector![-side_x, wall_y, mid_z],
            half_extents: side,
        },
        BoundsPiece {
            part: BoundsPart::BackWall,
            center: vector![0.0, wall_y, front - span],
            half_extents: vector![TILE_SIZE / 2.0, WALL_HEIGHT / 2.0, WALL_THICKNESS / 2.0],
        },
        BoundsPiece {
            part: BoundsPart::Floor,
            center: vector![0.0, -FLOOR_THICKNESS / 2.0, mid_z],
            half_extents: vector![TILE_SIZE / 2.0, FLOOR_THICKNESS / 2.0, span / 2.0],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece(pieces: &[BoundsPiece], part: BoundsPart) -> BoundsPiece {
        *pieces.iter().find(|p| p.part == part).unwrap()
    }

    #[test]
    fn test_tile_positions_step_along_negative_z() {
        assert_eq!(tile_position(0), vector![0.0, 0.0, 0.0]);
        assert_eq!(tile_position(1), vector![0.0, 0.0, -4.0]);
        assert_eq!(tile_position(6), vector![0.0, 0.0, -24.0]);
    }

    #[test]
    fn test_bounds_match_track_length() {
        let pieces = bounds_geometry(7);

        let right = piece(&pieces, BoundsPart::RightWall);
        assert!((right.center - vector![2.15, 0.75, -12.0]).norm() < 1e-6);
        assert!((right.half_extents - vector![0.15, 0.75, 14.0]).norm() < 1e-6);

        let left = piece(&pieces, BoundsPart::LeftWall);
        assert_eq!(left.center.x, -right.center.x);

        let back = piece(&pieces, BoundsPart::BackWall);
        assert_eq!(back.center, vector![0.0, 0.75, -26.0]);

        let floor = piece(&pieces, BoundsPart::Floor);
        assert_eq!(floor.center, vector![0.0, -0.1, -12.0]);
        assert_eq!(floor.half_extents, vector![2.0, 0.1, 14.0]);
    }

    #[test]
    fn test_minimal_bounds_cover_start_and_end() {
        let floor = piece(&bounds_geometry(2), BoundsPart::Floor);
        let near = floor.center.z + floor.half_extents.z;
        let far = floor.center.z - floor.half_extents.z;

        assert_eq!(near, 2.0);
        assert_eq!(far, tile_position(1).z - TILE_SIZE / 2.0);
    }

    #[test]
    fn test_footprints() {
        assert!(SegmentKind::End.footprint().decoration.is_some());
        assert!(SegmentKind::Start.footprint().decoration.is_none());
        assert_eq!(
            SegmentKind::Obstacle(Archetype::Axe).footprint().floor_style,
            FloorStyle::Secondary
        );
        assert_eq!(Archetype::Axe.half_extents(), vector![0.75, 0.75, 0.15]);
    }

    #[test]
    fn test_segment_kind_serde() {
        let json = serde_json::to_string(&SegmentKind::Obstacle(Archetype::Limbo)).unwrap();
        assert_eq!(json, r#"{"type":"obstacle","archetype":"limbo"}"#);
        let back: SegmentKind = serde_json::from_str(r#"{"type":"start"}"#).unwrap();
        assert_eq!(back, SegmentKind::Start);
    }
}
