//! Static road-network geometry
//!
//! Roads are axis-aligned segments with integer endpoints. A road covers
//! its centerline plus `HALF_ROAD_WIDTH` on every side, so two roads that
//! touch at a corner overlap in a small square.

use std::fmt;

use glam::{DVec2, IVec2};
use serde::{Deserialize, Serialize};

use crate::consts::HALF_ROAD_WIDTH;
use crate::min_max;

/// An axis-aligned road segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Road {
    start: IVec2,
    end: IVec2,
}

impl Road {
    /// Road running along x from `start` to `end_x`
    pub fn horizontal(start: IVec2, end_x: i32) -> Self {
        Self {
            start,
            end: IVec2::new(end_x, start.y),
        }
    }

    /// Road running along y from `start` to `end_y`
    pub fn vertical(start: IVec2, end_y: i32) -> Self {
        Self {
            start,
            end: IVec2::new(start.x, end_y),
        }
    }

    #[inline]
    pub fn is_horizontal(&self) -> bool {
        self.start.y == self.end.y
    }

    #[inline]
    pub fn is_vertical(&self) -> bool {
        self.start.x == self.end.x
    }

    #[inline]
    pub fn start(&self) -> IVec2 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> IVec2 {
        self.end
    }

    /// Centerline bounding box as (min, max) corners
    pub fn bounds(&self) -> (DVec2, DVec2) {
        let (min_x, max_x) = min_max(self.start.x as f64, self.end.x as f64);
        let (min_y, max_y) = min_max(self.start.y as f64, self.end.y as f64);
        (DVec2::new(min_x, min_y), DVec2::new(max_x, max_y))
    }

    /// Check whether a point lies on the road surface (centerline box
    /// widened by half the road width on both axes)
    pub fn contains(&self, point: DVec2) -> bool {
        let (min, max) = self.bounds();
        point.x >= min.x - HALF_ROAD_WIDTH
            && point.x <= max.x + HALF_ROAD_WIDTH
            && point.y >= min.y - HALF_ROAD_WIDTH
            && point.y <= max.y + HALF_ROAD_WIDTH
    }
}

/// A building footprint; purely decorative for the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub position: IVec2,
    pub size: IVec2,
}

impl Building {
    pub fn new(position: IVec2, size: IVec2) -> Self {
        Self { position, size }
    }
}

/// Office identifier, unique within a map
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfficeId(pub String);

impl fmt::Display for OfficeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A drop-off point where carried loot turns into score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Office {
    pub id: OfficeId,
    pub position: IVec2,
    /// Sprite offset relative to `position`
    pub offset: IVec2,
}

impl Office {
    pub fn new(id: OfficeId, position: IVec2, offset: IVec2) -> Self {
        Self {
            id,
            position,
            offset,
        }
    }

    /// Point used for deposit collision tests
    pub fn collision_point(&self) -> DVec2 {
        (self.position - self.offset).as_dvec2()
    }
}
