//! Segment/point collision detection for loot pickup and office deposits
//!
//! A dog sweeps a straight segment each tick. A point is collected when its
//! projection falls on the segment and it lies within the pickup radius of
//! the segment's line.

use glam::DVec2;

use super::map::Map;
use crate::consts::OFFICE_COLLECT_RADIUS;

/// Result of testing a point against a motion segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollectionResult {
    /// Squared distance from the point to the segment's line
    pub sq_distance: f64,
    /// Fraction of the segment travelled at the point's projection
    /// (outside [0, 1] when the projection misses the segment)
    pub proj_ratio: f64,
}

impl CollectionResult {
    #[inline]
    pub fn is_collected(&self, radius: f64) -> bool {
        self.proj_ratio >= 0.0 && self.proj_ratio <= 1.0 && self.sq_distance <= radius * radius
    }
}

/// Test point `c` against the motion from `a` to `b`
///
/// The segment must have non-zero length; callers skip dogs that did not move.
pub fn try_collect_point(a: DVec2, b: DVec2, c: DVec2) -> CollectionResult {
    debug_assert!(a != b, "zero-length motion segment");
    let u = c - a;
    let v = b - a;
    let u_dot_v = u.dot(v);
    let v_len2 = v.length_squared();
    CollectionResult {
        sq_distance: u.length_squared() - (u_dot_v * u_dot_v) / v_len2,
        proj_ratio: u_dot_v / v_len2,
    }
}

/// Offices whose deposit zone the motion from `a` to `b` passes through
pub fn office_crossings(map: &Map, a: DVec2, b: DVec2) -> Vec<CollectionResult> {
    map.offices()
        .iter()
        .map(|office| try_collect_point(a, b, office.collision_point()))
        .filter(|result| result.is_collected(OFFICE_COLLECT_RADIUS))
        .collect()
}

/// True when any crossed office lies strictly earlier on the path than `target`
#[inline]
pub fn office_precedes(crossings: &[CollectionResult], target: &CollectionResult) -> bool {
    crossings
        .iter()
        .any(|office| office.proj_ratio < target.proj_ratio)
}
