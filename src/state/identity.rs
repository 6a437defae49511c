use crate::screen::locator::Match;
use crate::screen::screen_model::Point;

/// Stand-in for element identity across re-renders.
///
/// A UI dump offers no stable handle, so "the same control" means a match
/// of the same query whose center lies within `tolerance` pixels of the last
/// known center on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpatialAnchor {
    pub center: Point,
    pub tolerance: i32,
}

impl SpatialAnchor {
    pub fn new(center: Point, tolerance: i32) -> Self {
        Self { center, tolerance }
    }

    /// A negative tolerance matches nothing.
    pub fn contains(&self, point: Point) -> bool {
        let Ok(tolerance) = u32::try_from(self.tolerance) else {
            return false;
        };
        point.x.abs_diff(self.center.x) <= tolerance && point.y.abs_diff(self.center.y) <= tolerance
    }

    /// Manhattan distance from the anchor, used to rank candidates.
    pub fn distance(&self, point: Point) -> u64 {
        u64::from(point.x.abs_diff(self.center.x)) + u64::from(point.y.abs_diff(self.center.y))
    }

    /// The in-window match nearest the anchor; ties keep document order.
    pub fn reidentify<'a>(&self, matches: &'a [Match]) -> Option<&'a Match> {
        matches
            .iter()
            .filter(|m| self.contains(m.center))
            .min_by_key(|m| self.distance(m.center))
    }
}
