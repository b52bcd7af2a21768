use rstar::AABB as RStarAabb;

/// An axis-aligned box in world space, used both as a player's view box
/// and as the query shape for [`crate::Predicate::TouchBox`].
#[derive(Debug, Clone, PartialEq)]
pub struct Aabb {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Aabb {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    /// A cubic box of side `2*radius` centered on `center`, the shape of
    /// a player's view box.
    pub fn centered(center: [f64; 3], radius: f64) -> Self {
        Self::new(
            [center[0] - radius, center[1] - radius, center[2] - radius],
            [center[0] + radius, center[1] + radius, center[2] + radius],
        )
    }

    pub fn contains_point(&self, p: [f64; 3]) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        (0..3).all(|i| self.min[i] <= other.max[i] && self.max[i] >= other.min[i])
    }

    pub(crate) fn envelope(&self) -> RStarAabb<[f64; 3]> {
        RStarAabb::from_corners(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_point_is_inclusive_of_edges() {
        let b = Aabb::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        assert!(b.contains_point([0.0, 0.0, 0.0]));
        assert!(b.contains_point([1.0, 1.0, 1.0]));
        assert!(!b.contains_point([1.0001, 0.0, 0.0]));
    }

    #[test]
    fn intersects_detects_overlap_and_disjoint() {
        let a = Aabb::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let overlapping = Aabb::new([0.5, 0.5, 0.5], [2.0, 2.0, 2.0]);
        let disjoint = Aabb::new([5.0, 5.0, 5.0], [6.0, 6.0, 6.0]);

        assert!(a.intersects(&overlapping));
        assert!(!a.intersects(&disjoint));
    }
}
