//! Split value strategies for the zone BSP.

use super::node::Axis;
use super::segment::BspSegment;

/// Strategy for choosing where a node splits along its axis.
pub trait SplitSelector {
    /// Chooses the split value for `segments` along `axis`.
    ///
    /// Returns `None` if there is nothing to split.
    fn select<'a, I>(&self, segments: I, axis: Axis) -> Option<f64>
    where
        I: IntoIterator<Item = &'a BspSegment>;
}

/// Splits halfway between the lowest and highest segment endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtentMidpoint;

impl SplitSelector for ExtentMidpoint {
    fn select<'a, I>(&self, segments: I, axis: Axis) -> Option<f64>
    where
        I: IntoIterator<Item = &'a BspSegment>,
    {
        segments
            .into_iter()
            .map(|s| s.extent(axis))
            .reduce(|(lo, hi), (a, b)| (lo.min(a), hi.max(b)))
            .map(|(lo, hi)| (lo + hi) * 0.5)
    }
}

/// Splits at the median of the segment midpoints.
///
/// Balances leaf populations better than [`ExtentMidpoint`] when zones
/// cluster at one end of the scene.
#[derive(Debug, Clone, Copy, Default)]
pub struct MedianMiddle;

impl SplitSelector for MedianMiddle {
    fn select<'a, I>(&self, segments: I, axis: Axis) -> Option<f64>
    where
        I: IntoIterator<Item = &'a BspSegment>,
    {
        let mut mids: Vec<f64> = segments.into_iter().map(|s| axis.coord(&s.middle)).collect();
        if mids.is_empty() {
            return None;
        }
        mids.sort_by(f64::total_cmp);
        Some(mids[mids.len() / 2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn make_segment(x0: f64, x1: f64) -> BspSegment {
        BspSegment::new(Point3::new(x0, 0.0, 0.0), Point3::new(x1, 0.0, 0.0), 0.5)
    }

    #[test]
    fn extent_midpoint_empty() {
        assert!(ExtentMidpoint.select(std::iter::empty(), Axis::X).is_none());
    }

    #[test]
    fn extent_midpoint_ignores_radius() {
        let segs = [make_segment(4.0, 0.0), make_segment(6.0, 10.0)];
        assert_eq!(ExtentMidpoint.select(&segs, Axis::X), Some(5.0));
        assert_eq!(ExtentMidpoint.select(&segs, Axis::Y), Some(0.0));
    }

    #[test]
    fn median_middle_picks_upper_median() {
        let segs = [
            make_segment(0.0, 2.0),
            make_segment(0.0, 0.0),
            make_segment(10.0, 10.0),
        ];
        assert_eq!(MedianMiddle.select(&segs, Axis::X), Some(1.0));
        assert!(MedianMiddle.select(std::iter::empty(), Axis::X).is_none());
    }
}
