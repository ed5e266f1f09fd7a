//! Capsule-shaped segments indexed by the zone BSP.

use nalgebra::Point3;

use super::node::Axis;
use crate::plane::CLIP_EPSILON;
use crate::polygon::distance_to_segment;

/// A capsule: every point within `c_radius` of the segment `start`-`end`.
///
/// `s_radius` is the radius of a sphere around `middle` that encloses the
/// whole capsule, used for cheap rejection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BspSegment {
    pub start: Point3<f64>,
    pub middle: Point3<f64>,
    pub end: Point3<f64>,
    pub c_radius: f64,
    pub s_radius: f64,
    /// Index of the clipping zone this capsule stands for, if any.
    pub zone: Option<usize>,
}

impl BspSegment {
    pub fn new(start: Point3<f64>, end: Point3<f64>, radius: f64) -> Self {
        let middle = nalgebra::center(&start, &end);
        Self {
            start,
            middle,
            end,
            c_radius: radius,
            s_radius: (end - middle).norm() + radius,
            zone: None,
        }
    }

    pub fn with_zone(mut self, zone: usize) -> Self {
        self.zone = Some(zone);
        self
    }

    /// Lowest and highest endpoint coordinate along `axis`, without radius.
    #[inline]
    pub fn extent(&self, axis: Axis) -> (f64, f64) {
        let (a, b) = (axis.coord(&self.start), axis.coord(&self.end));
        (a.min(b), a.max(b))
    }

    /// Returns true if the point lies within the capsule.
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        distance_to_segment(point, &self.start, &self.end) <= self.c_radius
    }

    /// Returns true if the two capsules overlap.
    ///
    /// The pair is measured in a fixed order, so `a.touch(&b)` and
    /// `b.touch(&a)` always agree.
    pub fn touch(&self, other: &BspSegment) -> bool {
        if (other.middle - self.middle).norm() > other.s_radius + self.s_radius {
            return false;
        }
        let (a, b) = if self.key() <= other.key() {
            (self, other)
        } else {
            (other, self)
        };
        segment_distance(a, b) < self.c_radius + other.c_radius
    }

    fn key(&self) -> [f64; 6] {
        [
            self.start.x,
            self.start.y,
            self.start.z,
            self.end.x,
            self.end.y,
            self.end.z,
        ]
    }
}

/// Minimum distance between the centerlines of two capsules.
///
/// The minimum lies either strictly inside both segments or at an endpoint
/// of one of them, so the endpoint distances cover every case the interior
/// solution does not, including parallel and zero-length segments.
fn segment_distance(a: &BspSegment, b: &BspSegment) -> f64 {
    let endpoints = distance_to_segment(&a.start, &b.start, &b.end)
        .min(distance_to_segment(&a.end, &b.start, &b.end))
        .min(distance_to_segment(&b.start, &a.start, &a.end))
        .min(distance_to_segment(&b.end, &a.start, &a.end));

    let w = a.start - b.start;
    let u = a.end - a.start;
    let v = b.end - b.start;

    let uu = u.dot(&u);
    let uv = u.dot(&v);
    let vv = v.dot(&v);
    let uw = u.dot(&w);
    let vw = v.dot(&w);

    // sin² of the angle between the segments, scaled by both lengths.
    let d = uu * vv - uv * uv;
    if d <= CLIP_EPSILON * uu * vv {
        return endpoints;
    }

    let s = (uv * vw - vv * uw) / d;
    let t = (uu * vw - uv * uw) / d;
    if (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t) {
        endpoints.min((w + u * s - v * t).norm())
    } else {
        endpoints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_segment(a: [f64; 3], b: [f64; 3], r: f64) -> BspSegment {
        BspSegment::new(Point3::from(a), Point3::from(b), r)
    }

    #[test]
    fn sphere_radius_encloses_capsule() {
        let seg = make_segment([0.0, 0.0, 0.0], [4.0, 0.0, 0.0], 1.0);
        assert_eq!(seg.middle, Point3::new(2.0, 0.0, 0.0));
        assert_eq!(seg.s_radius, 3.0);
        assert_eq!(seg.extent(Axis::X), (0.0, 4.0));
    }

    #[test]
    fn crossing_segments_touch() {
        let a = make_segment([-1.0, 0.0, 0.0], [1.0, 0.0, 0.0], 0.1);
        let b = make_segment([0.0, -1.0, 0.5], [0.0, 1.0, 0.5], 0.1);
        assert!(!a.touch(&b));
        let b = make_segment([0.0, -1.0, 0.15], [0.0, 1.0, 0.15], 0.1);
        assert!(a.touch(&b));
        assert!(b.touch(&a));
    }

    #[test]
    fn parallel_segments_use_gap() {
        let a = make_segment([0.0, 0.0, 0.0], [10.0, 0.0, 0.0], 0.5);
        let near = make_segment([2.0, 0.9, 0.0], [8.0, 0.9, 0.0], 0.5);
        let far = make_segment([2.0, 1.1, 0.0], [8.0, 1.1, 0.0], 0.5);
        assert!(a.touch(&near));
        assert!(!a.touch(&far));
    }

    #[test]
    fn end_to_end_gap() {
        let a = make_segment([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], 0.5);
        let b = make_segment([1.8, 0.0, 0.0], [3.0, 0.0, 0.0], 0.5);
        let c = make_segment([2.2, 0.0, 0.0], [3.0, 0.0, 0.0], 0.5);
        assert!(a.touch(&b));
        assert!(!a.touch(&c));
    }

    #[test]
    fn point_containment() {
        let seg = make_segment([0.0, 0.0, 0.0], [2.0, 0.0, 0.0], 1.0);
        assert!(seg.contains(&Point3::new(1.0, 1.0, 0.0)));
        assert!(seg.contains(&Point3::new(2.5, 0.0, 0.0)));
        assert!(!seg.contains(&Point3::new(3.5, 0.0, 0.0)));
    }

    #[test]
    fn degenerate_segments_are_spheres() {
        let a = make_segment([0.0, 0.0, 0.0], [0.0, 0.0, 0.0], 1.0);
        let b = make_segment([1.5, 0.0, 0.0], [1.5, 0.0, 0.0], 1.0);
        let c = make_segment([2.5, 0.0, 0.0], [2.5, 0.0, 0.0], 1.0);
        assert!(a.touch(&b));
        assert!(!a.touch(&c));
    }

    #[test]
    fn short_perpendicular_segments_touch_both_ways() {
        let a = make_segment([-0.01, 0.0, 0.0], [0.01, 0.0, 0.0], 0.004);
        let b = make_segment([0.0, 0.0, 0.005], [0.0, 0.02, 0.005], 0.004);
        assert!(a.touch(&b));
        assert!(b.touch(&a));
        let c = make_segment([0.0, 0.0, 0.009], [0.0, 0.02, 0.009], 0.004);
        assert!(!a.touch(&c));
        assert!(!c.touch(&a));
    }

    #[test]
    fn touch_is_symmetric() {
        let mut segments = Vec::new();
        for i in 0..7 {
            let f = i as f64;
            let scale = [0.003, 0.05, 1.0, 20.0][i % 4];
            let start = [f * 0.37 * scale, -f * 0.21 * scale, (f * 1.3).sin() * scale];
            let end = [
                start[0] + (f * 0.9).cos() * scale,
                start[1] + (f * 0.4).sin() * scale,
                start[2] + 0.3 * scale,
            ];
            segments.push(make_segment(start, end, 0.4 * scale));
            segments.push(make_segment(end, [end[0] + 0.5 * scale, end[1], end[2] - scale], 0.2 * scale));
        }
        segments.push(make_segment([0.0, 0.0, 0.0], [0.0, 0.0, 0.0], 0.01));
        segments.push(make_segment([0.001, 0.0, 0.0], [0.004, 0.0, 0.0], 0.001));

        let mut touching = 0;
        for a in &segments {
            for b in &segments {
                assert_eq!(a.touch(b), b.touch(a), "{a:?} / {b:?}");
                touching += usize::from(a.touch(b));
            }
        }
        assert!(touching > segments.len());
    }

    #[test]
    fn touch_matches_sampled_distance() {
        let a = make_segment([0.0, 0.0, 0.0], [0.02, 0.01, 0.0], 0.0);
        let b = make_segment([0.01, -0.01, 0.003], [0.012, 0.02, 0.004], 0.0);
        let mut best = f64::MAX;
        for i in 0..=400 {
            for j in 0..=400 {
                let p = a.start + (a.end - a.start) * (i as f64 / 400.0);
                let q = b.start + (b.end - b.start) * (j as f64 / 400.0);
                best = best.min((p - q).norm());
            }
        }
        let exact = segment_distance(&a, &b);
        assert!(exact <= best + 1e-12);
        assert!(best - exact < 1e-4);
    }
}
