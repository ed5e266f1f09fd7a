//! Face planes of a convex clipping zone.

use nalgebra::{Point3, Vector3};

use crate::config::ClipConfig;
use crate::polygon::Polygon;

/// Default tolerance for plane classification.
/// Points within this distance of the plane are considered "on" the plane.
pub const CLIP_EPSILON: f64 = 1e-5;

/// Which side of a zone face a point lies on.
///
/// The normal of every face points out of the zone, so "inside" is the
/// negative half-space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Strictly behind the plane (inside the zone).
    Inside,
    /// Within tolerance of the plane.
    On,
    /// Strictly in front of the plane (outside the zone).
    Outside,
}

impl Location {
    /// -1, 0 or +1. Summing the signs of a triangle's corners tells the
    /// split algorithm which configuration it is dealing with.
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            Location::Inside => -1,
            Location::On => 0,
            Location::Outside => 1,
        }
    }
}

/// One face of a convex zone, represented by a point on the face and an
/// outward unit normal.
#[derive(Debug, Clone, PartialEq)]
pub struct ClippingPlane {
    normal: Vector3<f64>,
    vertex: Point3<f64>,
    boundary: Polygon,
    epsilon: f64,
    boundary_check: bool,
}

impl ClippingPlane {
    /// Builds a plane from a planar ring of points.
    ///
    /// The first point is the reference vertex and the normal follows the
    /// right-hand rule over the first three points. A degenerate ring yields a
    /// zero normal, which classifies every point as on-plane.
    pub fn from_ring(points: &[Point3<f64>]) -> Self {
        let (vertex, normal) = match points {
            [a, b, c, ..] => (*a, unit((b - a).cross(&(c - a)))),
            [a, ..] => (*a, Vector3::zeros()),
            [] => (Point3::origin(), Vector3::zeros()),
        };
        Self {
            normal,
            vertex,
            boundary: Polygon::new(points.to_vec()),
            epsilon: CLIP_EPSILON,
            boundary_check: false,
        }
    }

    /// Builds a side face of a prism from its four corners.
    ///
    /// The reference vertex is the midpoint of the `p0`-`p2` diagonal, which
    /// stays on the best-fit plane when the quad is slightly twisted.
    pub fn from_quad(p0: Point3<f64>, p1: Point3<f64>, p2: Point3<f64>, p3: Point3<f64>) -> Self {
        Self {
            normal: unit((p1 - p0).cross(&(p2 - p0))),
            vertex: nalgebra::center(&p0, &p2),
            boundary: Polygon::new(vec![p0, p1, p2, p3]),
            epsilon: CLIP_EPSILON,
            boundary_check: false,
        }
    }

    /// Adopts the tolerance and boundary policy of a clip configuration.
    pub fn with_config(mut self, config: &ClipConfig) -> Self {
        self.epsilon = config.epsilon;
        self.boundary_check = config.boundary_check;
        self
    }

    /// Returns the outward unit normal.
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    /// Returns the reference point on the plane.
    #[inline]
    pub fn vertex(&self) -> Point3<f64> {
        self.vertex
    }

    /// Returns the face polygon bounding this plane.
    #[inline]
    pub fn boundary(&self) -> &Polygon {
        &self.boundary
    }

    #[inline]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Signed distance from the plane; positive is outside the zone.
    #[inline]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        (point - self.vertex).dot(&self.normal)
    }

    /// Classifies a point against the plane using the plane's tolerance.
    #[inline]
    pub fn location(&self, point: &Point3<f64>) -> Location {
        let dist = self.signed_distance(point);
        if dist < -self.epsilon {
            Location::Inside
        } else if dist > self.epsilon {
            Location::Outside
        } else {
            Location::On
        }
    }

    #[inline]
    pub fn inside(&self, point: &Point3<f64>) -> bool {
        self.signed_distance(point) < self.epsilon
    }

    #[inline]
    pub fn outside(&self, point: &Point3<f64>) -> bool {
        self.signed_distance(point) > self.epsilon
    }

    #[inline]
    pub fn on(&self, point: &Point3<f64>) -> bool {
        self.signed_distance(point).abs() < self.epsilon
    }

    /// Intersects the line through `p0` and `p1` with the plane.
    ///
    /// Returns `p0` when the line runs parallel to the plane.
    pub fn interpolate(&self, p0: &Point3<f64>, p1: &Point3<f64>) -> Point3<f64> {
        let u = p1 - p0;
        let denom = self.normal.dot(&u);
        if denom.abs() < f64::EPSILON {
            return *p0;
        }
        let t = self.normal.dot(&(self.vertex - p0)) / denom;
        p0 + u * t
    }

    /// Returns true if a split point lies on the face polygon.
    ///
    /// Always true unless the boundary check is enabled, in which case the
    /// point must be within tolerance of the face polygon.
    pub fn intersects(&self, point: &Point3<f64>) -> bool {
        if !self.boundary_check {
            return true;
        }
        self.boundary.distance_to(point) < self.epsilon
    }
}

fn unit(v: Vector3<f64>) -> Vector3<f64> {
    v.try_normalize(f64::MIN_POSITIVE).unwrap_or_else(Vector3::zeros)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn floor_plane() -> ClippingPlane {
        // Counter-clockwise seen from +Z: normal is +Z.
        ClippingPlane::from_ring(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ])
    }

    #[test]
    fn ring_normal_follows_winding() {
        let plane = floor_plane();
        assert_relative_eq!(plane.normal(), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(plane.vertex(), Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn quad_vertex_is_diagonal_midpoint() {
        let plane = ClippingPlane::from_quad(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 2.0),
            Point3::new(0.0, 0.0, 2.0),
        );
        assert_eq!(plane.vertex(), Point3::new(1.0, 0.0, 1.0));
        assert_relative_eq!(plane.normal(), Vector3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn location_uses_tolerance() {
        let plane = floor_plane();
        assert_eq!(plane.location(&Point3::new(0.5, 0.5, -1.0)), Location::Inside);
        assert_eq!(plane.location(&Point3::new(0.5, 0.5, 1.0)), Location::Outside);
        assert_eq!(plane.location(&Point3::new(0.5, 0.5, 5e-6)), Location::On);
        assert_eq!(plane.location(&Point3::new(0.5, 0.5, -5e-6)), Location::On);
    }

    #[test]
    fn custom_epsilon_from_config() {
        let plane = floor_plane().with_config(&ClipConfig::default().with_epsilon(0.1));
        assert_eq!(plane.location(&Point3::new(0.0, 0.0, 0.05)), Location::On);
        assert!(plane.on(&Point3::new(0.0, 0.0, -0.05)));
        assert!(plane.inside(&Point3::new(0.0, 0.0, -0.5)));
        assert!(plane.outside(&Point3::new(0.0, 0.0, 0.5)));
    }

    #[test]
    fn interpolate_finds_crossing() {
        let plane = floor_plane();
        let p = plane.interpolate(&Point3::new(0.0, 0.0, -1.0), &Point3::new(2.0, 2.0, 3.0));
        assert_relative_eq!(p, Point3::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn interpolate_parallel_returns_start() {
        let plane = floor_plane();
        let start = Point3::new(0.0, 0.0, 1.0);
        assert_eq!(plane.interpolate(&start, &Point3::new(1.0, 0.0, 1.0)), start);
    }

    #[test]
    fn degenerate_ring_classifies_everything_on_plane() {
        let plane = ClippingPlane::from_ring(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ]);
        assert_eq!(plane.location(&Point3::new(5.0, 5.0, 5.0)), Location::On);
    }

    #[test]
    fn intersects_is_permissive_without_boundary_check() {
        let plane = floor_plane();
        assert!(plane.intersects(&Point3::new(50.0, 50.0, 0.0)));

        let checked = floor_plane().with_config(&ClipConfig::default().with_boundary_check(true));
        assert!(checked.intersects(&Point3::new(0.5, 0.5, 0.0)));
        assert!(checked.intersects(&Point3::new(1.0, 0.5, 0.0)));
        assert!(!checked.intersects(&Point3::new(50.0, 50.0, 0.0)));
    }
}
