//! Convex prisms that remove geometry.

use nalgebra::{Point2, Point3, Vector2, Vector3};

use crate::bounds::BoundingBox;
use crate::bsp::BspSegment;
use crate::config::ClipConfig;
use crate::edge::ClippingEdge;
use crate::plane::ClippingPlane;
use crate::scene::{AvoidArea, Projection2D, SceneId};
use crate::triangle::{ClippingTriangle, TriangleFlags};

/// A convex volume built by sweeping an avoid area between two frames.
///
/// Faces are ordered top, bottom, then one side per area edge, and every
/// face normal points out of the zone.
#[derive(Debug, Clone, PartialEq)]
pub struct ClippingZone {
    planes: Vec<ClippingPlane>,
    bounds: BoundingBox,
    segment: BspSegment,
    priority: i32,
    source: Option<SceneId>,
    epsilon: f64,
    cap_exposed_faces: bool,
}

impl ClippingZone {
    /// Builds the prism between `area` placed in `start` and in `stop`,
    /// shifted by `offset`.
    ///
    /// The area may repeat its first point at the end. Areas with fewer than
    /// three distinct points yield a zone that is disjoint from everything.
    pub fn new(
        area: &AvoidArea,
        start: &Projection2D,
        stop: &Projection2D,
        offset: &Vector3<f64>,
        config: &ClipConfig,
    ) -> Self {
        let ring = area.open_ring(config.epsilon);
        let centroid = Self::avoid_area_centroid(ring);
        let radius = Self::avoid_area_radius(ring, &centroid);
        let segment = BspSegment::new(
            start.to_3d(&centroid) + offset,
            stop.to_3d(&centroid) + offset,
            radius,
        );

        let mut zone = Self {
            planes: Vec::new(),
            bounds: BoundingBox::empty(),
            segment,
            priority: 0,
            source: None,
            epsilon: config.epsilon,
            cap_exposed_faces: config.cap_exposed_faces,
        };
        if ring.len() < 3 {
            return zone;
        }

        let mut upper: Vec<Point3<f64>> = ring.iter().map(|p| start.to_3d(p) + offset).collect();
        let mut lower: Vec<Point3<f64>> = ring.iter().map(|p| stop.to_3d(p) + offset).collect();

        let facing = (upper[1] - upper[0]).cross(&(upper[2] - upper[0]));
        if facing.dot(&(upper[0] - lower[0])) < 0.0 {
            upper.reverse();
            lower.reverse();
        }

        let n = ring.len();
        let mut planes = Vec::with_capacity(n + 2);
        planes.push(ClippingPlane::from_ring(&upper));
        let bottom: Vec<Point3<f64>> = lower.iter().rev().copied().collect();
        planes.push(ClippingPlane::from_ring(&bottom));
        for i in 0..n {
            let next = (i + 1) % n;
            planes.push(ClippingPlane::from_quad(lower[i], lower[next], upper[next], upper[i]));
        }
        zone.planes = planes.into_iter().map(|p| p.with_config(config)).collect();
        zone.bounds = BoundingBox::from_points(upper.iter().chain(lower.iter()));
        zone
    }

    /// Tags the zone with the scene it was built from and that scene's
    /// priority.
    pub fn with_source(mut self, scene: SceneId, priority: i32) -> Self {
        self.source = Some(scene);
        self.priority = priority;
        self
    }

    /// Area centroid of a ring by the shoelace formula.
    ///
    /// Falls back to the vertex average when the ring has no area.
    pub fn avoid_area_centroid(area: &[Point2<f64>]) -> Point2<f64> {
        let n = area.len();
        if n == 0 {
            return Point2::origin();
        }
        let (mut a, mut x, mut y) = (0.0, 0.0, 0.0);
        for i in 0..n {
            let (p, q) = (&area[i], &area[(i + 1) % n]);
            let cross = p.x * q.y - q.x * p.y;
            x += (p.x + q.x) * cross;
            y += (p.y + q.y) * cross;
            a += cross;
        }
        if a.abs() < f64::EPSILON {
            let sum = area.iter().fold(Vector2::zeros(), |acc, p| acc + p.coords);
            return Point2::from(sum / n as f64);
        }
        Point2::new(x / (3.0 * a), y / (3.0 * a))
    }

    /// Largest distance from `centroid` to a ring vertex.
    pub fn avoid_area_radius(area: &[Point2<f64>], centroid: &Point2<f64>) -> f64 {
        area.iter()
            .map(|p| (p - centroid).norm_squared())
            .fold(0.0, f64::max)
            .sqrt()
    }

    #[inline]
    pub fn planes(&self) -> &[ClippingPlane] {
        &self.planes
    }

    #[inline]
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounds
    }

    /// The capsule enclosing the zone, used to index it.
    #[inline]
    pub fn segment(&self) -> &BspSegment {
        &self.segment
    }

    #[inline]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// The scene the zone was built from, if any.
    #[inline]
    pub fn source(&self) -> Option<SceneId> {
        self.source
    }

    /// Tolerance the zone's faces were built with.
    #[inline]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    #[inline]
    pub fn disjoint_point(&self, point: &Point3<f64>) -> bool {
        !self.bounds.contains(point)
    }

    #[inline]
    pub fn disjoint_triangle(&self, triangle: &ClippingTriangle) -> bool {
        !self.bounds.intersects(triangle.bounding_box())
    }

    #[inline]
    pub fn disjoint(&self, other: &ClippingZone) -> bool {
        !self.bounds.intersects(&other.bounds)
    }

    /// Returns true if the segment `p0`-`p1` passes through the zone's
    /// interior.
    pub fn intersect(&self, p0: &Point3<f64>, p1: &Point3<f64>) -> bool {
        if self.planes.is_empty() {
            return false;
        }
        let mut enter = f64::NEG_INFINITY;
        let mut exit = f64::INFINITY;
        let u = p1 - p0;

        for plane in &self.planes {
            let num = plane.normal().dot(&(p0 - plane.vertex()));
            let denom = plane.normal().dot(&u);
            if denom == 0.0 {
                if num > -self.epsilon {
                    return false;
                }
                continue;
            }
            let t = -num / denom;
            if denom > 0.0 {
                exit = exit.min(t);
            } else {
                enter = enter.max(t);
            }
            if exit < enter {
                return false;
            }
        }

        let eps = self.epsilon;
        let beyond_end = enter > 1.0 - eps && exit > 1.0 - eps;
        let before_start = enter < eps && exit < eps;
        !(beyond_end || before_start)
    }

    /// Clips `source` by this zone, appending the surviving triangles to
    /// `destination`.
    ///
    /// Triangles whose box misses the zone are passed through untouched. A
    /// triangle lying on a zone face survives only when it is not sandwiched
    /// between two opposing faces.
    pub fn process_triangles(
        &self,
        source: &[ClippingTriangle],
        destination: &mut Vec<ClippingTriangle>,
        triangle_priority: i32,
    ) {
        let mut current = Vec::with_capacity(source.len());
        let mut next = Vec::with_capacity(source.len());
        for triangle in source {
            if self.disjoint_triangle(triangle) {
                destination.push(*triangle);
            } else {
                current.push(*triangle);
            }
        }
        if current.is_empty() {
            return;
        }

        let relative_priority = triangle_priority - self.priority;
        let mut edges: Vec<Vec<ClippingEdge>> = vec![Vec::new(); self.planes.len()];
        let last = self.planes.len().saturating_sub(1);

        for (i, (plane, plane_edges)) in self.planes.iter().zip(edges.iter_mut()).enumerate() {
            for triangle in current.drain(..) {
                plane.split(&triangle, &mut next, destination, plane_edges, relative_priority, i == last);
            }
            std::mem::swap(&mut current, &mut next);
        }

        Self::handle_coplanar(&mut current, destination);

        if self.cap_exposed_faces {
            for (plane, plane_edges) in self.planes.iter().zip(edges.iter_mut()) {
                plane.patch_holes(plane_edges, destination);
            }
        }
    }

    /// Settles triangles that ended up inside every face.
    fn handle_coplanar(inside: &mut [ClippingTriangle], destination: &mut Vec<ClippingTriangle>) {
        for triangle in inside.iter_mut() {
            triangle.reset_flags();
            if !triangle.flags.is_empty() && !triangle.flags.contains(TriangleFlags::PLANAR_BOTH) {
                destination.push(*triangle);
            }
        }
    }
}
