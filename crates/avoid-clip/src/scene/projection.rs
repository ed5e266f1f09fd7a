//! Local 2D frames anchored at points along a path.

use nalgebra::{Point2, Point3, Vector3};

use crate::plane::CLIP_EPSILON;

/// An orthonormal frame `(e1, e2, normal)` anchored at `origin`.
///
/// Cross sections are authored in the `(e1, e2)` plane and placed in world
/// space with [`Projection2D::to_3d`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection2D {
    origin: Point3<f64>,
    e1: Vector3<f64>,
    e2: Vector3<f64>,
    normal: Vector3<f64>,
}

impl Projection2D {
    /// Builds a frame from an origin and a plane normal.
    ///
    /// Axis-aligned normals get fixed bases. Otherwise `e1` is forced into the
    /// XY plane and `e2` is oriented to point upward.
    pub fn new(origin: Point3<f64>, normal: Vector3<f64>) -> Self {
        let n = normal.try_normalize(f64::MIN_POSITIVE).unwrap_or_else(Vector3::z);
        let small = |v: f64| v.abs() < CLIP_EPSILON;

        let (e1, e2) = if small(normal.x) && small(normal.y) {
            let e1 = Vector3::x();
            (e1, n.cross(&e1))
        } else if small(normal.z) && (small(normal.x) || small(normal.y)) {
            let e2 = Vector3::z();
            (e2.cross(&n), e2)
        } else {
            let e1 = Vector3::new(n.y, -n.x, 0.0).normalize();
            let e2 = n.cross(&e1).normalize();
            if e2.z < 0.0 { (-e1, -e2) } else { (e1, e2) }
        };

        Self { origin, e1, e2, normal: n }
    }

    /// Builds a frame on the plane through three points, anchored at `p1`.
    pub fn from_points(p1: &Point3<f64>, p2: &Point3<f64>, p3: &Point3<f64>) -> Self {
        Self::new(*p1, (p2 - p1).cross(&(p3 - p1)))
    }

    #[inline]
    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    /// Returns the in-plane basis vectors.
    #[inline]
    pub fn basis(&self) -> (Vector3<f64>, Vector3<f64>) {
        (self.e1, self.e2)
    }

    /// Maps a frame-local point into world space.
    pub fn to_3d(&self, p: &Point2<f64>) -> Point3<f64> {
        self.origin + self.e1 * p.x + self.e2 * p.y
    }

    /// Projects a world point onto the frame plane, dropping the normal
    /// component.
    pub fn to_2d(&self, p: &Point3<f64>) -> Point2<f64> {
        let d = p - self.origin;
        Point2::new(d.dot(&self.e1), d.dot(&self.e2))
    }

    /// Distance of a world point along the frame normal.
    pub fn height(&self, p: &Point3<f64>) -> f64 {
        (p - self.origin).dot(&self.normal)
    }
}
