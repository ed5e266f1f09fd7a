//! Planar polygons used as zone face boundaries and hole outlines.

use nalgebra::{Point2, Point3, Vector3};

use crate::error::{ClipError, Result};
use crate::scene::Projection2D;

/// A planar polygon in 3D space, defined by an ordered ring of vertices.
///
/// The ring is open: the last vertex connects back to the first implicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point3<f64>>,
    frame: Option<Projection2D>,
}

impl Polygon {
    /// Creates a polygon from a ring of vertices.
    ///
    /// A polygon whose vertices are all collinear has no frame. Distance
    /// queries then fall back to the edges.
    pub fn new(vertices: Vec<Point3<f64>>) -> Self {
        let frame = Self::find_frame(&vertices);
        Self { vertices, frame }
    }

    fn find_frame(vertices: &[Point3<f64>]) -> Option<Projection2D> {
        let (p1, rest) = vertices.split_first()?;
        let (p2, rest) = rest.split_first()?;
        rest.iter()
            .find(|p3| (p2 - p1).cross(&(*p3 - p1)).norm_squared() > f64::EPSILON)
            .map(|p3| Projection2D::from_points(p1, p2, p3))
    }

    #[inline]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Computes the area-weighted normal with Newell's method.
    ///
    /// The length of the result is twice the polygon's area.
    pub fn normal(&self) -> Vector3<f64> {
        self.edges().fold(Vector3::zeros(), |acc, (a, b)| {
            acc + Vector3::new(
                (a.y - b.y) * (a.z + b.z),
                (a.z - b.z) * (a.x + b.x),
                (a.x - b.x) * (a.y + b.y),
            )
        })
    }

    pub fn area(&self) -> f64 {
        self.normal().norm() * 0.5
    }

    /// Computes the vertex average.
    pub fn centroid(&self) -> Point3<f64> {
        if self.vertices.is_empty() {
            return Point3::origin();
        }
        let sum: Vector3<f64> = self.vertices.iter().map(|p| p.coords).sum();
        Point3::from(sum / self.vertices.len() as f64)
    }

    /// Iterates over the closed ring's edges.
    pub fn edges(&self) -> impl Iterator<Item = (&Point3<f64>, &Point3<f64>)> {
        let n = self.vertices.len();
        (0..n).map(move |i| (&self.vertices[i], &self.vertices[(i + 1) % n]))
    }

    /// Returns true if the point's projection onto the polygon's plane falls
    /// within the ring (even-odd rule).
    pub fn contains_projected(&self, point: &Point3<f64>) -> bool {
        let Some(frame) = &self.frame else {
            return false;
        };
        let ring: Vec<Point2<f64>> = self.vertices.iter().map(|v| frame.to_2d(v)).collect();
        point_in_ring(&frame.to_2d(point), &ring)
    }

    /// Shortest distance from a point to the polygon's surface.
    pub fn distance_to(&self, point: &Point3<f64>) -> f64 {
        if let Some(frame) = &self.frame {
            if self.contains_projected(point) {
                return frame.height(point).abs();
            }
        }
        self.edges()
            .map(|(a, b)| distance_to_segment(point, a, b))
            .fold(f64::INFINITY, f64::min)
    }

    /// Triangulates the ring in the given frame, returning vertex index
    /// triples.
    pub fn triangulate_in(&self, frame: &Projection2D) -> Result<Vec<[usize; 3]>> {
        if self.vertices.len() < 3 {
            return Ok(Vec::new());
        }
        let flat: Vec<f64> = self
            .vertices
            .iter()
            .flat_map(|v| {
                let p = frame.to_2d(v);
                [p.x, p.y]
            })
            .collect();
        let indices = earcutr::earcut(&flat, &[], 2)
            .map_err(|e| ClipError::Triangulation(format!("{e:?}")))?;
        Ok(indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect())
    }
}

/// Distance from `p` to the segment `a`-`b`.
pub fn distance_to_segment(p: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 <= f64::EPSILON {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

fn point_in_ring(p: &Point2<f64>, ring: &[Point2<f64>]) -> bool {
    let n = ring.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (&ring[i], &ring[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}
