//! Cut edges and the capping of holes left by a zone.

use nalgebra::Point3;
use tracing::warn;

use crate::plane::ClippingPlane;
use crate::polygon::Polygon;
use crate::scene::Projection2D;
use crate::triangle::{ClippingTriangle, TriangleFlags};

/// A segment created where a zone face cut a triangle.
///
/// `next` and `prev` link edges that share endpoints so the cut outline can
/// be walked as rings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClippingEdge {
    pub p1: Point3<f64>,
    pub p2: Point3<f64>,
    pub next: Option<usize>,
    pub prev: Option<usize>,
    added: bool,
}

impl ClippingEdge {
    pub fn new(p1: Point3<f64>, p2: Point3<f64>) -> Self {
        Self {
            p1,
            p2,
            next: None,
            prev: None,
            added: false,
        }
    }
}

#[inline]
fn same_point(a: &Point3<f64>, b: &Point3<f64>, epsilon: f64) -> bool {
    (a - b).norm() < epsilon
}

/// Links edges whose endpoints coincide within `epsilon`.
///
/// Edges may arrive in either orientation; a tail meeting a tail links the
/// two edges `next` to `next`.
pub fn connect_edges(edges: &mut [ClippingEdge], epsilon: f64) {
    let n = edges.len();
    for i in 0..n {
        if edges[i].next.is_some() && edges[i].prev.is_some() {
            continue;
        }
        for j in 0..n {
            if i == j {
                continue;
            }
            let (ei, ej) = (edges[i], edges[j]);
            if same_point(&ei.p2, &ej.p1, epsilon) {
                edges[i].next = Some(j);
                edges[j].prev = Some(i);
            } else if same_point(&ei.p2, &ej.p2, epsilon) {
                edges[i].next = Some(j);
                edges[j].next = Some(i);
            } else if same_point(&ei.p1, &ej.p1, epsilon) {
                edges[i].prev = Some(j);
                edges[j].prev = Some(i);
            } else if same_point(&ei.p1, &ej.p2, epsilon) {
                edges[i].prev = Some(j);
                edges[j].next = Some(i);
            }
            if edges[i].next.is_some() && edges[i].prev.is_some() {
                break;
            }
        }
    }
}

/// Walks linked edges into closed rings.
///
/// Every edge is visited once. Chains that do not return to their start are
/// dropped. Each returned ring repeats its first point at the end.
pub fn collect_rings(edges: &mut [ClippingEdge], epsilon: f64) -> Vec<Vec<Point3<f64>>> {
    let mut rings = Vec::new();
    let mut start = 0;

    while start < edges.len() {
        if edges[start].added {
            start += 1;
            continue;
        }

        let mut ring: Vec<Point3<f64>> = Vec::new();
        let mut current = Some(start);
        while let Some(k) = current {
            let edge = &mut edges[k];
            if edge.added {
                break;
            }
            edge.added = true;
            match ring.last() {
                None => {
                    ring.push(edge.p1);
                    ring.push(edge.p2);
                    current = edge.next;
                }
                Some(back) if same_point(back, &edge.p1, epsilon) => {
                    ring.push(edge.p2);
                    current = edge.next;
                }
                Some(_) => {
                    ring.push(edge.p1);
                    current = edge.prev;
                }
            }
        }

        if let (Some(front), Some(back)) = (ring.first(), ring.last()) {
            if ring.len() > 3 && same_point(front, back, epsilon) {
                rings.push(ring);
            }
        }
    }

    rings
}

impl ClippingPlane {
    /// Caps the holes this plane cut into the surface.
    ///
    /// The cut edges are stitched into rings and each ring is triangulated in
    /// the plane. Cap triangles have no parent face and are flagged
    /// [`TriangleFlags::PLANAR_BELOW`].
    pub fn patch_holes(&self, edges: &mut [ClippingEdge], triangles: &mut Vec<ClippingTriangle>) {
        if edges.is_empty() {
            return;
        }
        connect_edges(edges, self.epsilon());
        for ring in collect_rings(edges, self.epsilon()) {
            self.retriangulate(&ring, triangles);
        }
    }

    fn retriangulate(&self, ring: &[Point3<f64>], triangles: &mut Vec<ClippingTriangle>) {
        let Some((_, open)) = ring.split_last() else {
            return;
        };
        let outline = Polygon::new(open.to_vec());
        let frame = Projection2D::new(self.vertex(), self.normal());
        let indices = match outline.triangulate_in(&frame) {
            Ok(indices) => indices,
            Err(err) => {
                warn!(points = open.len(), %err, "failed to cap hole");
                return;
            }
        };
        for [a, b, c] in indices {
            let mut cap = ClippingTriangle::new(open[a], open[c], open[b], None);
            cap.flags = TriangleFlags::PLANAR_BELOW;
            triangles.push(cap);
        }
    }
}
