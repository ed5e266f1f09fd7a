//! Splitting triangles by a single zone face.

use nalgebra::Point3;

use crate::edge::ClippingEdge;
use crate::plane::{ClippingPlane, Location};
use crate::triangle::{ClippingTriangle, TriangleFlags};

impl ClippingPlane {
    /// Partitions a triangle by this plane.
    ///
    /// Pieces behind the plane go to `inside` and keep the triangle's zone
    /// flags. Pieces in front go to `outside` with no zone flags. Each proper
    /// cut records the new edge in `edges` so the hole can be capped later.
    ///
    /// `relative_priority` is the triangle's priority minus the zone's and
    /// decides what a coplanar triangle is tagged with. `disjoint_policy`
    /// chooses the side for a triangle whose cut falls off the face polygon
    /// when the boundary check is enabled.
    pub fn split(
        &self,
        triangle: &ClippingTriangle,
        inside: &mut Vec<ClippingTriangle>,
        outside: &mut Vec<ClippingTriangle>,
        edges: &mut Vec<ClippingEdge>,
        relative_priority: i32,
        disjoint_policy: bool,
    ) {
        let locations = triangle.points().map(|p| self.location(&p));
        let sum: i32 = locations.iter().map(|l| l.sign()).sum();
        let has_on = locations.contains(&Location::On);

        match sum {
            s if s <= -2 => inside.push(*triangle),
            s if s >= 2 => outside.push(leave(triangle)),
            -1 if has_on => inside.push(*triangle),
            1 if has_on => outside.push(leave(triangle)),
            -1 => {
                let k = position(&locations, Location::Outside);
                self.cut_one_outside(triangle, k, inside, outside, edges, disjoint_policy);
            }
            1 => {
                let k = position(&locations, Location::Inside);
                self.cut_one_inside(triangle, k, inside, outside, edges, disjoint_policy);
            }
            _ if locations.iter().all(|l| *l == Location::On) => {
                let mut t = *triangle;
                t.zone_flags = self.coplanar_flags(triangle, relative_priority);
                inside.push(t);
            }
            _ => {
                let k = position(&locations, Location::On);
                self.cut_through_vertex(triangle, k, &locations, inside, outside, edges, disjoint_policy);
            }
        }
    }

    /// Tags a triangle lying on this plane with the side it faces.
    fn coplanar_flags(&self, triangle: &ClippingTriangle, relative_priority: i32) -> TriangleFlags {
        if relative_priority < 0 {
            return TriangleFlags::empty();
        }
        let mut flags = triangle.zone_flags;
        if triangle.normal().dot(&self.normal()) > 0.0 {
            flags |= TriangleFlags::PLANAR_BELOW;
        } else {
            flags |= TriangleFlags::PLANAR_ABOVE;
        }
        if relative_priority > 0 {
            flags |= TriangleFlags::HIGH_PRIORITY;
        }
        flags
    }

    /// One corner outside, the other two strictly inside.
    fn cut_one_outside(
        &self,
        t: &ClippingTriangle,
        a: usize,
        inside: &mut Vec<ClippingTriangle>,
        outside: &mut Vec<ClippingTriangle>,
        edges: &mut Vec<ClippingEdge>,
        disjoint_policy: bool,
    ) {
        let (b, c) = ((a + 1) % 3, (a + 2) % 3);
        let pb = self.crossing(&t[b], &t[a]);
        let pc = self.crossing(&t[c], &t[a]);
        if self.ambiguous(&pb, &pc) {
            self.push_whole(t, inside, outside, disjoint_policy);
            return;
        }
        outside.push(ClippingTriangle::fragment(t, pb, pc, t[a]));
        inside.push(kept(t, t[b], pc, pb));
        inside.push(kept(t, t[c], pc, t[b]));
        edges.push(ClippingEdge::new(pc, pb));
    }

    /// One corner inside, the other two strictly outside.
    fn cut_one_inside(
        &self,
        t: &ClippingTriangle,
        a: usize,
        inside: &mut Vec<ClippingTriangle>,
        outside: &mut Vec<ClippingTriangle>,
        edges: &mut Vec<ClippingEdge>,
        disjoint_policy: bool,
    ) {
        let (b, c) = ((a + 1) % 3, (a + 2) % 3);
        let pb = self.crossing(&t[a], &t[b]);
        let pc = self.crossing(&t[a], &t[c]);
        if self.ambiguous(&pb, &pc) {
            self.push_whole(t, inside, outside, disjoint_policy);
            return;
        }
        inside.push(kept(t, t[a], pb, pc));
        outside.push(ClippingTriangle::fragment(t, t[c], pc, pb));
        outside.push(ClippingTriangle::fragment(t, t[b], t[c], pb));
        edges.push(ClippingEdge::new(pb, pc));
    }

    /// One corner on the plane, the opposite edge crossing it.
    #[allow(clippy::too_many_arguments)]
    fn cut_through_vertex(
        &self,
        t: &ClippingTriangle,
        a: usize,
        locations: &[Location; 3],
        inside: &mut Vec<ClippingTriangle>,
        outside: &mut Vec<ClippingTriangle>,
        edges: &mut Vec<ClippingEdge>,
        disjoint_policy: bool,
    ) {
        let (b, c) = ((a + 1) % 3, (a + 2) % 3);
        let p = self.crossing(&t[b], &t[c]);
        if self.ambiguous(&t[a], &p) {
            self.push_whole(t, inside, outside, disjoint_policy);
            return;
        }
        let near_b = (t[a], t[b], p);
        let near_c = (t[a], p, t[c]);
        let (keep, drop) = if locations[b] == Location::Inside {
            (near_b, near_c)
        } else {
            (near_c, near_b)
        };
        inside.push(kept(t, keep.0, keep.1, keep.2));
        outside.push(ClippingTriangle::fragment(t, drop.0, drop.1, drop.2));
        if locations[b] == Location::Outside {
            edges.push(ClippingEdge::new(t[a], p));
        } else {
            edges.push(ClippingEdge::new(p, t[a]));
        }
    }

    /// Intersects an edge with the plane, ordering the endpoints so both
    /// triangles sharing the edge compute the identical point.
    fn crossing(&self, p0: &Point3<f64>, p1: &Point3<f64>) -> Point3<f64> {
        let ordered = (p0.x, p0.y, p0.z) <= (p1.x, p1.y, p1.z);
        if ordered {
            self.interpolate(p0, p1)
        } else {
            self.interpolate(p1, p0)
        }
    }

    /// True when neither cut point lies on the face polygon.
    #[inline]
    fn ambiguous(&self, p0: &Point3<f64>, p1: &Point3<f64>) -> bool {
        !self.intersects(p0) && !self.intersects(p1)
    }

    fn push_whole(
        &self,
        t: &ClippingTriangle,
        inside: &mut Vec<ClippingTriangle>,
        outside: &mut Vec<ClippingTriangle>,
        disjoint_policy: bool,
    ) {
        if disjoint_policy {
            inside.push(*t);
        } else {
            outside.push(leave(t));
        }
    }
}

/// An inside fragment keeps the zone flags gathered so far.
fn kept(t: &ClippingTriangle, p0: Point3<f64>, p1: Point3<f64>, p2: Point3<f64>) -> ClippingTriangle {
    let mut piece = ClippingTriangle::fragment(t, p0, p1, p2);
    piece.zone_flags = t.zone_flags;
    piece
}

fn leave(t: &ClippingTriangle) -> ClippingTriangle {
    let mut t = *t;
    t.zone_flags = TriangleFlags::empty();
    t
}

fn position(locations: &[Location; 3], wanted: Location) -> usize {
    locations.iter().position(|l| *l == wanted).unwrap_or(0)
}
