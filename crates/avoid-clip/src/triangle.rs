//! Triangles flowing through the clipping pipeline.

use std::ops::Index;

use bitflags::bitflags;
use nalgebra::{Point2, Point3, Vector3};

use crate::bounds::BoundingBox;
use crate::scene::Face;

/// Default squared-magnitude threshold below which a triangle's cross product
/// marks it as collapsed.
pub const COLLAPSED_AREA: f64 = 1e-4;

bitflags! {
    /// Coplanar bookkeeping attached to a triangle.
    ///
    /// A triangle lying on a zone face records which way it faces relative to
    /// that face. Lying on both an upward and a downward face means the
    /// triangle is sandwiched inside the zone.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TriangleFlags: u8 {
        const PLANAR_ABOVE = 0x01;
        const PLANAR_BELOW = 0x02;
        const PLANAR_BOTH = Self::PLANAR_ABOVE.bits() | Self::PLANAR_BELOW.bits();
        const HIGH_PRIORITY = 0x04;
    }
}

/// A triangle being clipped, with a link back to the face it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClippingTriangle {
    points: [Point3<f64>; 3],
    /// Index of the source face. Hole caps have none.
    pub parent: Option<usize>,
    /// Flags that survive the current zone.
    pub flags: TriangleFlags,
    /// Flags gathered while passing the current zone's planes.
    pub zone_flags: TriangleFlags,
    bounds: BoundingBox,
}

impl ClippingTriangle {
    pub fn new(p0: Point3<f64>, p1: Point3<f64>, p2: Point3<f64>, parent: Option<usize>) -> Self {
        let points = [p0, p1, p2];
        Self {
            points,
            parent,
            flags: TriangleFlags::empty(),
            zone_flags: TriangleFlags::empty(),
            bounds: BoundingBox::from_points(&points),
        }
    }

    /// Creates a fragment of `source`, inheriting its parent and flags.
    ///
    /// The fragment starts with no zone flags.
    pub fn fragment(source: &ClippingTriangle, p0: Point3<f64>, p1: Point3<f64>, p2: Point3<f64>) -> Self {
        let mut t = Self::new(p0, p1, p2, source.parent);
        t.flags = source.flags;
        t
    }

    /// Builds a triangle from the first three vertices of a face, shifted by
    /// `offset` into the clipper's frame. Returns `None` for faces with fewer
    /// than three vertices.
    pub fn from_face(face: &Face, index: usize, offset: &Vector3<f64>) -> Option<Self> {
        match face.verts.as_slice() {
            [a, b, c, ..] => Some(Self::new(a + offset, b + offset, c + offset, Some(index))),
            _ => None,
        }
    }

    #[inline]
    pub fn points(&self) -> &[Point3<f64>; 3] {
        &self.points
    }

    #[inline]
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Unnormalized normal following the winding.
    pub fn normal(&self) -> Vector3<f64> {
        let [a, b, c] = &self.points;
        (b - a).cross(&(c - a))
    }

    pub fn area(&self) -> f64 {
        self.normal().norm() * 0.5
    }

    /// Returns true if the squared magnitude of the cross product is below
    /// `threshold`.
    #[inline]
    pub fn collapsed(&self, threshold: f64) -> bool {
        self.normal().norm_squared() < threshold
    }

    /// Folds the zone flags into the persistent flags and clears them.
    pub fn reset_flags(&mut self) {
        self.flags |= self.zone_flags;
        self.zone_flags = TriangleFlags::empty();
    }

    /// Converts back to a face in scene coordinates.
    ///
    /// Surface attributes come from the parent face in `faces`. Texture
    /// coordinates of vertices created by clipping are interpolated from the
    /// parent.
    pub fn to_face(&self, offset: &Vector3<f64>, faces: &[Face]) -> Face {
        let verts: Vec<Point3<f64>> = self.points.iter().map(|p| p - offset).collect();
        let Some(parent) = self.parent.and_then(|i| faces.get(i)) else {
            return Face {
                verts,
                ..Face::default()
            };
        };

        let mut textures = parent.textures.clone();
        for (layer, texture) in textures.iter_mut().enumerate() {
            texture.uvs.resize(3, Point2::origin());
            for (k, vert) in verts.iter().enumerate() {
                if parent.vert(k) != Some(vert) {
                    texture.uvs[k] = parent.uv_for_vertex(vert, layer);
                }
            }
        }

        Face {
            verts,
            vertex_normals: Vec::new(),
            textures,
            materials: parent.materials.clone(),
            group_id: parent.group_id,
            group_name: parent.group_name.clone(),
            face_normal: Some(parent.compute_normal()),
            clipped: false,
        }
    }
}

impl Index<usize> for ClippingTriangle {
    type Output = Point3<f64>;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::MappedTexture;
    use approx::assert_relative_eq;

    fn make_triangle() -> ClippingTriangle {
        ClippingTriangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Some(0),
        )
    }

    #[test]
    fn plane_both_is_union() {
        assert_eq!(
            TriangleFlags::PLANAR_ABOVE | TriangleFlags::PLANAR_BELOW,
            TriangleFlags::PLANAR_BOTH
        );
    }

    #[test]
    fn reset_folds_zone_flags() {
        let mut t = make_triangle();
        t.flags = TriangleFlags::HIGH_PRIORITY;
        t.zone_flags = TriangleFlags::PLANAR_BELOW;
        t.reset_flags();
        assert_eq!(t.flags, TriangleFlags::HIGH_PRIORITY | TriangleFlags::PLANAR_BELOW);
        assert!(t.zone_flags.is_empty());
    }

    #[test]
    fn collapse_threshold() {
        let t = make_triangle();
        assert_relative_eq!(t.area(), 0.5);
        assert!(!t.collapsed(COLLAPSED_AREA));
        let sliver = ClippingTriangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1e-6, 0.0),
            None,
        );
        assert!(sliver.collapsed(COLLAPSED_AREA));
    }

    #[test]
    fn fragment_inherits_parent_and_flags() {
        let mut t = make_triangle();
        t.flags = TriangleFlags::PLANAR_ABOVE;
        t.zone_flags = TriangleFlags::PLANAR_BELOW;
        let f = ClippingTriangle::fragment(&t, t[0], t[1], Point3::new(0.5, 0.5, 0.0));
        assert_eq!(f.parent, Some(0));
        assert_eq!(f.flags, TriangleFlags::PLANAR_ABOVE);
        assert!(f.zone_flags.is_empty());
    }

    #[test]
    fn to_face_restores_scene_coordinates_and_uvs() {
        let mut parent = Face::triangle(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        );
        parent.group_name = "road".into();
        parent.textures.push(MappedTexture::new(
            "asphalt",
            vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)],
        ));

        let offset = Vector3::new(10.0, 0.0, 0.0);
        let t = ClippingTriangle::new(
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(11.0, 0.0, 0.0),
            Point3::new(10.0, 2.0, 0.0),
            Some(0),
        );
        let face = t.to_face(&offset, std::slice::from_ref(&parent));

        assert_eq!(face.verts[1], Point3::new(1.0, 0.0, 0.0));
        assert_eq!(face.group_name, "road");
        assert_eq!(face.face_normal, Some(Vector3::z()));
        let uvs = &face.textures[0].uvs;
        assert_eq!(uvs[0], Point2::new(0.0, 0.0));
        assert_relative_eq!(uvs[1], Point2::new(0.5, 0.0));
        assert_eq!(uvs[2], Point2::new(0.0, 1.0));
    }

    #[test]
    fn cap_triangle_has_bare_face() {
        let t = ClippingTriangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            None,
        );
        let face = t.to_face(&Vector3::zeros(), &[]);
        assert!(face.textures.is_empty());
        assert_eq!(face.face_normal, None);
        assert!(!face.clipped);
    }
}
