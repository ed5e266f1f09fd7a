//! Renderable faces and their surface attributes.

use nalgebra::{Point2, Point3, Vector3};

use crate::bounds::BoundingBox;

/// Texture coordinates of one texture layer, one UV per face vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappedTexture {
    pub name: String,
    pub uvs: Vec<Point2<f64>>,
}

impl MappedTexture {
    pub fn new(name: impl Into<String>, uvs: Vec<Point2<f64>>) -> Self {
        Self { name: name.into(), uvs }
    }
}

/// A named surface material.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    pub name: String,
    pub diffuse: [f32; 4],
}

/// A polygonal face of a scene.
///
/// Clipping only consumes the first three vertices. A face with `clipped`
/// set is an empty slot that may be overwritten by clipping results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Face {
    pub verts: Vec<Point3<f64>>,
    pub vertex_normals: Vec<Vector3<f64>>,
    pub textures: Vec<MappedTexture>,
    pub materials: Vec<Material>,
    pub group_id: i32,
    pub group_name: String,
    pub face_normal: Option<Vector3<f64>>,
    pub clipped: bool,
}

impl Face {
    /// Creates an untextured triangle.
    pub fn triangle(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self {
            verts: vec![a, b, c],
            ..Self::default()
        }
    }

    #[inline]
    pub fn vert(&self, n: usize) -> Option<&Point3<f64>> {
        self.verts.get(n)
    }

    /// Unit normal of the first three vertices, or zero for fewer.
    pub fn compute_normal(&self) -> Vector3<f64> {
        match self.verts.as_slice() {
            [a, b, c, ..] => (b - a)
                .cross(&(c - a))
                .try_normalize(f64::MIN_POSITIVE)
                .unwrap_or_else(Vector3::zeros),
            _ => Vector3::zeros(),
        }
    }

    /// Area of the triangle formed by the first three vertices.
    pub fn triangle_area(&self) -> f64 {
        match self.verts.as_slice() {
            [a, b, c, ..] => (b - a).cross(&(c - a)).norm() * 0.5,
            _ => 0.0,
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.verts)
    }

    /// Interpolates the UV of texture layer `layer` at `point` using the
    /// barycentric coordinates of the face's first triangle.
    ///
    /// Returns the origin when the face or layer lacks three UVs.
    pub fn uv_for_vertex(&self, point: &Point3<f64>, layer: usize) -> Point2<f64> {
        let ([p1, p2, p3, ..], Some(texture)) = (self.verts.as_slice(), self.textures.get(layer))
        else {
            return Point2::origin();
        };
        let [uv_a, uv_b, uv_c, ..] = texture.uvs.as_slice() else {
            return Point2::origin();
        };

        if point == p1 {
            return *uv_a;
        } else if point == p2 {
            return *uv_b;
        } else if point == p3 {
            return *uv_c;
        }

        let v0 = p3 - p1;
        let v1 = p2 - p1;
        let v2 = point - p1;
        let dot00 = v0.dot(&v0);
        let dot01 = v0.dot(&v1);
        let dot02 = v0.dot(&v2);
        let dot11 = v1.dot(&v1);
        let dot12 = v1.dot(&v2);

        let denom = dot00 * dot11 - dot01 * dot01;
        if denom.abs() < f64::MIN_POSITIVE {
            return *uv_a;
        }
        let inv = 1.0 / denom;
        let u = (dot11 * dot02 - dot01 * dot12) * inv;
        let v = (dot00 * dot12 - dot01 * dot02) * inv;

        uv_a + (uv_c - uv_a) * u + (uv_b - uv_a) * v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_textured() -> Face {
        let mut face = Face::triangle(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        );
        face.textures.push(MappedTexture::new(
            "asphalt",
            vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)],
        ));
        face
    }

    #[test]
    fn normal_and_area() {
        let face = make_textured();
        assert_relative_eq!(face.compute_normal(), Vector3::z());
        assert_relative_eq!(face.triangle_area(), 2.0);
        assert_eq!(Face::default().compute_normal(), Vector3::zeros());
    }

    #[test]
    fn uv_at_corner_is_exact() {
        let face = make_textured();
        assert_eq!(face.uv_for_vertex(&Point3::new(2.0, 0.0, 0.0), 0), Point2::new(1.0, 0.0));
    }

    #[test]
    fn uv_interpolates_inside() {
        let face = make_textured();
        let uv = face.uv_for_vertex(&Point3::new(1.0, 0.5, 0.0), 0);
        assert_relative_eq!(uv, Point2::new(0.5, 0.25), epsilon = 1e-12);
    }

    #[test]
    fn missing_layer_yields_origin() {
        let face = make_textured();
        assert_eq!(face.uv_for_vertex(&Point3::new(1.0, 0.5, 0.0), 3), Point2::origin());
    }
}
