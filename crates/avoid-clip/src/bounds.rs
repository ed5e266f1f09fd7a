//! Axis-aligned bounding boxes for coarse overlap rejection.

use nalgebra::Point3;

/// An axis-aligned box in 3D space.
///
/// A box built from no points is inverted (`min = +MAX`, `max = -MAX`) and
/// intersects nothing. [`BoundingBox::unbounded`] is the opposite sentinel
/// and intersects everything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    /// Creates a box from explicit corners.
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// A box covering all of space.
    pub fn unbounded() -> Self {
        Self {
            min: Point3::new(f64::MIN, f64::MIN, f64::MIN),
            max: Point3::new(f64::MAX, f64::MAX, f64::MAX),
        }
    }

    /// An inverted box containing nothing.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::MAX, f64::MAX, f64::MAX),
            max: Point3::new(f64::MIN, f64::MIN, f64::MIN),
        }
    }

    /// Builds the smallest box containing every point.
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Point3<f64>>,
    {
        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);
        for p in points {
            min = min.inf(p);
            max = max.sup(p);
        }
        Self { min, max }
    }

    /// Returns true if the box contains no points.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Returns true if the boxes overlap. Touching faces count as overlap.
    #[inline]
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        !(self.min.x > other.max.x
            || self.max.x < other.min.x
            || self.min.y > other.max.y
            || self.max.y < other.min.y
            || self.min.z > other.max.z
            || self.max.z < other.min.z)
    }

    /// Returns true if the point lies within the box, boundary inclusive.
    #[inline]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> BoundingBox {
        BoundingBox::from_points(&[Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)])
    }

    #[test]
    fn from_points_expands_over_all_points() {
        let points = [
            Point3::new(1.0, -2.0, 3.0),
            Point3::new(-1.0, 4.0, 0.0),
            Point3::new(0.5, 0.0, 7.0),
        ];
        let bb = BoundingBox::from_points(&points);
        assert_eq!(bb.min, Point3::new(-1.0, -2.0, 0.0));
        assert_eq!(bb.max, Point3::new(1.0, 4.0, 7.0));
    }

    #[test]
    fn touching_boxes_intersect() {
        let a = unit_box();
        let b = BoundingBox::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn separated_boxes_do_not_intersect() {
        let a = unit_box();
        let b = BoundingBox::new(Point3::new(0.0, 0.0, 1.5), Point3::new(1.0, 1.0, 2.0));
        assert!(!a.intersects(&b));
    }

    #[test]
    fn contains_is_inclusive() {
        let bb = unit_box();
        assert!(bb.contains(&Point3::new(1.0, 0.0, 0.5)));
        assert!(!bb.contains(&Point3::new(1.0 + 1e-9, 0.0, 0.5)));
    }

    #[test]
    fn empty_box_intersects_nothing() {
        let empty = BoundingBox::from_points(std::iter::empty());
        assert!(empty.is_empty());
        assert!(!empty.intersects(&unit_box()));
        assert!(BoundingBox::unbounded().intersects(&unit_box()));
    }
}
