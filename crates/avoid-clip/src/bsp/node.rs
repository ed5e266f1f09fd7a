//! Arena nodes of the zone BSP.

use nalgebra::Point3;

/// Index of a node in a [`BspTree`](super::BspTree) arena.
pub type NodeId = usize;

/// Index of a segment in a [`BspTree`](super::BspTree) arena.
pub type SegmentId = usize;

/// A coordinate axis used as a split direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// The axis a child of a node split on `self` splits on.
    #[inline]
    pub fn next(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::Z,
            Axis::Z => Axis::X,
        }
    }

    #[inline]
    pub fn coord(self, p: &Point3<f64>) -> f64 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
            Axis::Z => p.z,
        }
    }
}

/// A node of the zone BSP.
///
/// A leaf has no split axis and no children. A branch sends segments that lie
/// wholly below `value` along its axis to the first child, wholly above to the
/// second, and keeps straddling segments itself.
#[derive(Debug, Clone, PartialEq)]
pub struct BspNode {
    pub(crate) parent: Option<NodeId>,
    pub(crate) depth: usize,
    pub(crate) axis: Option<Axis>,
    pub(crate) value: f64,
    pub(crate) children: Option<[NodeId; 2]>,
    pub(crate) data: Vec<SegmentId>,
}

impl BspNode {
    pub(crate) fn new(parent: Option<NodeId>, depth: usize) -> Self {
        Self {
            parent,
            depth,
            axis: None,
            value: 0.0,
            children: None,
            data: Vec::new(),
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Distance from the root, which is at depth zero.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn axis(&self) -> Option<Axis> {
        self.axis
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[inline]
    pub fn children(&self) -> Option<[NodeId; 2]> {
        self.children
    }

    /// Segments stored directly at this node.
    #[inline]
    pub fn data(&self) -> &[SegmentId] {
        &self.data
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_cycles_through_all_three() {
        assert_eq!(Axis::X.next(), Axis::Y);
        assert_eq!(Axis::Y.next(), Axis::Z);
        assert_eq!(Axis::Z.next(), Axis::X);
    }

    #[test]
    fn new_node_is_empty_leaf() {
        let node = BspNode::new(Some(3), 2);
        assert!(node.is_leaf());
        assert_eq!(node.parent(), Some(3));
        assert_eq!(node.depth(), 2);
        assert!(node.axis().is_none());
        assert!(node.data().is_empty());
    }

    #[test]
    fn coord_picks_component() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(Axis::X.coord(&p), 1.0);
        assert_eq!(Axis::Y.coord(&p), 2.0);
        assert_eq!(Axis::Z.coord(&p), 3.0);
    }
}
