//! Spatial partition of a scene's own faces.

use nalgebra::Point3;

use super::Face;
use crate::bounds::BoundingBox;

/// Maximum depth of a face partition.
pub const FACE_BSP_MAX_DEPTH: usize = 6;

/// Nodes holding more faces than this are split further.
pub const FACE_BSP_LEAF_FACES: usize = 4;

/// A node of a [`FaceBsp`]. Faces that straddle the split value stay here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceBspNode {
    pub face_indices: Vec<usize>,
    pub children: Option<[usize; 2]>,
    /// 0 for X, 1 for Y.
    pub axis: usize,
    pub split: f64,
}

/// A 2D partition of face indices, alternating between X and Y.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceBsp {
    nodes: Vec<FaceBspNode>,
}

impl FaceBsp {
    /// Partitions every face of `faces`.
    pub fn build(faces: &[Face]) -> Self {
        let mut bsp = Self {
            nodes: vec![FaceBspNode {
                face_indices: (0..faces.len()).collect(),
                ..FaceBspNode::default()
            }],
        };
        if !faces.is_empty() {
            bsp.sort(0, faces, 0, 0);
        }
        bsp
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<usize> {
        (!self.nodes.is_empty()).then_some(0)
    }

    pub fn node(&self, id: usize) -> Option<&FaceBspNode> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Node ids in depth-first order: a node, then its first subtree, then
    /// its second.
    pub fn depth_first(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<usize> = self.root().into_iter().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some([first, second]) = self.nodes[id].children {
                stack.push(second);
                stack.push(first);
            }
        }
        order
    }

    /// Planar bounds of a node's faces. The Z range is left at zero.
    pub fn bounds(&self, id: usize, faces: &[Face]) -> BoundingBox {
        let Some(node) = self.nodes.get(id) else {
            return BoundingBox::empty();
        };
        let mut bb = BoundingBox::from_points(
            node.face_indices
                .iter()
                .filter_map(|&i| faces.get(i))
                .flat_map(|f| f.verts.iter()),
        );
        if !bb.is_empty() {
            bb.min.z = 0.0;
            bb.max.z = 0.0;
        }
        bb
    }

    fn sort(&mut self, id: usize, faces: &[Face], depth: usize, axis: usize) {
        let coord = |p: &Point3<f64>| if axis == 0 { p.x } else { p.y };
        let extents: Vec<(usize, f64, f64)> = self.nodes[id]
            .face_indices
            .iter()
            .filter_map(|&i| faces.get(i).map(|f| (i, f)))
            .map(|(i, f)| {
                let (lo, hi) = f.verts.iter().map(coord).fold(
                    (f64::INFINITY, f64::NEG_INFINITY),
                    |(lo, hi), v| (lo.min(v), hi.max(v)),
                );
                (i, lo, hi)
            })
            .collect();

        let lo = extents.iter().map(|e| e.1).fold(f64::INFINITY, f64::min);
        let hi = extents.iter().map(|e| e.2).fold(f64::NEG_INFINITY, f64::max);
        let split = (lo + hi) * 0.5;

        let (mut first, mut second, mut stay) = (Vec::new(), Vec::new(), Vec::new());
        for (i, lo, hi) in extents {
            let below = lo <= split;
            let above = hi >= split;
            match (below, above) {
                (true, false) => first.push(i),
                (false, true) => second.push(i),
                _ => stay.push(i),
            }
        }

        let base = self.nodes.len();
        self.nodes.push(FaceBspNode {
            face_indices: first,
            ..FaceBspNode::default()
        });
        self.nodes.push(FaceBspNode {
            face_indices: second,
            ..FaceBspNode::default()
        });
        let node = &mut self.nodes[id];
        node.face_indices = stay;
        node.children = Some([base, base + 1]);
        node.axis = axis;
        node.split = split;

        if depth + 1 < FACE_BSP_MAX_DEPTH {
            for child in [base, base + 1] {
                if self.nodes[child].face_indices.len() > FACE_BSP_LEAF_FACES {
                    self.sort(child, faces, depth + 1, (axis + 1) % 2);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_strip(n: usize) -> Vec<Face> {
        (0..n)
            .map(|i| {
                let x = i as f64 * 2.0;
                Face::triangle(
                    Point3::new(x, 0.0, 0.0),
                    Point3::new(x + 1.0, 0.0, 0.0),
                    Point3::new(x, 1.0, 0.0),
                )
            })
            .collect()
    }

    fn all_indices(bsp: &FaceBsp) -> Vec<usize> {
        let mut all: Vec<usize> = bsp
            .depth_first()
            .into_iter()
            .flat_map(|id| bsp.node(id).map(|n| n.face_indices.clone()).unwrap_or_default())
            .collect();
        all.sort_unstable();
        all
    }

    #[test]
    fn every_face_lands_in_exactly_one_node() {
        let faces = make_strip(20);
        let bsp = FaceBsp::build(&faces);
        assert_eq!(all_indices(&bsp), (0..20).collect::<Vec<_>>());
        assert!(bsp.len() > 3);
    }

    #[test]
    fn root_split_separates_halves() {
        let faces = make_strip(4);
        let bsp = FaceBsp::build(&faces);
        let root = bsp.node(0).unwrap();
        let [left, right] = root.children.unwrap();
        assert_eq!(bsp.node(left).unwrap().face_indices, vec![0, 1]);
        assert_eq!(bsp.node(right).unwrap().face_indices, vec![2, 3]);
        assert!(root.face_indices.is_empty());
    }

    #[test]
    fn bounds_are_planar() {
        let mut faces = make_strip(2);
        faces[1].verts[2].z = 9.0;
        let bsp = FaceBsp::build(&faces);
        let bb = bsp.bounds(0, &faces);
        assert!(bb.is_empty());
        let [left, right] = bsp.node(0).unwrap().children.unwrap();
        let bb = bsp.bounds(left, &faces);
        assert_eq!(bb.max, Point3::new(1.0, 1.0, 0.0));
        assert_eq!(bsp.bounds(right, &faces).max.z, 0.0);
    }

    #[test]
    fn empty_scene_keeps_a_bare_root() {
        let bsp = FaceBsp::build(&[]);
        assert_eq!(bsp.depth_first(), vec![0]);
        assert!(bsp.node(0).unwrap().face_indices.is_empty());
        assert!(bsp.node(0).unwrap().children.is_none());
    }
}
