//! Zone BSP container, construction and queries.

use nalgebra::Point3;

use crate::bounds::BoundingBox;
use crate::config::BspConfig;

use super::node::{Axis, BspNode, NodeId, SegmentId};
use super::segment::BspSegment;
use super::selector::{ExtentMidpoint, SplitSelector};
use super::visitor::{CollectingVisitor, SegmentVisitor};

/// An axis-aligned binary partition over capsule segments.
///
/// Segments are first added to the root without partitioning, then
/// [`BspTree::sort`] splits the tree. Queries return every stored segment
/// that may overlap the query shape; segment queries are exact.
///
/// Nodes and segments live in arenas and refer to each other by index.
#[derive(Debug, Clone)]
pub struct BspTree {
    nodes: Vec<BspNode>,
    segments: Vec<BspSegment>,
    config: BspConfig,
}

impl Default for BspTree {
    fn default() -> Self {
        Self::new(BspConfig::default())
    }
}

impl BspTree {
    /// Creates a tree holding a single empty root.
    pub fn new(config: BspConfig) -> Self {
        Self {
            nodes: vec![BspNode::new(None, 0)],
            segments: Vec::new(),
            config,
        }
    }

    /// Drops every node and segment, leaving an empty root.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(BspNode::new(None, 0));
        self.segments.clear();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        0
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&BspNode> {
        self.nodes.get(id)
    }

    #[inline]
    pub fn segment(&self, id: SegmentId) -> Option<&BspSegment> {
        self.segments.get(id)
    }

    #[inline]
    pub fn segments(&self) -> &[BspSegment] {
        &self.segments
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the deepest node depth plus one.
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth + 1).max().unwrap_or(0)
    }

    /// Adds a segment without partitioning.
    ///
    /// Branches created by an earlier sort still route the segment, but no
    /// leaf is split until the next [`BspTree::sort`].
    pub fn add_segment(&mut self, segment: BspSegment) -> SegmentId {
        let id = self.segments.len();
        self.segments.push(segment);
        self.insert(self.root(), id, false, &ExtentMidpoint);
        id
    }

    /// Partitions the tree with the default split strategy.
    pub fn sort(&mut self) {
        self.sort_with(&ExtentMidpoint);
    }

    /// Partitions the tree, choosing split values with `selector`.
    pub fn sort_with<S: SplitSelector>(&mut self, selector: &S) {
        let root = self.root();
        let node = &self.nodes[root];
        if node.data.len() > self.config.max_children && node.depth < self.config.max_depth {
            self.split(root, selector);
        }
    }

    fn insert<S: SplitSelector>(&mut self, id: NodeId, seg: SegmentId, sorting: bool, selector: &S) {
        let node = &self.nodes[id];
        match (node.children, node.axis) {
            (Some([left, right]), Some(axis)) => {
                let segment = &self.segments[seg];
                let (lo, hi) = segment.extent(axis);
                let r = segment.c_radius;
                if hi + r < node.value {
                    self.insert(left, seg, sorting, selector);
                } else if lo - r > node.value {
                    self.insert(right, seg, sorting, selector);
                } else {
                    self.nodes[id].data.push(seg);
                }
            }
            _ => {
                self.nodes[id].data.push(seg);
                let node = &self.nodes[id];
                if sorting
                    && node.data.len() > self.config.max_children
                    && node.depth < self.config.max_depth
                {
                    self.split(id, selector);
                }
            }
        }
    }

    fn split<S: SplitSelector>(&mut self, id: NodeId, selector: &S) {
        let node = &self.nodes[id];
        if node.data.len() < self.config.max_children || !node.is_leaf() {
            return;
        }

        let axis = node
            .parent
            .and_then(|p| self.nodes[p].axis)
            .map_or(Axis::X, Axis::next);
        let Some(value) = selector.select(node.data.iter().map(|&s| &self.segments[s]), axis) else {
            return;
        };

        let depth = node.depth + 1;
        let left = self.nodes.len();
        self.nodes.push(BspNode::new(Some(id), depth));
        self.nodes.push(BspNode::new(Some(id), depth));

        let node = &mut self.nodes[id];
        node.axis = Some(axis);
        node.value = value;
        node.children = Some([left, left + 1]);
        let pending = std::mem::take(&mut node.data);

        for seg in pending {
            self.insert(id, seg, true, selector);
        }

        let empty = |n: &BspNode| n.data.is_empty() && n.is_leaf();
        if empty(&self.nodes[left]) && empty(&self.nodes[left + 1]) {
            // Nothing could be separated; the children were never split so
            // they are still the last two nodes.
            self.nodes.truncate(left);
            let node = &mut self.nodes[id];
            node.axis = None;
            node.children = None;
        }
    }

    /// Visits every segment whose capsule contains `point`.
    pub fn query_point<V: SegmentVisitor>(&self, point: &Point3<f64>, visitor: &mut V) {
        self.query_point_node(self.root(), point, visitor);
    }

    fn query_point_node<V: SegmentVisitor>(&self, id: NodeId, point: &Point3<f64>, visitor: &mut V) {
        let node = &self.nodes[id];
        for &s in &node.data {
            let segment = &self.segments[s];
            if segment.contains(point) {
                visitor.visit(s, segment);
            }
        }
        if let (Some([left, right]), Some(axis)) = (node.children, node.axis) {
            let p = axis.coord(point);
            if p < node.value {
                self.query_point_node(left, point, visitor);
            }
            if p > node.value {
                self.query_point_node(right, point, visitor);
            }
        }
    }

    /// Visits every segment whose capsule overlaps `query`.
    pub fn query_segment<V: SegmentVisitor>(&self, query: &BspSegment, visitor: &mut V) {
        self.query_segment_node(self.root(), query, visitor);
    }

    fn query_segment_node<V: SegmentVisitor>(&self, id: NodeId, query: &BspSegment, visitor: &mut V) {
        let node = &self.nodes[id];
        for &s in &node.data {
            let segment = &self.segments[s];
            if segment.touch(query) {
                visitor.visit(s, segment);
            }
        }
        if let (Some([left, right]), Some(axis)) = (node.children, node.axis) {
            let (lo, hi) = query.extent(axis);
            let r = query.c_radius;
            if lo - r < node.value {
                self.query_segment_node(left, query, visitor);
            }
            if hi + r > node.value {
                self.query_segment_node(right, query, visitor);
            }
        }
    }

    /// Visits every segment whose bounding sphere overlaps `bbox` in plan
    /// view. The Z extent of the box is ignored.
    pub fn query_box<V: SegmentVisitor>(&self, bbox: &BoundingBox, visitor: &mut V) {
        self.query_box_node(self.root(), bbox, visitor);
    }

    fn query_box_node<V: SegmentVisitor>(&self, id: NodeId, bbox: &BoundingBox, visitor: &mut V) {
        let node = &self.nodes[id];
        for &s in &node.data {
            let segment = &self.segments[s];
            let (m, r) = (&segment.middle, segment.s_radius);
            if bbox.min.x <= m.x + r
                && bbox.max.x >= m.x - r
                && bbox.min.y <= m.y + r
                && bbox.max.y >= m.y - r
            {
                visitor.visit(s, segment);
            }
        }
        if let (Some([left, right]), Some(axis)) = (node.children, node.axis) {
            let (go_left, go_right) = match axis {
                Axis::X => (bbox.min.x < node.value, bbox.max.x > node.value),
                Axis::Y => (bbox.min.y < node.value, bbox.max.y > node.value),
                Axis::Z => (true, true),
            };
            if go_left {
                self.query_box_node(left, bbox, visitor);
            }
            if go_right {
                self.query_box_node(right, bbox, visitor);
            }
        }
    }

    /// Ids of the segments whose capsule contains `point`.
    pub fn segments_at(&self, point: &Point3<f64>) -> Vec<SegmentId> {
        let mut visitor = CollectingVisitor::new();
        self.query_point(point, &mut visitor);
        visitor.into_ids()
    }

    /// Ids of the segments overlapping `query`.
    pub fn segments_touching(&self, query: &BspSegment) -> Vec<SegmentId> {
        let mut visitor = CollectingVisitor::new();
        self.query_segment(query, &mut visitor);
        visitor.into_ids()
    }

    /// Ids of the segments that may overlap `bbox` in plan view.
    pub fn segments_in(&self, bbox: &BoundingBox) -> Vec<SegmentId> {
        let mut visitor = CollectingVisitor::new();
        self.query_box(bbox, &mut visitor);
        visitor.into_ids()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsp::selector::MedianMiddle;
    use crate::bsp::visitor::FnVisitor;

    fn make_segment(a: [f64; 3], b: [f64; 3], r: f64) -> BspSegment {
        BspSegment::new(Point3::from(a), Point3::from(b), r)
    }

    /// Short segments scattered on a 6x6 grid in the XY plane.
    fn make_grid_tree(config: BspConfig) -> BspTree {
        let mut tree = BspTree::new(config);
        for i in 0..6 {
            for j in 0..6 {
                let (x, y) = (i as f64 * 10.0, j as f64 * 10.0);
                tree.add_segment(make_segment([x, y, 0.0], [x + 3.0, y + 1.0, 0.5], 0.5));
            }
        }
        tree.sort();
        tree
    }

    fn brute_force_touching(tree: &BspTree, query: &BspSegment) -> Vec<SegmentId> {
        (0..tree.segments().len())
            .filter(|&i| tree.segments()[i].touch(query))
            .collect()
    }

    fn sorted(mut ids: Vec<SegmentId>) -> Vec<SegmentId> {
        ids.sort_unstable();
        ids
    }

    #[test]
    fn empty_tree() {
        let tree = BspTree::default();
        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.depth(), 1);
        assert!(tree.segments_at(&Point3::origin()).is_empty());
    }

    #[test]
    fn unsorted_tree_keeps_everything_at_root() {
        let mut tree = BspTree::default();
        for i in 0..10 {
            let x = i as f64 * 5.0;
            tree.add_segment(make_segment([x, 0.0, 0.0], [x + 1.0, 0.0, 0.0], 0.1));
        }
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.node(tree.root()).unwrap().data().len(), 10);
    }

    #[test]
    fn sort_respects_limits() {
        let config = BspConfig {
            max_depth: 1,
            max_children: 3,
        };
        let tree = make_grid_tree(config);
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.depth(), 2);
        for id in 0..tree.node_count() {
            let node = tree.node(id).unwrap();
            assert!(node.depth() <= config.max_depth);
            assert_eq!(node.is_leaf(), node.axis().is_none());
        }
    }

    #[test]
    fn every_segment_is_stored_once() {
        let tree = make_grid_tree(BspConfig::default());
        let mut stored: Vec<SegmentId> = (0..tree.node_count())
            .flat_map(|id| tree.node(id).unwrap().data().to_vec())
            .collect();
        stored.sort_unstable();
        assert_eq!(stored, (0..36).collect::<Vec<_>>());
    }

    #[test]
    fn first_split_is_on_x() {
        let tree = make_grid_tree(BspConfig::default());
        let root = tree.node(tree.root()).unwrap();
        assert_eq!(root.axis(), Some(Axis::X));
        let [left, _] = root.children().unwrap();
        if let Some(axis) = tree.node(left).unwrap().axis() {
            assert_eq!(axis, Axis::Y);
        }
    }

    #[test]
    fn segment_query_matches_brute_force() {
        let tree = make_grid_tree(BspConfig::default());
        let queries = [
            make_segment([-5.0, 5.0, 0.0], [60.0, 5.0, 0.0], 1.0),
            make_segment([21.0, 21.0, 0.0], [21.0, 21.0, 0.0], 0.5),
            make_segment([0.0, 0.0, 0.0], [55.0, 55.0, 0.0], 2.0),
            make_segment([100.0, 100.0, 0.0], [110.0, 100.0, 0.0], 1.0),
        ];
        for q in &queries {
            assert_eq!(
                sorted(tree.segments_touching(q)),
                brute_force_touching(&tree, q)
            );
        }
    }

    #[test]
    fn point_query_finds_containing_capsules() {
        let tree = make_grid_tree(BspConfig::default());
        let hits = tree.segments_at(&Point3::new(11.5, 10.5, 0.25));
        assert_eq!(hits.len(), 1);
        let seg = tree.segment(hits[0]).unwrap();
        assert_eq!(seg.start, Point3::new(10.0, 10.0, 0.0));
        assert!(tree.segments_at(&Point3::new(5.0, 5.0, 0.0)).is_empty());
    }

    #[test]
    fn box_query_is_conservative() {
        let tree = make_grid_tree(BspConfig::default());
        let bbox = BoundingBox::new(Point3::new(9.0, 9.0, -100.0), Point3::new(14.0, 12.0, 100.0));
        let hits = tree.segments_in(&bbox);
        assert!(hits.iter().any(|&id| tree.segment(id).unwrap().start == Point3::new(10.0, 10.0, 0.0)));
        for id in hits {
            let s = tree.segment(id).unwrap();
            assert!(s.middle.x - s.s_radius <= bbox.max.x && s.middle.y - s.s_radius <= bbox.max.y);
        }
    }

    #[test]
    fn point_query_matches_brute_force() {
        let tree = make_grid_tree(BspConfig::default());
        assert!(tree.depth() >= 3);
        for i in -4..=62 {
            for j in -4..=14 {
                let p = Point3::new(i as f64 * 0.97, j as f64 * 4.3, 0.25);
                let expected: Vec<SegmentId> = (0..tree.segments().len())
                    .filter(|&s| tree.segments()[s].contains(&p))
                    .collect();
                assert_eq!(sorted(tree.segments_at(&p)), expected, "at {p}");
            }
        }
    }

    #[test]
    fn box_query_matches_brute_force() {
        let tree = make_grid_tree(BspConfig::default());
        let boxes = [
            BoundingBox::new(Point3::new(9.0, 9.0, 0.0), Point3::new(14.0, 12.0, 0.0)),
            BoundingBox::new(Point3::new(-10.0, 23.5, 0.0), Point3::new(70.0, 26.0, 0.0)),
            BoundingBox::new(Point3::new(3.2, -5.0, 0.0), Point3::new(7.1, 60.0, 0.0)),
            BoundingBox::new(Point3::new(33.6, 41.4, 0.0), Point3::new(33.6, 41.4, 0.0)),
            BoundingBox::new(Point3::new(200.0, 200.0, 0.0), Point3::new(210.0, 210.0, 0.0)),
        ];
        for bbox in &boxes {
            let hits = sorted(tree.segments_in(bbox));
            for (id, s) in tree.segments().iter().enumerate() {
                let (x0, x1) = s.extent(Axis::X);
                let (y0, y1) = s.extent(Axis::Y);
                let r = s.c_radius;
                let capsule_overlaps = bbox.min.x <= x1 + r
                    && bbox.max.x >= x0 - r
                    && bbox.min.y <= y1 + r
                    && bbox.max.y >= y0 - r;
                let (m, sr) = (&s.middle, s.s_radius);
                let sphere_overlaps = bbox.min.x <= m.x + sr
                    && bbox.max.x >= m.x - sr
                    && bbox.min.y <= m.y + sr
                    && bbox.max.y >= m.y - sr;
                let found = hits.binary_search(&id).is_ok();
                if capsule_overlaps {
                    assert!(found, "segment {id} missing from {bbox:?}");
                }
                if found {
                    assert!(sphere_overlaps, "segment {id} reported for {bbox:?}");
                }
            }
        }
    }

    #[test]
    fn identical_segments_stay_together() {
        let mut tree = BspTree::default();
        for _ in 0..8 {
            tree.add_segment(make_segment([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], 0.5));
        }
        tree.sort();
        assert_eq!(tree.node_count(), 1);
        assert!(tree.node(0).unwrap().is_leaf());
        assert_eq!(tree.segments_at(&Point3::new(0.5, 0.0, 0.0)).len(), 8);
    }

    #[test]
    fn median_selector_builds_complete_tree() {
        let mut tree = BspTree::default();
        for i in 0..20 {
            let x = (i * i) as f64;
            tree.add_segment(make_segment([x, 0.0, 0.0], [x + 0.5, 0.0, 0.0], 0.1));
        }
        tree.sort_with(&MedianMiddle);
        let q = make_segment([-1.0, 0.0, 0.0], [400.0, 0.0, 0.0], 0.2);
        assert_eq!(tree.segments_touching(&q).len(), 20);
    }

    #[test]
    fn fn_visitor_reports_zones() {
        let mut tree = BspTree::default();
        tree.add_segment(make_segment([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], 0.5).with_zone(3));
        tree.add_segment(make_segment([5.0, 0.0, 0.0], [6.0, 0.0, 0.0], 0.5).with_zone(4));
        tree.sort();
        let mut zones = Vec::new();
        let q = make_segment([0.5, -2.0, 0.0], [0.5, 2.0, 0.0], 0.1);
        tree.query_segment(&q, &mut FnVisitor::new(|_, s: &BspSegment| zones.extend(s.zone)));
        assert_eq!(zones, vec![3]);
    }
}
