//! Visitors receiving the results of zone BSP queries.

use super::node::SegmentId;
use super::segment::BspSegment;

/// Receives every segment a query finds.
///
/// A segment stored at one node is reported at most once per query.
pub trait SegmentVisitor {
    fn visit(&mut self, id: SegmentId, segment: &BspSegment);
}

/// Collects the ids of visited segments in visit order.
#[derive(Debug, Default)]
pub struct CollectingVisitor {
    collected: Vec<SegmentId>,
}

impl CollectingVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[SegmentId] {
        &self.collected
    }

    pub fn into_ids(self) -> Vec<SegmentId> {
        self.collected
    }
}

impl SegmentVisitor for CollectingVisitor {
    fn visit(&mut self, id: SegmentId, _segment: &BspSegment) {
        self.collected.push(id);
    }
}

/// A visitor that calls a closure for each segment.
pub struct FnVisitor<F>
where
    F: FnMut(SegmentId, &BspSegment),
{
    func: F,
}

impl<F> FnVisitor<F>
where
    F: FnMut(SegmentId, &BspSegment),
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> SegmentVisitor for FnVisitor<F>
where
    F: FnMut(SegmentId, &BspSegment),
{
    fn visit(&mut self, id: SegmentId, segment: &BspSegment) {
        (self.func)(id, segment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn make_segment() -> BspSegment {
        BspSegment::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0), 0.5)
    }

    #[test]
    fn collecting_visitor_keeps_order() {
        let seg = make_segment();
        let mut visitor = CollectingVisitor::new();
        assert!(visitor.ids().is_empty());
        visitor.visit(4, &seg);
        visitor.visit(1, &seg);
        assert_eq!(visitor.into_ids(), vec![4, 1]);
    }

    #[test]
    fn fn_visitor_calls_closure() {
        let seg = make_segment().with_zone(9);
        let mut zones = Vec::new();
        {
            let mut visitor = FnVisitor::new(|_, s: &BspSegment| zones.extend(s.zone));
            visitor.visit(0, &seg);
            visitor.visit(1, &seg);
        }
        assert_eq!(zones, vec![9, 9]);
    }
}
