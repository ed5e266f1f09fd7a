//! Bounding-volume index over clipping zones.
//!
//! Each clipping zone is summarized by a capsule ([`BspSegment`]) and the
//! capsules are stored in an axis-aligned binary partition. Queries by point,
//! by capsule, or by plan-view box return the zones worth testing exactly.
//!
//! # Example
//!
//! ```
//! use avoid_clip::bsp::{BspSegment, BspTree};
//! use nalgebra::Point3;
//!
//! let mut tree = BspTree::default();
//! for i in 0..10 {
//!     let x = i as f64 * 10.0;
//!     tree.add_segment(BspSegment::new(Point3::new(x, 0.0, 0.0), Point3::new(x + 5.0, 0.0, 0.0), 1.0));
//! }
//! tree.sort();
//!
//! let probe = BspSegment::new(Point3::new(12.0, -3.0, 0.0), Point3::new(12.0, 3.0, 0.0), 0.5);
//! assert_eq!(tree.segments_touching(&probe), vec![1]);
//! ```
//!
//! # Architecture
//!
//! - [`BspTree`]: node and segment arenas plus the query entry points
//! - [`BspNode`]: split axis and value, children, and straddling segments
//! - [`SplitSelector`]: strategy trait for choosing split values
//! - [`SegmentVisitor`]: receives query results

mod node;
mod segment;
mod selector;
mod tree;
mod visitor;

pub use node::{Axis, BspNode, NodeId, SegmentId};
pub use segment::BspSegment;
pub use selector::{ExtentMidpoint, MedianMiddle, SplitSelector};
pub use tree::BspTree;
pub use visitor::{CollectingVisitor, FnVisitor, SegmentVisitor};
