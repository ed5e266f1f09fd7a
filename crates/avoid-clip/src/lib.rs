//! Avoid-zone clipping of triangulated scene geometry.
//!
//! Avoid areas of a cross section are swept along a scene's path into
//! convex prisms ([`ClippingZone`]). The prisms are indexed by their
//! enclosing capsules in a [`bsp::BspTree`], and [`AvoidClipper`] pushes the
//! faces of other scenes through every nearby prism, keeping only what lies
//! outside.

pub mod bsp;
pub mod scene;

mod bounds;
mod clipper;
mod config;
mod edge;
mod error;
mod plane;
mod polygon;
mod progress;
mod split;
mod triangle;
mod zone;

pub use bounds::BoundingBox;
pub use clipper::AvoidClipper;
pub use config::{BspConfig, ClipConfig};
pub use edge::{collect_rings, connect_edges, ClippingEdge};
pub use error::{ClipError, Result};
pub use plane::{ClippingPlane, Location, CLIP_EPSILON};
pub use polygon::{distance_to_segment, Polygon};
pub use progress::{LogProgress, NullProgress, ProgressObserver};
pub use scene::{
    AvoidArea, AvoidInfo, AvoidZone, CrossSection, ExternalReference, Face, Feature, Projection2D,
    Scene, SceneData, SceneId,
};
pub use triangle::{ClippingTriangle, TriangleFlags, COLLAPSED_AREA};
pub use zone::ClippingZone;
