//! Tunables for the clipping pipeline and the zone index.

use crate::plane::CLIP_EPSILON;
use crate::triangle::COLLAPSED_AREA;

/// Branching limits for [`BspTree`](crate::bsp::BspTree).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BspConfig {
    /// Nodes at this depth never split.
    pub max_depth: usize,
    /// A leaf splits once it holds more segments than this.
    pub max_children: usize,
}

impl Default for BspConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            max_children: 3,
        }
    }
}

/// Settings threaded through every clip call.
///
/// There is no process-wide tolerance: each plane built by the clipper
/// captures `epsilon` at construction, and ring stitching reads it from here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipConfig {
    /// Signed-distance tolerance for on-plane classification.
    pub epsilon: f64,
    /// Triangles whose squared doubled area falls below this are dropped.
    pub collapsed_area: f64,
    /// Re-cap the planar holes left where a zone cut through geometry.
    pub cap_exposed_faces: bool,
    /// Reject split points that fall outside the face polygon of the plane.
    pub boundary_check: bool,
    pub bsp: BspConfig,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            epsilon: CLIP_EPSILON,
            collapsed_area: COLLAPSED_AREA,
            cap_exposed_faces: false,
            boundary_check: false,
            bsp: BspConfig::default(),
        }
    }
}

impl ClipConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_collapsed_area(mut self, area: f64) -> Self {
        self.collapsed_area = area;
        self
    }

    pub fn with_cap_exposed_faces(mut self, enabled: bool) -> Self {
        self.cap_exposed_faces = enabled;
        self
    }

    pub fn with_boundary_check(mut self, enabled: bool) -> Self {
        self.boundary_check = enabled;
        self
    }

    pub fn with_bsp(mut self, bsp: BspConfig) -> Self {
        self.bsp = bsp;
        self
    }
}
