//! Scene model consumed and rewritten by the clipper.
//!
//! A [`Scene`] is a face list placed in the world by a translation. Scenes
//! generated by sweeping a cross section along a path also carry
//! [`SceneData`] and group their faces into per-section index lists, one
//! list per path segment.

mod data;
mod face;
mod face_bsp;
mod projection;

use nalgebra::{Point3, Vector3};

pub use data::{
    AvoidArea, AvoidInfo, AvoidZone, CrossSection, ExternalReference, Feature, SceneData,
    PRIORITY_KEY,
};
pub use face::{Face, MappedTexture, Material};
pub use face_bsp::{FaceBsp, FaceBspNode, FACE_BSP_LEAF_FACES, FACE_BSP_MAX_DEPTH};
pub use projection::Projection2D;

/// Identifies a scene among those a clipper was initialized with.
pub type SceneId = usize;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub id: SceneId,
    pub name: String,
    pub faces: Vec<Face>,
    /// Face indices generated for each path segment.
    pub section_face_indices: Vec<Vec<usize>>,
    /// The path the scene's cross section was swept along, in scene space.
    pub path: Vec<Point3<f64>>,
    /// Placement of the scene in the world.
    pub translation: Vector3<f64>,
    pub data: Option<SceneData>,
    pub external_references: Vec<ExternalReference>,
    pub bsp: FaceBsp,
}

impl Scene {
    pub fn new(id: SceneId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Self::default()
        }
    }

    /// Clip priority of the scene's source feature.
    pub fn priority(&self) -> i32 {
        self.data.as_ref().map_or(0, SceneData::priority)
    }

    /// Number of path segments, each of which produced one section.
    pub fn section_count(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Rebuilds the face partition.
    pub fn sort_faces(&mut self) {
        self.bsp = FaceBsp::build(&self.faces);
    }

    /// Faces that have not been cleared by clipping.
    pub fn live_faces(&self) -> impl Iterator<Item = &Face> {
        self.faces.iter().filter(|f| !f.clipped)
    }
}
