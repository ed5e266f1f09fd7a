//! Error types for avoid-zone construction and clipping.

use thiserror::Error;

/// Result type for clipper operations.
pub type Result<T> = std::result::Result<T, ClipError>;

/// Errors reported while building avoid zones or starting a clip pass.
///
/// Geometric degeneracy (collapsed triangles, near-parallel tests) is never
/// reported here; it is resolved locally by dropping the degenerate result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClipError {
    #[error("no scenes to initialize from")]
    NoScenes,

    #[error("no avoid zones to initialize from")]
    NoAvoidZones,

    #[error("scene {scene} carries no scene data")]
    MissingSceneData { scene: usize },

    #[error("scene {scene} has no line-string path")]
    MissingPath { scene: usize },

    #[error("avoid zone has no projections")]
    EmptyProjections,

    #[error("scene {scene} has {found} projections for a path of {expected} points")]
    ProjectionCount {
        scene: usize,
        expected: usize,
        found: usize,
    },

    #[error("clipper is not initialized")]
    NotInitialized,

    #[error("cap triangulation failed: {0}")]
    Triangulation(String),
}
