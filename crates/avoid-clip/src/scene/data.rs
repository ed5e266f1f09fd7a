//! Avoidance metadata attached to scenes.

use std::collections::BTreeMap;
use std::sync::Arc;

use nalgebra::{Point2, Point3, UnitQuaternion, Vector3};

use super::Projection2D;

/// Attribute key holding a feature's clip priority.
pub const PRIORITY_KEY: &str = "priority";

/// Source feature of a scene with its free-form attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feature {
    pub attributes: BTreeMap<String, String>,
}

impl Feature {
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Integer value of the `priority` attribute, matched case-insensitively.
    ///
    /// Missing or unparsable values count as zero.
    pub fn priority(&self) -> i32 {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(PRIORITY_KEY))
            .and_then(|(_, value)| value.trim().parse().ok())
            .unwrap_or(0)
    }
}

/// A closed outline in cross-section coordinates describing a region other
/// geometry must stay out of.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvoidArea {
    points: Vec<Point2<f64>>,
}

impl AvoidArea {
    pub fn new(points: Vec<Point2<f64>>) -> Self {
        Self { points }
    }

    #[inline]
    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    /// The outline without a repeated closing point.
    pub fn open_ring(&self, epsilon: f64) -> &[Point2<f64>] {
        match self.points.as_slice() {
            [first, rest @ .., last] if !rest.is_empty() && (first - last).norm() < epsilon => {
                &self.points[..self.points.len() - 1]
            }
            points => points,
        }
    }
}

/// The profile swept along a scene's path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossSection {
    pub name: String,
    pub avoid_areas: Vec<AvoidArea>,
    /// Radius of a circle around the profile origin enclosing the profile.
    pub radius: f64,
    pub width: f64,
}

impl CrossSection {
    #[inline]
    pub fn avoid_areas(&self) -> &[AvoidArea] {
        &self.avoid_areas
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }
}

/// Per-scene data needed to build and apply clipping zones.
///
/// `projections` holds one frame per path point, in path order.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneData {
    pub cross_section: Arc<CrossSection>,
    pub projections: Vec<Projection2D>,
    pub feature: Option<Feature>,
}

impl SceneData {
    pub fn new(cross_section: Arc<CrossSection>, projections: Vec<Projection2D>) -> Self {
        Self {
            cross_section,
            projections,
            feature: None,
        }
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.feature = Some(feature);
        self
    }

    /// Clip priority of the scene, zero without a feature.
    pub fn priority(&self) -> i32 {
        self.feature.as_ref().map_or(0, Feature::priority)
    }
}

/// A cross section swept along a sequence of frames, given without a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct AvoidZone {
    /// Translation of the scene the zone was taken from.
    pub origin: Vector3<f64>,
    pub cross_section: Arc<CrossSection>,
    pub projections: Vec<Projection2D>,
}

/// Stand-alone avoidance description in a common frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvoidInfo {
    pub origin: Vector3<f64>,
    pub avoid_zones: Vec<AvoidZone>,
}

/// A reference to an externally modelled object placed in a scene.
///
/// The object spans `z_min..z_max` along its local up axis and is
/// approximated by a capsule of `radius` for overlap tests.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalReference {
    pub name: String,
    pub position: Point3<f64>,
    pub attitude: UnitQuaternion<f64>,
    pub z_min: f64,
    pub z_max: f64,
    pub radius: f64,
}

impl ExternalReference {
    pub fn new(name: impl Into<String>, position: Point3<f64>, radius: f64) -> Self {
        Self {
            name: name.into(),
            position,
            attitude: UnitQuaternion::identity(),
            z_min: 0.0,
            z_max: 0.0,
            radius,
        }
    }

    /// End points of the reference's vertical axis, top first.
    pub fn axis(&self, offset: &Vector3<f64>) -> (Point3<f64>, Point3<f64>) {
        let origin = self.position + offset;
        let up = self.attitude * Vector3::z();
        (origin + up * self.z_max, origin + up * self.z_min)
    }
}
