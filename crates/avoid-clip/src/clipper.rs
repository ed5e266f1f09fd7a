//! Orchestration of zone construction and clipping passes.

use std::mem;

use nalgebra::{Point3, Vector3};
use tracing::{debug, trace, warn};

use crate::bounds::BoundingBox;
use crate::bsp::{BspSegment, BspTree};
use crate::config::ClipConfig;
use crate::error::{ClipError, Result};
use crate::progress::ProgressObserver;
use crate::scene::{AvoidInfo, AvoidZone, Face, Scene, SceneData};
use crate::triangle::ClippingTriangle;
use crate::zone::ClippingZone;

/// Removes scene geometry that falls inside avoid zones.
///
/// A clipper is built from a set of scenes (or a stand-alone [`AvoidInfo`])
/// by sweeping every avoid area of each scene's cross section along its
/// path. Zones are indexed by their capsules in a [`BspTree`]. All zone
/// geometry is expressed relative to `origin`, the translation of the first
/// input, so that scenes far from the world origin keep their precision.
///
/// ```
/// use avoid_clip::{AvoidClipper, ClipConfig, NullProgress, Scene};
///
/// let mut clipper = AvoidClipper::new(ClipConfig::default());
/// assert!(clipper.initialize(&[]).is_err());
///
/// let mut scene = Scene::new(0, "empty");
/// assert!(clipper.clip_scene(&mut scene, &mut NullProgress).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct AvoidClipper {
    zones: Vec<ClippingZone>,
    bsp: BspTree,
    origin: Vector3<f64>,
    config: ClipConfig,
    initialized: bool,
}

impl AvoidClipper {
    pub fn new(config: ClipConfig) -> Self {
        Self {
            bsp: BspTree::new(config.bsp),
            config,
            ..Self::default()
        }
    }

    /// Drops every zone and the index, returning to the uninitialized state.
    pub fn reset(&mut self) {
        self.zones.clear();
        self.bsp = BspTree::new(self.config.bsp);
        self.origin = Vector3::zeros();
        self.initialized = false;
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[inline]
    pub fn zones(&self) -> &[ClippingZone] {
        &self.zones
    }

    /// The capsule index over [`AvoidClipper::zones`].
    #[inline]
    pub fn index(&self) -> &BspTree {
        &self.bsp
    }

    #[inline]
    pub fn origin(&self) -> &Vector3<f64> {
        &self.origin
    }

    #[inline]
    pub fn config(&self) -> &ClipConfig {
        &self.config
    }

    /// Builds zones from every scene in `scenes`.
    ///
    /// On error the clipper is left reset.
    pub fn initialize(&mut self, scenes: &[Scene]) -> Result<()> {
        self.initialize_scenes(scenes.iter())
    }

    /// Same as [`AvoidClipper::initialize`] for borrowed scenes.
    pub fn initialize_refs(&mut self, scenes: &[&Scene]) -> Result<()> {
        self.initialize_scenes(scenes.iter().copied())
    }

    /// Builds zones from stand-alone avoid zones. Such zones belong to no
    /// scene and have priority zero.
    pub fn initialize_from_info(&mut self, info: &AvoidInfo) -> Result<()> {
        self.reset();
        if info.avoid_zones.is_empty() {
            warn!("no avoid zones to initialize from");
            return Err(ClipError::NoAvoidZones);
        }
        self.origin = info.origin;
        for avoid in &info.avoid_zones {
            if let Err(err) = self.add_avoid_zone(avoid) {
                warn!(%err, "failed to build avoid zones");
                self.reset();
                return Err(err);
            }
        }
        self.build_index();
        Ok(())
    }

    fn initialize_scenes<'a, I>(&mut self, scenes: I) -> Result<()>
    where
        I: Iterator<Item = &'a Scene>,
    {
        self.reset();
        let mut scenes = scenes.peekable();
        let Some(first) = scenes.peek() else {
            warn!("no scenes to initialize from");
            return Err(ClipError::NoScenes);
        };
        self.origin = first.translation;

        for scene in scenes {
            if let Err(err) = self.add_scene_zones(scene) {
                warn!(scene = scene.id, %err, "failed to build avoid zones");
                self.reset();
                return Err(err);
            }
        }
        self.build_index();
        Ok(())
    }

    /// One zone per avoid area for each segment of the scene's path.
    fn add_scene_zones(&mut self, scene: &Scene) -> Result<()> {
        if scene.path.is_empty() {
            return Err(ClipError::MissingPath { scene: scene.id });
        }
        if scene.section_count() == 0 {
            return Ok(());
        }
        let data = scene_data(scene)?;
        let offset = scene.translation - self.origin;
        let priority = scene.priority();

        for pair in data.projections.windows(2).take(scene.section_count()) {
            for area in data.cross_section.avoid_areas() {
                let zone = ClippingZone::new(area, &pair[0], &pair[1], &offset, &self.config)
                    .with_source(scene.id, priority);
                self.zones.push(zone);
            }
        }
        Ok(())
    }

    fn add_avoid_zone(&mut self, avoid: &AvoidZone) -> Result<()> {
        if avoid.projections.is_empty() {
            return Err(ClipError::EmptyProjections);
        }
        let offset = avoid.origin - self.origin;
        for pair in avoid.projections.windows(2) {
            for area in avoid.cross_section.avoid_areas() {
                self.zones
                    .push(ClippingZone::new(area, &pair[0], &pair[1], &offset, &self.config));
            }
        }
        Ok(())
    }

    fn build_index(&mut self) {
        for (i, zone) in self.zones.iter().enumerate() {
            self.bsp.add_segment(zone.segment().with_zone(i));
        }
        self.bsp.sort();
        self.initialized = true;
        debug!(
            zones = self.zones.len(),
            nodes = self.bsp.node_count(),
            depth = self.bsp.depth(),
            "avoid zones indexed"
        );
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(ClipError::NotInitialized)
        }
    }

    /// Zone indices behind a list of segment ids.
    fn zones_of(&self, ids: &[usize]) -> impl Iterator<Item = usize> {
        ids.iter()
            .filter_map(|&id| self.bsp.segment(id))
            .filter_map(|segment| segment.zone)
    }

    /// Runs `triangles` through each zone in turn, swapping two buffers.
    fn clip_through(
        &self,
        zones: &[usize],
        triangles: Vec<ClippingTriangle>,
        priority: i32,
    ) -> Vec<ClippingTriangle> {
        let mut current = triangles;
        let mut next = Vec::with_capacity(current.len());
        for &z in zones {
            next.clear();
            self.zones[z].process_triangles(&current, &mut next, priority);
            mem::swap(&mut current, &mut next);
        }
        current
    }

    /// Converts surviving triangles back to faces, dropping collapsed ones.
    fn to_faces(&self, triangles: &[ClippingTriangle], offset: &Vector3<f64>, faces: &[Face]) -> Vec<Face> {
        triangles
            .iter()
            .filter(|t| !t.collapsed(self.config.collapsed_area))
            .map(|t| t.to_face(offset, faces))
            .collect()
    }

    /// Clips a scene section by section along its path.
    ///
    /// Zones built from the scene itself are ignored. New faces overwrite
    /// freed slots (slots already marked clipped and those of the faces being
    /// replaced) before the face list grows, and each section's index list
    /// is rewritten to the slots its faces now occupy. Slots left over are
    /// marked clipped. External references overlapping a zone of another
    /// scene are removed.
    ///
    /// The pass is announced to `progress` as two units.
    pub fn clip_scene(&self, scene: &mut Scene, progress: &mut dyn ProgressObserver) -> Result<()> {
        self.ensure_initialized()?;
        progress.start(2);
        self.clip_scene_pass(scene, progress)
    }

    /// Runs a scene pass inside a larger announced pass.
    fn clip_scene_pass(&self, scene: &mut Scene, progress: &mut dyn ProgressObserver) -> Result<()> {

        let mut free_blocks: Vec<usize> = scene
            .faces
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.clipped.then_some(i))
            .collect();

        if scene.path.is_empty() {
            return Ok(());
        }
        let offset = scene.translation - self.origin;

        for section in 0..scene.section_count() {
            self.clip_section(scene, section, &offset, &mut free_blocks)?;
        }
        progress.update(1);

        for slot in free_blocks {
            if let Some(face) = scene.faces.get_mut(slot) {
                face.vertex_normals.clear();
                face.textures.clear();
                face.materials.clear();
                face.clipped = true;
            }
        }

        self.prune_external_references(scene, &offset);
        progress.update(1);
        Ok(())
    }

    fn clip_section(
        &self,
        scene: &mut Scene,
        section: usize,
        offset: &Vector3<f64>,
        free_blocks: &mut Vec<usize>,
    ) -> Result<()> {
        let data = scene_data(scene)?;
        let (Some(start), Some(stop)) = (data.projections.get(section), data.projections.get(section + 1)) else {
            return Err(ClipError::ProjectionCount {
                scene: scene.id,
                expected: scene.path.len(),
                found: data.projections.len(),
            });
        };
        let query = BspSegment::new(
            start.origin() + offset,
            stop.origin() + offset,
            data.cross_section.radius(),
        );
        let candidates: Vec<usize> = self
            .zones_of(&self.bsp.segments_touching(&query))
            .filter(|&z| self.zones[z].source() != Some(scene.id))
            .collect();
        if candidates.is_empty() {
            return Ok(());
        }

        let indices = scene
            .section_face_indices
            .get(section)
            .cloned()
            .unwrap_or_default();
        let live: Vec<usize> = indices
            .into_iter()
            .filter(|&i| scene.faces.get(i).is_some_and(|f| !f.clipped))
            .collect();
        let triangles: Vec<ClippingTriangle> = live
            .iter()
            .filter_map(|&i| ClippingTriangle::from_face(&scene.faces[i], i, offset))
            .collect();

        let survivors = self.clip_through(&candidates, triangles, scene.priority());
        let new_faces = self.to_faces(&survivors, offset, &scene.faces);
        trace!(
            scene = scene.id,
            section,
            zones = candidates.len(),
            before = live.len(),
            after = new_faces.len(),
            "clipped section"
        );

        free_blocks.extend(live);
        let slots = write_back(&mut scene.faces, new_faces, free_blocks);
        if let Some(list) = scene.section_face_indices.get_mut(section) {
            *list = slots;
        }
        Ok(())
    }

    fn prune_external_references(&self, scene: &mut Scene, offset: &Vector3<f64>) {
        let id = scene.id;
        let before = scene.external_references.len();
        scene.external_references.retain(|reference| {
            let (top, bottom) = reference.axis(offset);
            let capsule = BspSegment::new(top, bottom, reference.radius);
            !self
                .zones_of(&self.bsp.segments_touching(&capsule))
                .any(|z| self.zones[z].source() != Some(id))
        });
        let removed = before - scene.external_references.len();
        if removed > 0 {
            debug!(scene = id, removed, "external references removed");
        }
    }

    /// Clips a scene by walking its own face partition instead of its path.
    ///
    /// Every zone applies, including those built from the scene, and all
    /// faces clip with priority zero. The partition is rebuilt afterwards.
    pub fn clip_scene_by_bsp(&self, scene: &mut Scene, progress: &mut dyn ProgressObserver) -> Result<()> {
        self.ensure_initialized()?;

        scene.sort_faces();
        let bsp = mem::take(&mut scene.bsp);
        progress.start(scene.faces.len() as u64);

        let offset = scene.translation - self.origin;
        let order = bsp.depth_first();
        let boxes: Vec<BoundingBox> = order
            .iter()
            .map(|&id| {
                let mut bb = bsp.bounds(id, &scene.faces);
                bb.min.x += offset.x;
                bb.max.x += offset.x;
                bb.min.y += offset.y;
                bb.max.y += offset.y;
                bb
            })
            .collect();

        let mut free_blocks = Vec::new();
        for (&id, bbox) in order.iter().zip(&boxes) {
            let Some(node) = bsp.node(id) else {
                continue;
            };
            let candidates: Vec<usize> = self.zones_of(&self.bsp.segments_in(bbox)).collect();
            if !candidates.is_empty() && !node.face_indices.is_empty() {
                let triangles: Vec<ClippingTriangle> = node
                    .face_indices
                    .iter()
                    .filter(|&&i| !scene.faces[i].clipped)
                    .filter_map(|&i| ClippingTriangle::from_face(&scene.faces[i], i, &offset))
                    .collect();
                let survivors = self.clip_through(&candidates, triangles, 0);
                let new_faces = self.to_faces(&survivors, &offset, &scene.faces);
                trace!(node = id, zones = candidates.len(), faces = new_faces.len(), "clipped node");

                free_blocks.extend(node.face_indices.iter().copied());
                write_back(&mut scene.faces, new_faces, &mut free_blocks);
            }
            progress.update(node.face_indices.len() as u64);
        }

        for slot in free_blocks {
            let face = &mut scene.faces[slot];
            face.vertex_normals.clear();
            face.textures.clear();
            face.materials.clear();
            face.clipped = true;
        }
        scene.sort_faces();
        Ok(())
    }

    /// Clips a loose face list placed at `scene_origin`.
    ///
    /// Each face is tested against the zones touching a capsule around it.
    /// The list is replaced by the surviving faces; faces with fewer than
    /// three vertices are kept as they are.
    pub fn clip_faces(
        &self,
        faces: &mut Vec<Face>,
        scene_origin: &Vector3<f64>,
        progress: &mut dyn ProgressObserver,
    ) -> Result<()> {
        self.ensure_initialized()?;
        progress.start(faces.len() as u64);

        let offset = scene_origin - self.origin;
        let source: &[Face] = faces;
        let mut clipped = Vec::with_capacity(source.len());
        for (i, face) in source.iter().enumerate() {
            let Some(triangle) = ClippingTriangle::from_face(face, i, &offset) else {
                clipped.push(face.clone());
                progress.update(1);
                continue;
            };
            let [p1, p2, p3]: [Point3<f64>; 3] = *triangle.points();
            let radius = (p3 - p1).norm().max((p3 - p2).norm());
            let query = BspSegment::new(p1, p2, radius);
            let candidates: Vec<usize> = self.zones_of(&self.bsp.segments_touching(&query)).collect();

            let survivors = self.clip_through(&candidates, vec![triangle], 0);
            clipped.extend(self.to_faces(&survivors, &offset, source));
            progress.update(1);
        }

        debug!(before = source.len(), after = clipped.len(), "clipped face list");
        *faces = clipped;
        Ok(())
    }

    /// Initializes from `scenes` and clips each of them.
    pub fn clip_scenes(&mut self, scenes: &mut [Scene], progress: &mut dyn ProgressObserver) -> Result<()> {
        progress.start(scenes.len() as u64 * 2 + 1);
        self.initialize(scenes)?;
        progress.update(1);
        for scene in scenes.iter_mut() {
            self.clip_scene_pass(scene, progress)?;
        }
        Ok(())
    }
}

fn scene_data(scene: &Scene) -> Result<&SceneData> {
    let data = scene
        .data
        .as_ref()
        .ok_or(ClipError::MissingSceneData { scene: scene.id })?;
    if data.projections.len() < scene.path.len() {
        return Err(ClipError::ProjectionCount {
            scene: scene.id,
            expected: scene.path.len(),
            found: data.projections.len(),
        });
    }
    Ok(data)
}

/// Places `new_faces` into free slots, most recently freed first, then
/// appends the rest. Returns the slot of every new face in order.
fn write_back(faces: &mut Vec<Face>, new_faces: Vec<Face>, free_blocks: &mut Vec<usize>) -> Vec<usize> {
    let mut slots = Vec::with_capacity(new_faces.len());
    for face in new_faces {
        match free_blocks.pop() {
            Some(slot) => {
                faces[slot] = face;
                slots.push(slot);
            }
            None => {
                slots.push(faces.len());
                faces.push(face);
            }
        }
    }
    slots
}
