//! Shared drawing utilities for the avoid-zone viewers.
//!
//! Scene space is Z-up; cameras are set up with +Z as their up vector so
//! points map straight across.

use std::hash::{Hash, Hasher};

use avoid_clip::bsp::BspSegment;
use avoid_clip::{ClippingZone, Face, Scene};
use macroquad::models::{draw_mesh, Mesh, Vertex};
use macroquad::prelude::*;
use nalgebra::{Point3, Vector3};

pub mod camera;
pub mod demo;
pub mod navigator;

pub use camera::OrbitCamera;
pub use navigator::ZoneNavigator;

/// Converts a scene point, shifted by `offset`, to a render vertex position.
#[inline]
pub fn to_vec3(p: &Point3<f64>, offset: &Vector3<f64>) -> Vec3 {
    vec3((p.x + offset.x) as f32, (p.y + offset.y) as f32, (p.z + offset.z) as f32)
}

/// Deterministic color from a face's vertices, so split faces keep their
/// colors across frames.
pub fn face_color(face: &Face) -> Color {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    for v in &face.verts {
        v.x.to_bits().hash(&mut hasher);
        v.y.to_bits().hash(&mut hasher);
        v.z.to_bits().hash(&mut hasher);
    }
    let hash = hasher.finish();

    let r = (((hash >> 16) & 0xFF) as u8).max(40);
    let g = (((hash >> 8) & 0xFF) as u8).max(40);
    let b = ((hash & 0xFF) as u8).max(40);
    Color::from_rgba(r, g, b, 255)
}

/// Draws a face as a triangle fan in world space.
pub fn draw_face(face: &Face, offset: &Vector3<f64>, color: Color) {
    let verts = &face.verts;
    if verts.len() < 3 {
        return;
    }

    let vertices: Vec<Vertex> = verts
        .iter()
        .map(|p| Vertex::new2(to_vec3(p, offset), vec2(0.0, 0.0), color))
        .collect();

    let mut indices: Vec<u16> = Vec::with_capacity((verts.len() - 2) * 3);
    for i in 1..verts.len() - 1 {
        indices.extend([0, i as u16, (i + 1) as u16]);
    }

    draw_mesh(&Mesh {
        vertices,
        indices,
        texture: None,
    });
}

/// Draws every face of a scene that survived clipping.
pub fn draw_scene(scene: &Scene) {
    for face in scene.live_faces() {
        draw_face(face, &scene.translation, face_color(face));
    }
}

/// Draws a zone's face outlines. Zone geometry is relative to `origin`.
pub fn draw_zone(zone: &ClippingZone, origin: &Vector3<f64>, color: Color) {
    for plane in zone.planes() {
        for (a, b) in plane.boundary().edges() {
            draw_line_3d(to_vec3(a, origin), to_vec3(b, origin), color);
        }
    }
}

/// Draws a capsule as its axis with a wire sphere at each end.
pub fn draw_capsule(segment: &BspSegment, origin: &Vector3<f64>, color: Color) {
    let (start, end) = (to_vec3(&segment.start, origin), to_vec3(&segment.end, origin));
    let radius = segment.c_radius as f32;
    draw_line_3d(start, end, color);
    draw_sphere_wires(start, radius, None, color);
    draw_sphere_wires(end, radius, None, color);
}
