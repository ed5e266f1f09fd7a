//! Orbit camera around a Z-up scene.

use avoid_clip::BoundingBox;
use macroquad::prelude::*;

/// Orbit camera for 3D scene navigation.
pub struct OrbitCamera {
    pub distance: f32,
    /// Angle around +Z, in radians.
    pub yaw: f32,
    /// Elevation above the XY plane, in radians.
    pub pitch: f32,
    pub target: Vec3,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl OrbitCamera {
    pub fn new(distance: f32, yaw: f32, pitch: f32) -> Self {
        Self {
            distance,
            yaw,
            pitch,
            target: Vec3::ZERO,
            zoom_speed: 2.0,
            min_distance: 2.0,
            max_distance: 500.0,
        }
    }

    /// Centres the camera on `bounds` at a distance that shows all of it.
    pub fn framing(bounds: &BoundingBox) -> Self {
        let min = vec3(bounds.min.x as f32, bounds.min.y as f32, bounds.min.z as f32);
        let max = vec3(bounds.max.x as f32, bounds.max.y as f32, bounds.max.z as f32);
        let extent = (max - min).length().max(1.0);
        let mut camera = Self::new(extent * 1.2, 0.6, 0.7);
        camera.target = (min + max) * 0.5;
        camera.zoom_speed = extent * 0.05;
        camera.max_distance = extent * 4.0;
        camera
    }

    /// Updates from mouse drag, wheel and arrow keys.
    pub fn update(&mut self) {
        if is_mouse_button_down(MouseButton::Left) {
            let delta = mouse_delta_position();
            self.yaw += delta.x * 2.0;
            self.pitch -= delta.y * 2.0;
        }
        if is_key_down(KeyCode::Left) {
            self.yaw -= 0.02;
        }
        if is_key_down(KeyCode::Right) {
            self.yaw += 0.02;
        }
        if is_key_down(KeyCode::Up) {
            self.pitch += 0.02;
        }
        if is_key_down(KeyCode::Down) {
            self.pitch -= 0.02;
        }
        self.pitch = self.pitch.clamp(-1.5, 1.5);

        let scroll = mouse_wheel().1;
        self.distance = (self.distance - scroll * self.zoom_speed).clamp(self.min_distance, self.max_distance);
    }

    pub fn position(&self) -> Vec3 {
        let ground = self.distance * self.pitch.cos();
        self.target + vec3(ground * self.yaw.cos(), ground * self.yaw.sin(), self.distance * self.pitch.sin())
    }

    pub fn to_camera3d(&self) -> Camera3D {
        Camera3D {
            position: self.position(),
            up: vec3(0.0, 0.0, 1.0),
            target: self.target,
            ..Default::default()
        }
    }
}
