use std::sync::Arc;

use avoid_clip::{AvoidClipper, AvoidInfo, AvoidZone, ClipConfig, CrossSection, LogProgress, Projection2D};
use avoid_viz::{demo, draw_face, face_color, OrbitCamera, ZoneNavigator};
use macroquad::prelude::*;
use nalgebra::{Point3, Vector3};

const NUM_ZONES: usize = 12;
const WORLD_SIZE: f64 = 60.0;
const MIN_LENGTH: f64 = 8.0;
const MAX_LENGTH: f64 = 25.0;

/// Seeded linear congruential generator.
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((self.state >> 33) as f64) / (u32::MAX as f64 / 2.0)
    }

    fn range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }
}

/// Straight trenches of random heading and length scattered over the ground.
fn generate_trenches(seed: u64) -> AvoidInfo {
    let mut rng = Rng::new(seed);
    let avoid_zones = (0..NUM_ZONES)
        .map(|_| {
            let centre = Point3::new(
                (rng.next_f64() - 0.5) * WORLD_SIZE,
                (rng.next_f64() - 0.5) * WORLD_SIZE,
                0.0,
            );
            let heading = rng.range(0.1, std::f64::consts::PI - 0.1);
            let direction = Vector3::new(heading.cos(), heading.sin(), 0.0);
            let half = rng.range(MIN_LENGTH, MAX_LENGTH) * 0.5;
            let width = rng.range(0.5, 2.5);

            let section = CrossSection {
                name: "trench".into(),
                avoid_areas: vec![demo::box_area(width, -1.0, 1.0)],
                radius: width * 2.0,
                width: width * 2.0,
            };
            AvoidZone {
                origin: Vector3::zeros(),
                cross_section: Arc::new(section),
                projections: vec![
                    Projection2D::new(centre - direction * half, direction),
                    Projection2D::new(centre + direction * half, direction),
                ],
            }
        })
        .collect();

    AvoidInfo {
        origin: Vector3::zeros(),
        avoid_zones,
    }
}

#[macroquad::main("Avoid Zone Trenches")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .init();

    let info = generate_trenches(42);
    let mut faces = demo::ground(0, WORLD_SIZE, 20).faces;
    let faces_before = faces.len();

    let mut clipper = AvoidClipper::new(ClipConfig::default());
    let mut progress = LogProgress::new();
    let clipped = clipper
        .initialize_from_info(&info)
        .and_then(|()| clipper.clip_faces(&mut faces, &Vector3::zeros(), &mut progress));
    if let Err(err) = clipped {
        tracing::error!(%err, "failed to clip ground");
    }
    tracing::info!(faces_before, faces_after = faces.len(), "trenches cut");

    let mut camera = OrbitCamera::new(80.0, 0.6, 0.8);
    camera.max_distance = 250.0;
    let mut navigator = ZoneNavigator::new();
    let origin = Vector3::zeros();

    loop {
        camera.update();
        navigator.update(clipper.index());

        clear_background(Color::from_rgba(15, 15, 25, 255));
        set_camera(&camera.to_camera3d());

        for face in &faces {
            draw_face(face, &origin, face_color(face));
        }
        navigator.render(&clipper);

        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(8.0, 0.0, 0.0), RED);
        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(0.0, 8.0, 0.0), GREEN);
        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(0.0, 0.0, 8.0), BLUE);

        set_default_camera();

        draw_text(
            &format!("Trenches: {} zones | Faces: {} -> {}", clipper.zones().len(), faces_before, faces.len()),
            10.0,
            25.0,
            20.0,
            WHITE,
        );
        draw_text(
            &format!("Index depth: {}", clipper.index().depth()),
            10.0,
            45.0,
            18.0,
            GRAY,
        );

        navigator.draw_ui(clipper.index(), 70.0);

        draw_text("Drag mouse to rotate, scroll to zoom", 10.0, 155.0, 16.0, DARKGRAY);
        draw_text(&format!("FPS: {}", get_fps()), 10.0, 175.0, 16.0, DARKGRAY);

        next_frame().await
    }
}
