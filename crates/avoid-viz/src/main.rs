use avoid_clip::{AvoidClipper, BoundingBox, ClipConfig, LogProgress, Scene};
use avoid_viz::{demo, draw_scene, OrbitCamera, ZoneNavigator};
use macroquad::prelude::*;

fn scene_bounds(scenes: &[&Scene]) -> BoundingBox {
    let points: Vec<_> = scenes
        .iter()
        .flat_map(|scene| scene.live_faces().flat_map(|face| face.verts.iter().map(|p| p + scene.translation)))
        .collect();
    BoundingBox::from_points(&points)
}

#[macroquad::main("Avoid Zone Clipping")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info,avoid_clip=debug".into()))
        .init();

    let (mut roads, mut ground) = demo::crossing();
    let faces_before: usize = roads.iter().map(|s| s.faces.len()).sum::<usize>() + ground.faces.len();

    let config = ClipConfig::default().with_cap_exposed_faces(true);
    let mut clipper = AvoidClipper::new(config);
    let mut progress = LogProgress::new();
    if let Err(err) = clipper.clip_scenes(&mut roads, &mut progress) {
        tracing::error!(%err, "failed to clip roads");
    }
    if let Err(err) = clipper.clip_scene_by_bsp(&mut ground, &mut progress) {
        tracing::error!(%err, "failed to clip ground");
    }

    let faces_after: usize = roads
        .iter()
        .chain(std::iter::once(&ground))
        .map(|s| s.live_faces().count())
        .sum();
    tracing::info!(
        zones = clipper.zones().len(),
        faces_before,
        faces_after,
        "demo crossing clipped"
    );

    let all: Vec<&Scene> = roads.iter().chain(std::iter::once(&ground)).collect();
    let mut camera = OrbitCamera::framing(&scene_bounds(&all));
    let mut navigator = ZoneNavigator::new();
    let mut show_zones = true;

    loop {
        camera.update();
        navigator.update(clipper.index());
        if is_key_pressed(KeyCode::Z) {
            show_zones = !show_zones;
        }

        clear_background(Color::from_rgba(20, 20, 30, 255));
        set_camera(&camera.to_camera3d());

        for scene in &all {
            draw_scene(scene);
        }
        if show_zones {
            navigator.render(&clipper);
        }

        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(5.0, 0.0, 0.0), RED);
        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(0.0, 5.0, 0.0), GREEN);
        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(0.0, 0.0, 5.0), BLUE);

        set_default_camera();

        draw_text(
            &format!("Avoid zones: {} | Faces: {} -> {}", clipper.zones().len(), faces_before, faces_after),
            10.0,
            25.0,
            20.0,
            WHITE,
        );
        draw_text(
            &format!(
                "Index: {} nodes, depth {}",
                clipper.index().node_count(),
                clipper.index().depth()
            ),
            10.0,
            45.0,
            18.0,
            GRAY,
        );

        navigator.draw_ui(clipper.index(), 70.0);

        draw_text("Drag mouse to rotate, scroll to zoom, [Z] toggles zones", 10.0, 155.0, 16.0, DARKGRAY);
        draw_text(&format!("FPS: {}", get_fps()), 10.0, 175.0, 16.0, DARKGRAY);

        next_frame().await
    }
}
