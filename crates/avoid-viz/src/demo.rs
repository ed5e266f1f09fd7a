//! A small road crossing used by the viewers.

use std::sync::Arc;

use avoid_clip::{AvoidArea, CrossSection, Face, Feature, Projection2D, Scene, SceneData};
use nalgebra::{Point2, Point3, Vector3};

/// Height of the ground grid below the road surfaces.
pub const GROUND_LEVEL: f64 = -0.1;

/// A rectangular avoid area in cross-section coordinates: lateral offset
/// `-half_width..half_width`, height `bottom..top`.
pub fn box_area(half_width: f64, bottom: f64, top: f64) -> AvoidArea {
    AvoidArea::new(vec![
        Point2::new(-half_width, bottom),
        Point2::new(half_width, bottom),
        Point2::new(half_width, top),
        Point2::new(-half_width, top),
    ])
}

/// Sweeps a flat strip of `half_width` along `path`.
///
/// Each path segment yields two faces and one section. Frames face along the
/// path, averaging the neighbouring segments at interior points.
pub fn road(
    id: usize,
    name: &str,
    path: Vec<Point3<f64>>,
    half_width: f64,
    avoid_areas: Vec<AvoidArea>,
    priority: i32,
) -> Scene {
    let n = path.len();
    let directions: Vec<Vector3<f64>> = (0..n)
        .map(|i| {
            let (a, b) = (i.saturating_sub(1), (i + 1).min(n - 1));
            (path[b] - path[a]).try_normalize(f64::EPSILON).unwrap_or_else(Vector3::x)
        })
        .collect();
    let projections = path
        .iter()
        .zip(&directions)
        .map(|(p, d)| Projection2D::new(*p, *d))
        .collect();

    let mut scene = Scene::new(id, name);
    for (i, pair) in path.windows(2).enumerate() {
        let [left0, right0] = edge_points(&pair[0], &directions[i], half_width);
        let [left1, right1] = edge_points(&pair[1], &directions[i + 1], half_width);
        let base = scene.faces.len();
        scene.faces.push(Face::triangle(left0, right0, right1));
        scene.faces.push(Face::triangle(left0, right1, left1));
        for face in &mut scene.faces[base..] {
            face.group_name = name.to_string();
        }
        scene.section_face_indices.push(vec![base, base + 1]);
    }

    let section = CrossSection {
        name: format!("{name} section"),
        avoid_areas,
        radius: half_width * 2.0,
        width: half_width * 2.0,
    };
    let feature = Feature::default().with_attribute("priority", priority.to_string());
    scene.data = Some(SceneData::new(Arc::new(section), projections).with_feature(feature));
    scene.path = path;
    scene
}

fn edge_points(p: &Point3<f64>, direction: &Vector3<f64>, half_width: f64) -> [Point3<f64>; 2] {
    let lateral = Vector3::z().cross(direction) * half_width;
    [p + lateral, p - lateral]
}

/// A square grid of `cells` x `cells` cells centred on the origin.
pub fn ground(id: usize, size: f64, cells: usize) -> Scene {
    let mut scene = Scene::new(id, "ground");
    let step = size / cells as f64;
    let start = -size * 0.5;
    let corner = |i: usize, j: usize| Point3::new(start + i as f64 * step, start + j as f64 * step, GROUND_LEVEL);
    for i in 0..cells {
        for j in 0..cells {
            scene.faces.push(Face::triangle(corner(i, j), corner(i + 1, j), corner(i + 1, j + 1)));
            scene.faces.push(Face::triangle(corner(i, j), corner(i + 1, j + 1), corner(i, j + 1)));
        }
    }
    scene
}

/// A main road along X crossing a side road along Y, plus the ground.
///
/// The main road's zone rises above its surface and cuts the side road. The
/// side road's zone stays below its surface so it only cuts the ground.
pub fn crossing() -> (Vec<Scene>, Scene) {
    let xs = [-20.0, -10.0, 0.0, 10.0, 20.0];
    let main = road(
        0,
        "main road",
        xs.iter().map(|&x| Point3::new(x, 0.0, 0.0)).collect(),
        3.0,
        vec![box_area(3.5, -0.5, 2.0)],
        1,
    );
    let side = road(
        1,
        "side road",
        xs.iter().map(|&y| Point3::new(0.0, y, 0.0)).collect(),
        2.0,
        vec![box_area(2.0, -0.5, -0.05)],
        0,
    );
    (vec![main, side], ground(2, 40.0, 8))
}
