//! Interactive walk through the zone BSP.

use avoid_clip::bsp::{Axis, BspNode, BspTree, NodeId};
use avoid_clip::AvoidClipper;
use macroquad::prelude::*;

use crate::{draw_capsule, draw_zone};

/// Child taken at each step of the navigation path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Below the split value.
    Left,
    /// Above the split value.
    Right,
}

/// Navigator over the nodes of a clipper's zone index.
#[derive(Debug, Default)]
pub struct ZoneNavigator {
    path: Vec<Direction>,
}

impl ZoneNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> &[Direction] {
        &self.path
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Id of the node at the end of the path, if the path is still valid.
    pub fn current_id(&self, tree: &BspTree) -> Option<NodeId> {
        let mut id = tree.root();
        tree.node(id)?;
        for dir in &self.path {
            let [left, right] = tree.node(id)?.children()?;
            id = match dir {
                Direction::Left => left,
                Direction::Right => right,
            };
        }
        Some(id)
    }

    pub fn current_node<'a>(&self, tree: &'a BspTree) -> Option<&'a BspNode> {
        self.current_id(tree).and_then(|id| tree.node(id))
    }

    fn step(&mut self, tree: &BspTree, dir: Direction) -> bool {
        let has_children = self
            .current_node(tree)
            .is_some_and(|node| node.children().is_some());
        if has_children {
            self.path.push(dir);
        }
        has_children
    }

    pub fn go_left(&mut self, tree: &BspTree) -> bool {
        self.step(tree, Direction::Left)
    }

    pub fn go_right(&mut self, tree: &BspTree) -> bool {
        self.step(tree, Direction::Right)
    }

    pub fn go_parent(&mut self) -> bool {
        self.path.pop().is_some()
    }

    pub fn go_root(&mut self) {
        self.path.clear();
    }

    /// Handles navigation keys. Returns true if the current node changed.
    pub fn update(&mut self, tree: &BspTree) -> bool {
        let mut changed = false;
        if is_key_pressed(KeyCode::L) {
            changed = self.go_left(tree);
        }
        if is_key_pressed(KeyCode::R) {
            changed = self.go_right(tree);
        }
        if is_key_pressed(KeyCode::P) {
            changed = self.go_parent();
        }
        if is_key_pressed(KeyCode::T) && !self.path.is_empty() {
            self.go_root();
            changed = true;
        }
        changed
    }

    /// Zone indices stored below the current node, excluding the node itself.
    fn subtree_zones(&self, tree: &BspTree) -> Vec<usize> {
        let mut zones = Vec::new();
        let mut stack: Vec<NodeId> = self
            .current_node(tree)
            .and_then(BspNode::children)
            .map(Vec::from)
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            let Some(node) = tree.node(id) else {
                continue;
            };
            zones.extend(node.data().iter().filter_map(|&s| tree.segment(s)?.zone));
            if let Some(children) = node.children() {
                stack.extend(children);
            }
        }
        zones
    }

    /// Outlines the zones held by the current node and shows the capsules of
    /// those further down.
    pub fn render(&self, clipper: &AvoidClipper) {
        let tree = clipper.index();
        let origin = clipper.origin();
        let Some(node) = self.current_node(tree) else {
            return;
        };

        for &zone in &self.subtree_zones(tree) {
            if let Some(segment) = clipper.zones().get(zone).map(|z| z.segment()) {
                draw_capsule(segment, origin, DARKGRAY);
            }
        }
        for segment in node.data().iter().filter_map(|&s| tree.segment(s)) {
            draw_capsule(segment, origin, ORANGE);
            if let Some(zone) = segment.zone.and_then(|z| clipper.zones().get(z)) {
                draw_zone(zone, origin, YELLOW);
            }
        }
    }

    /// Draws the navigation overlay.
    pub fn draw_ui(&self, tree: &BspTree, y_offset: f32) {
        let (held, split, is_leaf) = match self.current_node(tree) {
            Some(node) => {
                let split = node.axis().map(|axis| {
                    let name = match axis {
                        Axis::X => "X",
                        Axis::Y => "Y",
                        Axis::Z => "Z",
                    };
                    format!("{name} = {:.2}", node.value())
                });
                (node.data().len(), split, node.is_leaf())
            }
            None => (0, None, true),
        };

        let path_str = if self.path.is_empty() {
            "root".to_string()
        } else {
            self.path
                .iter()
                .map(|d| match d {
                    Direction::Left => "L",
                    Direction::Right => "R",
                })
                .collect::<Vec<_>>()
                .join(" -> ")
        };

        draw_text(&format!("Node: {held} zones"), 10.0, y_offset, 18.0, WHITE);
        draw_text(
            &format!("Path: {} (depth {})", path_str, self.path.len()),
            10.0,
            y_offset + 20.0,
            18.0,
            YELLOW,
        );
        let split_str = split.unwrap_or_else(|| "(leaf)".to_string());
        draw_text(
            &format!("Split: {split_str}"),
            10.0,
            y_offset + 40.0,
            18.0,
            if is_leaf { ORANGE } else { GREEN },
        );
        draw_text(
            "[L]eft | [R]ight | [P]arent | [T]op",
            10.0,
            y_offset + 60.0,
            16.0,
            DARKGRAY,
        );
    }
}
