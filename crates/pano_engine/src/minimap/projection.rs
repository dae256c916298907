//! Flat overhead projection of one floor

use crate::core::config::MinimapConfig;
use crate::foundation::math::{heading_tip, Point2};
use crate::scene::Scene;

/// A scene marker on the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct MinimapPoint {
    /// Scene the marker stands for
    pub scene_id: String,
    /// Canvas position
    pub position: Point2,
    /// Marker radius
    pub radius: f32,
    /// Drawn in the accent color
    pub current: bool,
}

/// A straight line between two canvas points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapSegment {
    /// Start point
    pub from: Point2,
    /// End point
    pub to: Point2,
}

/// Everything a host needs to draw the minimap
#[derive(Debug, Clone, PartialEq)]
pub struct MinimapFrame {
    /// Canvas width
    pub width: f32,
    /// Canvas height
    pub height: f32,
    /// Floor being shown
    pub floor: i32,
    /// One line per same-floor hotspot, in scene then hotspot order
    pub edges: Vec<MinimapSegment>,
    /// One marker per scene on the floor, in registry order
    pub points: Vec<MinimapPoint>,
    /// Facing direction of the current scene, when a view exists
    pub heading: Option<MinimapSegment>,
}

impl MinimapFrame {
    /// Marker of the current scene
    pub fn current_point(&self) -> Option<&MinimapPoint> {
        self.points.iter().find(|point| point.current)
    }

    /// Marker of a scene by id
    pub fn point_for(&self, scene_id: &str) -> Option<&MinimapPoint> {
        self.points.iter().find(|point| point.scene_id == scene_id)
    }
}

/// Axis-aligned fit of floor positions into the drawable area
#[derive(Debug, Clone, Copy)]
struct Fit {
    min_x: f32,
    min_y: f32,
    scale: f32,
    margin: f32,
}

impl Fit {
    fn new(scenes: &[&Scene], config: &MinimapConfig) -> Self {
        let (mut min_x, mut min_y) = (f32::INFINITY, f32::INFINITY);
        let (mut max_x, mut max_y) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
        for scene in scenes {
            min_x = min_x.min(scene.position.x);
            max_x = max_x.max(scene.position.x);
            min_y = min_y.min(scene.position.y);
            max_y = max_y.max(scene.position.y);
        }

        // A single scene (or a line of scenes) has zero extent on an axis
        let range_x = if max_x - min_x > 0.0 { max_x - min_x } else { 1.0 };
        let range_y = if max_y - min_y > 0.0 { max_y - min_y } else { 1.0 };
        let drawable = config.drawable_size();

        Self {
            min_x,
            min_y,
            scale: (drawable / range_x).min(drawable / range_y),
            margin: config.margin,
        }
    }

    fn project(&self, scene: &Scene) -> Point2 {
        Point2::new(
            (scene.position.x - self.min_x) * self.scale + self.margin,
            (scene.position.y - self.min_y) * self.scale + self.margin,
        )
    }
}

/// Project the scenes of one floor onto the minimap canvas
///
/// `floor_scenes` are the scenes sharing the current scene's floor, in
/// registry order. `bearing` is the live camera yaw; without it no heading
/// segment is produced. Returns `None` when there is nothing to draw.
pub fn project(
    config: &MinimapConfig,
    floor_scenes: &[&Scene],
    current_id: Option<&str>,
    bearing: Option<f32>,
) -> Option<MinimapFrame> {
    let floor = floor_scenes.first()?.floor;
    let fit = Fit::new(floor_scenes, config);

    let mut edges = Vec::new();
    for scene in floor_scenes {
        let from = fit.project(scene);
        for hotspot in &scene.link_hotspots {
            if let Some(target) = floor_scenes.iter().find(|s| s.id == hotspot.target) {
                edges.push(MinimapSegment { from, to: fit.project(target) });
            }
        }
    }

    let points: Vec<MinimapPoint> = floor_scenes
        .iter()
        .map(|scene| {
            let current = current_id == Some(scene.id.as_str());
            MinimapPoint {
                scene_id: scene.id.clone(),
                position: fit.project(scene),
                radius: if current { config.current_point_radius } else { config.point_radius },
                current,
            }
        })
        .collect();

    let heading = points
        .iter()
        .find(|point| point.current)
        .zip(bearing)
        .map(|(point, yaw)| MinimapSegment {
            from: point.position,
            to: heading_tip(point.position, yaw, config.heading_length),
        });

    Some(MinimapFrame {
        width: config.canvas_size,
        height: config.canvas_size,
        floor,
        edges,
        points,
        heading,
    })
}
