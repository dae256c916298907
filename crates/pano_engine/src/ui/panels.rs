//! Floor selector, location panel and hotspot marker view models

use std::fmt;

use crate::navigation::OverlayManager;
use crate::scene::{Scene, SceneRegistry};

/// Display name of a floor
///
/// ```
/// use pano_engine::ui::floor_label;
///
/// assert_eq!(floor_label(0), "Ground");
/// assert_eq!(floor_label(2), "Level 2");
/// assert_eq!(floor_label(-1), "Basement 1");
/// ```
pub fn floor_label(floor: i32) -> String {
    match floor {
        0 => "Ground".to_string(),
        f if f > 0 => format!("Level {f}"),
        f => format!("Basement {}", f.unsigned_abs()),
    }
}

/// One button of the floor selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloorButton {
    /// Floor number
    pub floor: i32,
    /// Button caption
    pub label: String,
    /// Panoramas on this floor (button tooltip)
    pub scene_count: usize,
    /// The current scene is on this floor
    pub active: bool,
}

/// Floor selector buttons in ascending floor order
pub fn floor_buttons(registry: &SceneRegistry, current_floor: Option<i32>) -> Vec<FloorButton> {
    registry
        .distinct_floors()
        .into_iter()
        .map(|floor| FloorButton {
            floor,
            label: floor_label(floor),
            scene_count: registry.scenes_on_floor(floor).len(),
            active: current_floor == Some(floor),
        })
        .collect()
}

/// Summary of the visible scene
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPanel {
    /// Scene name
    pub name: String,
    /// Floor caption
    pub floor_label: String,
    /// Overhead position `(x, y)`
    pub position: (f32, f32),
    /// Outgoing links
    pub connections: usize,
}

impl LocationPanel {
    /// Build the panel for a scene
    pub fn for_scene(scene: &Scene) -> Self {
        Self {
            name: scene.name.clone(),
            floor_label: floor_label(scene.floor),
            position: (scene.position.x, scene.position.y),
            connections: scene.link_hotspots.len(),
        }
    }

    /// Position with one decimal, e.g. `(2.5, -1.0)`
    pub fn position_text(&self) -> String {
        format!("({:.1}, {:.1})", self.position.0, self.position.1)
    }
}

impl fmt::Display for LocationPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | {} paths",
            self.name,
            self.floor_label,
            self.position_text(),
            self.connections
        )
    }
}

/// A clickable direction marker of the visible scene
#[derive(Debug, Clone, PartialEq)]
pub struct HotspotMarker {
    /// Index to pass to `click_hotspot`
    pub index: usize,
    /// Target scene id
    pub target: String,
    /// Target scene name
    pub target_name: String,
    /// Distance caption, e.g. `"4m"`
    pub distance_label: Option<String>,
    /// Whether markers are currently shown
    pub visible: bool,
}

/// Markers for the overlay set of the visible scene
pub fn hotspot_markers(registry: &SceneRegistry, overlays: &OverlayManager, visible: bool) -> Vec<HotspotMarker> {
    overlays
        .overlays()
        .iter()
        .enumerate()
        .map(|(index, overlay)| HotspotMarker {
            index,
            target: overlay.target.clone(),
            target_name: registry
                .by_id(&overlay.target)
                .map_or_else(|| overlay.target.clone(), |scene| scene.name.clone()),
            distance_label: overlay.distance_label.clone(),
            visible,
        })
        .collect()
}
