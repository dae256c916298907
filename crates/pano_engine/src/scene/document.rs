//! Tour document format
//!
//! The on-disk shape of a tour, as produced by panorama stitching tools:
//!
//! ```json
//! { "scenes": [ { "id": "lobby", "name": "Lobby", "floor": 0,
//!                 "position": { "x": 0, "y": 0, "z": 0 },
//!                 "initialViewParameters": { "yaw": 0, "pitch": 0, "fov": 1.57 },
//!                 "linkHotspots": [ { "yaw": 1.2, "pitch": 0.1, "target": "hall", "distance": 4 } ] } ] }
//! ```
//!
//! These types only describe the document; [`SceneRegistry`](super::SceneRegistry)
//! validates them and builds the immutable scene graph.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{ConfigError, ConfigFormat};

/// Root of a tour document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TourDocument {
    /// Scenes in registry order
    #[serde(default)]
    pub scenes: Vec<SceneDocument>,
}

impl TourDocument {
    /// Parse a JSON tour document
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        ConfigFormat::Json.parse(text)
    }

    /// Read a tour document, choosing the format from the file extension
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        ConfigFormat::from_path(path)?.parse(&text)
    }
}

/// One panorama entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDocument {
    /// Unique scene id
    pub id: String,
    /// Display name
    pub name: String,
    /// Building level (0 = ground, negative = basement)
    pub floor: i32,
    /// Capture position in the shared world frame
    pub position: PositionDocument,
    /// View the scene opens with
    #[serde(default)]
    pub initial_view_parameters: Option<ViewDocument>,
    /// Navigation markers
    #[serde(default)]
    pub link_hotspots: Vec<HotspotDocument>,
    /// Per-scene resolution levels, overriding the engine defaults
    #[serde(default)]
    pub levels: Option<Vec<LevelDocument>>,
    /// Per-scene view-limiter resolution, overriding the engine default
    #[serde(default)]
    pub face_size: Option<u32>,
}

/// World position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionDocument {
    /// X
    pub x: f32,
    /// Y
    pub y: f32,
    /// Z
    #[serde(default)]
    pub z: f32,
}

/// Initial view parameters in radians
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewDocument {
    /// Horizontal angle
    #[serde(default)]
    pub yaw: f32,
    /// Vertical angle
    #[serde(default)]
    pub pitch: f32,
    /// Field of view
    pub fov: f32,
}

/// A link marker placed on the panorama sphere
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotDocument {
    /// Horizontal placement angle
    pub yaw: f32,
    /// Vertical placement angle
    pub pitch: f32,
    /// Id of the scene this marker leads to
    pub target: String,
    /// Walking distance hint in meters
    #[serde(default)]
    pub distance: Option<f32>,
}

/// One equirectangular resolution level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDocument {
    /// Image width in pixels
    pub width: u32,
}
