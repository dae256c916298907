//! Scene Registry - the immutable scene graph of a tour
//!
//! Built once from a [`TourDocument`] at startup and never mutated after.
//! Every other subsystem reads scenes through it; it is the source of truth
//! for which scenes exist.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;

use super::document::{SceneDocument, TourDocument};
use crate::config::ConfigError;
use crate::foundation::math::Vec3;

/// View parameters in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewParameters {
    /// Horizontal angle
    pub yaw: f32,
    /// Vertical angle
    pub pitch: f32,
    /// Field of view
    pub fov: f32,
}

impl Default for ViewParameters {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            fov: std::f32::consts::FRAC_PI_2,
        }
    }
}

/// A navigation marker owned by a scene
#[derive(Debug, Clone, PartialEq)]
pub struct LinkHotspot {
    /// Horizontal placement angle on the panorama sphere
    pub yaw: f32,
    /// Vertical placement angle on the panorama sphere
    pub pitch: f32,
    /// Id of the scene this marker leads to (always resolves)
    pub target: String,
    /// Walking distance hint in meters
    pub distance: Option<f32>,
}

/// Per-scene overrides of the renderer geometry defaults
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeometryOverride {
    /// Resolution level widths, lowest first
    pub levels: Option<Vec<u32>>,
    /// View-limiter resolution
    pub face_size: Option<u32>,
}

/// One navigable panoramic viewpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Unique id
    pub id: String,
    /// Display name
    pub name: String,
    /// Building level
    pub floor: i32,
    /// Capture position in the shared world frame
    pub position: Vec3,
    /// View the scene opens with
    pub initial_view: ViewParameters,
    /// Outgoing links, in document order
    pub link_hotspots: Vec<LinkHotspot>,
    /// Renderer geometry overrides
    pub geometry: GeometryOverride,
}

impl Scene {
    /// Ids of directly linked scenes, in hotspot order, without repeats
    pub fn neighbor_ids(&self) -> Vec<&str> {
        let mut neighbors: Vec<&str> = Vec::with_capacity(self.link_hotspots.len());
        for hotspot in &self.link_hotspots {
            if !neighbors.contains(&hotspot.target.as_str()) {
                neighbors.push(&hotspot.target);
            }
        }
        neighbors
    }
}

/// A hotspot whose target is not in the registry
///
/// Dangling links are dropped at load time; the registry keeps a record of
/// each one so tools can report them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    /// Scene that owned the hotspot
    pub scene: String,
    /// Unknown target id
    pub target: String,
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scene '{}' links to unknown scene '{}'", self.scene, self.target)
    }
}

/// Immutable registry of all scenes in a tour
#[derive(Debug, Clone)]
pub struct SceneRegistry {
    scenes: Vec<Scene>,
    index: HashMap<String, usize>,
    dangling: Vec<DanglingReference>,
}

impl SceneRegistry {
    /// Validate a tour document and build the registry
    ///
    /// Fails when the document has no scenes, a scene id repeats, or a
    /// scene's geometry override is unusable. Hotspots pointing at unknown
    /// scenes are dropped with a warning.
    pub fn load(document: TourDocument) -> Result<Self, ConfigError> {
        if document.scenes.is_empty() {
            return Err(ConfigError::Empty);
        }

        let mut index = HashMap::with_capacity(document.scenes.len());
        for (position, scene) in document.scenes.iter().enumerate() {
            if scene.id.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "scene #{} ('{}') has an empty id",
                    position + 1,
                    scene.name
                )));
            }
            if index.insert(scene.id.clone(), position).is_some() {
                return Err(ConfigError::DuplicateScene(scene.id.clone()));
            }
        }

        let mut dangling = Vec::new();
        let mut scenes = Vec::with_capacity(document.scenes.len());
        for scene in document.scenes {
            scenes.push(Self::build_scene(scene, &index, &mut dangling)?);
        }

        for reference in &dangling {
            log::warn!("Dropping hotspot: {}", reference);
        }
        log::info!(
            "Loaded tour with {} scenes on {} floors ({} dangling links dropped)",
            scenes.len(),
            scenes.iter().map(|s| s.floor).collect::<BTreeSet<_>>().len(),
            dangling.len()
        );

        Ok(Self { scenes, index, dangling })
    }

    /// Parse and load a JSON tour document
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Self::load(TourDocument::from_json_str(text)?)
    }

    /// Read and load a tour document from disk
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load(TourDocument::load_from_file(path)?)
    }

    fn build_scene(
        scene: SceneDocument,
        index: &HashMap<String, usize>,
        dangling: &mut Vec<DanglingReference>,
    ) -> Result<Scene, ConfigError> {
        let levels = scene
            .levels
            .map(|levels| levels.into_iter().map(|level| level.width).collect::<Vec<_>>());
        if let Some(levels) = &levels {
            if levels.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "scene '{}' declares an empty \"levels\" list",
                    scene.id
                )));
            }
        }

        let mut link_hotspots = Vec::with_capacity(scene.link_hotspots.len());
        for hotspot in scene.link_hotspots {
            if index.contains_key(&hotspot.target) {
                link_hotspots.push(LinkHotspot {
                    yaw: hotspot.yaw,
                    pitch: hotspot.pitch,
                    target: hotspot.target,
                    distance: hotspot.distance,
                });
            } else {
                dangling.push(DanglingReference {
                    scene: scene.id.clone(),
                    target: hotspot.target,
                });
            }
        }

        let initial_view = scene
            .initial_view_parameters
            .map(|view| ViewParameters { yaw: view.yaw, pitch: view.pitch, fov: view.fov })
            .unwrap_or_default();

        Ok(Scene {
            id: scene.id,
            name: scene.name,
            floor: scene.floor,
            position: Vec3::new(scene.position.x, scene.position.y, scene.position.z),
            initial_view,
            link_hotspots,
            geometry: GeometryOverride { levels, face_size: scene.face_size },
        })
    }

    /// All scenes in registry order
    pub fn all_scenes(&self) -> &[Scene] {
        &self.scenes
    }

    /// Look up a scene by id
    pub fn by_id(&self, id: &str) -> Option<&Scene> {
        self.index.get(id).map(|&position| &self.scenes[position])
    }

    /// Registry position of a scene
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Whether a scene id exists
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Scenes on a floor, in registry order
    pub fn scenes_on_floor(&self, floor: i32) -> Vec<&Scene> {
        self.scenes.iter().filter(|scene| scene.floor == floor).collect()
    }

    /// Unique floor values in ascending order
    pub fn distinct_floors(&self) -> Vec<i32> {
        self.scenes
            .iter()
            .map(|scene| scene.floor)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// First scene in registry order (the tour entry point)
    pub fn first_scene(&self) -> Option<&Scene> {
        self.scenes.first()
    }

    /// Hotspots dropped at load time
    pub fn dangling_references(&self) -> &[DanglingReference] {
        &self.dangling
    }

    /// Number of scenes
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Whether the registry is empty (never true for a loaded registry)
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOUR: &str = r#"{
        "scenes": [
            { "id": "lobby", "name": "Lobby", "floor": 0, "position": { "x": 0, "y": 0, "z": 0 },
              "linkHotspots": [
                  { "yaw": 0.0, "pitch": 0.0, "target": "hall", "distance": 5 },
                  { "yaw": 1.0, "pitch": 0.0, "target": "ghost" },
                  { "yaw": 2.0, "pitch": 0.0, "target": "hall" }
              ] },
            { "id": "hall", "name": "Hall", "floor": 0, "position": { "x": 10, "y": 0, "z": 0 } },
            { "id": "office", "name": "Office", "floor": 2, "position": { "x": 0, "y": 5, "z": 6 } },
            { "id": "cellar", "name": "Cellar", "floor": -1, "position": { "x": 3, "y": 3, "z": -3 } }
        ]
    }"#;

    #[test]
    fn test_load_and_lookup() {
        let registry = SceneRegistry::from_json_str(TOUR).unwrap();

        assert_eq!(registry.len(), 4);
        assert_eq!(registry.by_id("hall").unwrap().name, "Hall");
        assert!(registry.by_id("ghost").is_none());
        assert_eq!(registry.position_of("office"), Some(2));
        assert_eq!(registry.first_scene().unwrap().id, "lobby");
    }

    #[test]
    fn test_dangling_hotspot_is_dropped() {
        let registry = SceneRegistry::from_json_str(TOUR).unwrap();
        let lobby = registry.by_id("lobby").unwrap();

        assert_eq!(lobby.link_hotspots.len(), 2);
        assert!(lobby.link_hotspots.iter().all(|h| h.target == "hall"));
        assert_eq!(
            registry.dangling_references(),
            &[DanglingReference { scene: "lobby".to_string(), target: "ghost".to_string() }]
        );
    }

    #[test]
    fn test_neighbor_ids_deduplicate() {
        let registry = SceneRegistry::from_json_str(TOUR).unwrap();
        assert_eq!(registry.by_id("lobby").unwrap().neighbor_ids(), vec!["hall"]);
    }

    #[test]
    fn test_floors() {
        let registry = SceneRegistry::from_json_str(TOUR).unwrap();

        assert_eq!(registry.distinct_floors(), vec![-1, 0, 2]);
        let ground: Vec<&str> = registry.scenes_on_floor(0).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ground, vec!["lobby", "hall"]);
        assert!(registry.scenes_on_floor(7).is_empty());
    }

    #[test]
    fn test_default_view_parameters() {
        let registry = SceneRegistry::from_json_str(TOUR).unwrap();
        assert_eq!(registry.by_id("hall").unwrap().initial_view, ViewParameters::default());
    }

    #[test]
    fn test_empty_document_is_rejected() {
        let result = SceneRegistry::from_json_str(r#"{ "scenes": [] }"#);
        assert!(matches!(result, Err(ConfigError::Empty)));
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let text = r#"{ "scenes": [
            { "id": "a", "name": "A", "floor": 0, "position": { "x": 0, "y": 0 } },
            { "id": "a", "name": "A again", "floor": 1, "position": { "x": 0, "y": 0 } }
        ] }"#;
        let result = SceneRegistry::from_json_str(text);
        assert!(matches!(result, Err(ConfigError::DuplicateScene(id)) if id == "a"));
    }

    #[test]
    fn test_empty_levels_override_is_rejected() {
        let text = r#"{ "scenes": [
            { "id": "a", "name": "A", "floor": 0, "position": { "x": 0, "y": 0 }, "levels": [] }
        ] }"#;
        assert!(matches!(SceneRegistry::from_json_str(text), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_dangling_reference_display() {
        let reference = DanglingReference { scene: "a".to_string(), target: "b".to_string() };
        assert_eq!(reference.to_string(), "scene 'a' links to unknown scene 'b'");
    }
}
