//! Hotspot overlay bookkeeping
//!
//! Overlay elements belong to one scene activation. They are created from
//! the scene's link hotspots when it becomes visible and torn down before
//! the next scene gets its own set; at most one set exists at a time.

use crate::render::{HotspotPlacement, OverlayHandle, RenderError, SceneHandle, SceneRenderer};
use crate::scene::Scene;

/// One clickable marker in the hotspot container
#[derive(Debug, Clone, PartialEq)]
pub struct HotspotOverlay {
    /// Scene the marker navigates to
    pub target: String,
    /// Position on the panoramic sphere
    pub placement: HotspotPlacement,
    /// Distance hint shown next to the marker, e.g. `"4m"`
    pub distance_label: Option<String>,
    handle: OverlayHandle,
}

impl HotspotOverlay {
    /// Renderer element backing this marker
    pub fn handle(&self) -> OverlayHandle {
        self.handle
    }
}

/// Overlay elements created for one activated scene
#[derive(Debug, Clone)]
struct HotspotOverlaySet {
    scene_id: String,
    scene: SceneHandle,
    overlays: Vec<HotspotOverlay>,
}

/// Owns the overlay set of the visible scene
#[derive(Debug, Default)]
pub struct OverlayManager {
    current: Option<HotspotOverlaySet>,
    sets_built: u64,
}

impl OverlayManager {
    /// Create a manager with no overlays
    pub fn new() -> Self {
        Self::default()
    }

    /// Create overlay elements for every link hotspot of `scene`
    ///
    /// Any existing set is torn down first, so calling this twice for the
    /// same scene never doubles the markers. If the renderer rejects an
    /// element, the partial set is removed and the error returned.
    pub fn build(
        &mut self,
        renderer: &mut dyn SceneRenderer,
        handle: SceneHandle,
        scene: &Scene,
    ) -> Result<usize, RenderError> {
        self.clear(renderer);

        let mut overlays = Vec::with_capacity(scene.link_hotspots.len());
        for hotspot in &scene.link_hotspots {
            let placement = HotspotPlacement { yaw: hotspot.yaw, pitch: hotspot.pitch };
            match renderer.create_overlay_element(handle, placement) {
                Ok(element) => overlays.push(HotspotOverlay {
                    target: hotspot.target.clone(),
                    placement,
                    distance_label: distance_label(hotspot.distance),
                    handle: element,
                }),
                Err(err) => {
                    for overlay in overlays {
                        renderer.destroy_overlay_element(handle, overlay.handle);
                    }
                    return Err(err);
                }
            }
        }

        let count = overlays.len();
        self.current = Some(HotspotOverlaySet {
            scene_id: scene.id.clone(),
            scene: handle,
            overlays,
        });
        self.sets_built += 1;
        log::debug!("Created {} hotspot overlays for '{}'", count, scene.id);
        Ok(count)
    }

    /// Destroy every overlay element of the current set
    pub fn clear(&mut self, renderer: &mut dyn SceneRenderer) {
        if let Some(set) = self.current.take() {
            for overlay in &set.overlays {
                renderer.destroy_overlay_element(set.scene, overlay.handle);
            }
            log::debug!("Removed {} hotspot overlays from '{}'", set.overlays.len(), set.scene_id);
        }
    }

    /// Scene the current set belongs to
    pub fn scene_id(&self) -> Option<&str> {
        self.current.as_ref().map(|set| set.scene_id.as_str())
    }

    /// Markers of the current set, in hotspot order
    pub fn overlays(&self) -> &[HotspotOverlay] {
        self.current
            .as_ref()
            .map(|set| set.overlays.as_slice())
            .unwrap_or_default()
    }

    /// Target of the marker at `index`
    pub fn target_at(&self, index: usize) -> Option<&str> {
        self.overlays().get(index).map(|overlay| overlay.target.as_str())
    }

    /// Number of markers in the current set
    pub fn len(&self) -> usize {
        self.overlays().len()
    }

    /// Whether no markers exist
    pub fn is_empty(&self) -> bool {
        self.overlays().is_empty()
    }

    /// Overlay sets built since startup
    pub fn sets_built(&self) -> u64 {
        self.sets_built
    }
}

/// Marker caption for an optional distance in meters
pub fn distance_label(distance: Option<f32>) -> Option<String> {
    distance.map(|d| format!("{d}m"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{HeadlessRenderer, LoadPoll};
    use crate::core::config::GeometryConfig;
    use crate::render::SceneRequest;
    use crate::scene::SceneRegistry;

    const TOUR: &str = r#"{ "scenes": [
        { "id": "hall", "name": "Hall", "floor": 0, "position": { "x": 0, "y": 0 },
          "linkHotspots": [
              { "yaw": 0.5, "pitch": 0.1, "target": "office", "distance": 4 },
              { "yaw": -1.0, "pitch": 0.0, "target": "stairs" } ] },
        { "id": "office", "name": "Office", "floor": 0, "position": { "x": 4, "y": 0 } },
        { "id": "stairs", "name": "Stairs", "floor": 0, "position": { "x": 0, "y": 3 } }
    ] }"#;

    fn materialize(renderer: &mut HeadlessRenderer, scene: &Scene) -> SceneHandle {
        let request = SceneRequest::for_scene(scene, &GeometryConfig::default());
        let ticket = renderer.create_scene(&request).unwrap();
        match renderer.poll_scene(ticket) {
            LoadPoll::Ready(handle) => handle,
            other => panic!("unexpected poll result {other:?}"),
        }
    }

    #[test]
    fn test_build_creates_one_marker_per_hotspot() {
        let registry = SceneRegistry::from_json_str(TOUR).unwrap();
        let hall = registry.by_id("hall").unwrap();
        let mut renderer = HeadlessRenderer::new();
        let handle = materialize(&mut renderer, hall);
        let mut overlays = OverlayManager::new();

        assert_eq!(overlays.build(&mut renderer, handle, hall).unwrap(), 2);
        assert_eq!(renderer.overlay_count(handle), 2);
        assert_eq!(overlays.scene_id(), Some("hall"));
        assert_eq!(overlays.target_at(1), Some("stairs"));
        assert_eq!(overlays.overlays()[0].distance_label.as_deref(), Some("4m"));
        assert_eq!(overlays.overlays()[1].distance_label, None);
    }

    #[test]
    fn test_rebuild_does_not_double_markers() {
        let registry = SceneRegistry::from_json_str(TOUR).unwrap();
        let hall = registry.by_id("hall").unwrap();
        let mut renderer = HeadlessRenderer::new();
        let handle = materialize(&mut renderer, hall);
        let mut overlays = OverlayManager::new();

        overlays.build(&mut renderer, handle, hall).unwrap();
        overlays.build(&mut renderer, handle, hall).unwrap();
        assert_eq!(renderer.overlay_count(handle), 2);
        assert_eq!(overlays.sets_built(), 2);
    }

    #[test]
    fn test_switching_scenes_leaves_one_set() {
        let registry = SceneRegistry::from_json_str(TOUR).unwrap();
        let (hall, office) = (registry.by_id("hall").unwrap(), registry.by_id("office").unwrap());
        let mut renderer = HeadlessRenderer::new();
        let hall_handle = materialize(&mut renderer, hall);
        let office_handle = materialize(&mut renderer, office);
        let mut overlays = OverlayManager::new();

        overlays.build(&mut renderer, hall_handle, hall).unwrap();
        overlays.build(&mut renderer, office_handle, office).unwrap();

        assert_eq!(renderer.overlay_count(hall_handle), 0);
        assert_eq!(renderer.total_overlay_count(), 0);
        assert_eq!(overlays.scene_id(), Some("office"));
        assert!(overlays.is_empty());
    }

    #[test]
    fn test_build_on_stale_scene_fails_cleanly() {
        let registry = SceneRegistry::from_json_str(TOUR).unwrap();
        let hall = registry.by_id("hall").unwrap();
        let mut renderer = HeadlessRenderer::new();
        let handle = materialize(&mut renderer, hall);
        renderer.destroy_scene(handle);
        let mut overlays = OverlayManager::new();

        assert!(overlays.build(&mut renderer, handle, hall).is_err());
        assert_eq!(overlays.scene_id(), None);
        assert_eq!(renderer.total_overlay_count(), 0);
    }

    #[test]
    fn test_distance_label_format() {
        assert_eq!(distance_label(Some(3.5)).as_deref(), Some("3.5m"));
        assert_eq!(distance_label(Some(12.0)).as_deref(), Some("12m"));
        assert_eq!(distance_label(None), None);
    }
}
