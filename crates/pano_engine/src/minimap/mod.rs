//! Overhead minimap
//!
//! [`project`] is a pure function from the scenes of one floor to a
//! [`MinimapFrame`]. The [`MinimapProjector`] keeps a frame up to date while
//! mounted: it recomputes when the current scene changes and whenever the
//! renderer pushes a camera-orientation change through its subscription.

pub mod projection;

pub use projection::{project, MinimapFrame, MinimapPoint, MinimapSegment};

use crate::core::config::MinimapConfig;
use crate::render::{SceneRenderer, ViewSubscription};
use crate::scene::SceneRegistry;

/// Keeps the minimap frame in sync with the visible scene and camera
pub struct MinimapProjector {
    config: MinimapConfig,
    mounted: bool,
    subscription: Option<ViewSubscription>,
    current_scene_id: Option<String>,
    bearing: Option<f32>,
    frame: Option<MinimapFrame>,
    recomputes: u64,
}

impl MinimapProjector {
    /// Create an unmounted projector
    pub fn new(config: MinimapConfig) -> Self {
        Self {
            config,
            mounted: false,
            subscription: None,
            current_scene_id: None,
            bearing: None,
            frame: None,
            recomputes: 0,
        }
    }

    /// Start tracking the renderer's view
    ///
    /// Subscribes to view changes if a view exists; otherwise the
    /// subscription is made on the next scene change.
    pub fn mount(&mut self, registry: &SceneRegistry, renderer: &mut dyn SceneRenderer) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.subscribe(renderer);
        self.recompute(registry);
    }

    /// Stop tracking and drop the frame
    pub fn unmount(&mut self, renderer: &mut dyn SceneRenderer) {
        if let Some(subscription) = self.subscription.take() {
            renderer.unsubscribe_view_changes(subscription);
        }
        self.mounted = false;
        self.frame = None;
    }

    fn subscribe(&mut self, renderer: &mut dyn SceneRenderer) {
        if self.subscription.is_none() {
            self.subscription = renderer.subscribe_view_changes();
        }
        self.bearing = renderer.view_bearing();
    }

    /// The visible scene changed
    pub fn on_scene_changed(&mut self, registry: &SceneRegistry, renderer: &mut dyn SceneRenderer, scene_id: &str) {
        self.current_scene_id = Some(scene_id.to_string());
        if self.mounted {
            self.subscribe(renderer);
        }
        self.recompute(registry);
    }

    /// The renderer reported a new camera yaw
    ///
    /// Notifications for any subscription other than the live one are
    /// ignored. Returns whether the frame was recomputed.
    pub fn on_view_changed(&mut self, registry: &SceneRegistry, subscription: ViewSubscription, bearing: f32) -> bool {
        if !self.mounted || self.subscription != Some(subscription) {
            log::trace!("Ignoring view change from stale subscription {:?}", subscription);
            return false;
        }
        self.bearing = Some(bearing);
        self.recompute(registry);
        true
    }

    /// The renderer's view went away; its subscriptions are already gone
    pub fn on_view_lost(&mut self, registry: &SceneRegistry) {
        self.subscription = None;
        self.bearing = None;
        self.recompute(registry);
    }

    /// Whether the projector is mounted
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Live view-change subscription
    pub fn subscription(&self) -> Option<ViewSubscription> {
        self.subscription
    }

    /// Latest frame, `None` while unmounted or before the first scene
    pub fn frame(&self) -> Option<&MinimapFrame> {
        self.frame.as_ref()
    }

    /// Frames computed since creation
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }

    fn recompute(&mut self, registry: &SceneRegistry) {
        if !self.mounted {
            return;
        }
        let current = self.current_scene_id.as_deref().and_then(|id| registry.by_id(id));
        self.frame = current.and_then(|scene| {
            let floor_scenes = registry.scenes_on_floor(scene.floor);
            project(&self.config, &floor_scenes, Some(&scene.id), self.bearing)
        });
        self.recomputes += 1;
    }
}
