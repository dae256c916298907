//! Headless renderer implementation
//!
//! A [`SceneRenderer`] that keeps scene and overlay bookkeeping in memory
//! without touching any graphics API. It backs the walkthrough binary and
//! the engine tests, and can simulate load latency, load failures, a
//! missing capability and camera movement.
//!
//! # Example
//!
//! ```
//! use pano_engine::render::{HeadlessRenderer, LoadPoll, SceneRenderer};
//! # use pano_engine::render::{SceneRequest, ImageSource, EquirectGeometry, ViewLimits};
//! # use pano_engine::scene::ViewParameters;
//! # let request = SceneRequest {
//! #     scene_id: "lobby".to_string(),
//! #     source: ImageSource { path: "images/lobby-pano.jpg".to_string() },
//! #     geometry: EquirectGeometry { levels: vec![512] },
//! #     view: ViewParameters::default(),
//! #     limits: ViewLimits { max_resolution: 2048, max_fov: 1.7 },
//! #     pin_first_level: true,
//! # };
//! let mut renderer = HeadlessRenderer::new().with_load_latency(1);
//! let ticket = renderer.create_scene(&request).unwrap();
//!
//! assert_eq!(renderer.poll_scene(ticket), LoadPoll::Pending);
//! assert!(matches!(renderer.poll_scene(ticket), LoadPoll::Ready(_)));
//! ```

use super::{
    CapabilityError, HotspotPlacement, LoadPoll, LoadTicket, OverlayHandle, RenderError,
    SceneHandle, SceneLoadError, SceneRenderer, SceneRequest, ViewSubscription,
};
use slotmap::{new_key_type, Key, KeyData, SlotMap};
use std::collections::HashMap;

new_key_type! {
    struct SceneKey;
    struct OverlayKey;
    struct TicketKey;
}

/// A materialized scene and its hotspot container
#[derive(Debug)]
struct HeadlessScene {
    request: SceneRequest,
    overlays: SlotMap<OverlayKey, HotspotPlacement>,
}

/// An in-flight materialization
#[derive(Debug)]
struct PendingLoad {
    request: SceneRequest,
    polls_remaining: u32,
    fail: bool,
}

/// In-memory renderer
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    /// Materialized scenes
    scenes: SlotMap<SceneKey, HeadlessScene>,
    /// Loads that have not resolved yet
    pending: SlotMap<TicketKey, PendingLoad>,
    /// Polls a load stays pending before resolving
    load_latency: u32,
    /// Remaining forced failures per scene id
    scripted_failures: HashMap<String, u32>,
    /// Materialization requests issued per scene id
    create_calls: HashMap<String, usize>,
    /// Visible scene
    active: Option<SceneKey>,
    /// Camera yaw of the visible scene
    bearing: Option<f32>,
    /// Live view-change registrations
    subscriptions: Vec<ViewSubscription>,
    next_subscription: u64,
    /// Capability reported as missing, if any
    missing_capability: Option<String>,
    /// Ids of activated scenes, in activation order
    activation_log: Vec<String>,
}

impl HeadlessRenderer {
    /// Create a renderer whose loads resolve on the first poll
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep loads pending for `polls` polls before they resolve
    pub fn with_load_latency(mut self, polls: u32) -> Self {
        self.load_latency = polls;
        self
    }

    /// Report `capability` as unavailable from `check_capabilities`
    pub fn without_capability(mut self, capability: impl Into<String>) -> Self {
        self.missing_capability = Some(capability.into());
        self
    }

    /// Make the next `count` loads of `scene_id` fail
    pub fn fail_loads(&mut self, scene_id: impl Into<String>, count: u32) {
        *self.scripted_failures.entry(scene_id.into()).or_insert(0) += count;
    }

    /// Rotate the camera of the visible scene
    ///
    /// Returns the subscriptions the host must notify about the change;
    /// empty when no view exists.
    pub fn turn_camera(&mut self, yaw: f32) -> Vec<ViewSubscription> {
        if self.active.is_none() {
            return Vec::new();
        }
        self.bearing = Some(yaw);
        self.subscriptions.clone()
    }

    /// Tear down the view (e.g. the host surface was lost)
    ///
    /// Returns the subscriptions that were dropped.
    pub fn lose_view(&mut self) -> Vec<ViewSubscription> {
        self.active = None;
        self.bearing = None;
        std::mem::take(&mut self.subscriptions)
    }

    /// Number of materialization requests issued for a scene id
    pub fn create_calls(&self, scene_id: &str) -> usize {
        self.create_calls.get(scene_id).copied().unwrap_or(0)
    }

    /// Number of materialized scenes
    pub fn materialized_count(&self) -> usize {
        self.scenes.len()
    }

    /// Ids of materialized scenes
    pub fn materialized_ids(&self) -> Vec<&str> {
        self.scenes.values().map(|scene| scene.request.scene_id.as_str()).collect()
    }

    /// Number of loads still in flight
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Request a scene was materialized with
    pub fn request_for(&self, handle: SceneHandle) -> Option<&SceneRequest> {
        self.scenes.get(Self::scene_key(handle)).map(|scene| &scene.request)
    }

    /// Overlay elements currently in a scene's hotspot container
    pub fn overlay_count(&self, handle: SceneHandle) -> usize {
        self.scenes
            .get(Self::scene_key(handle))
            .map_or(0, |scene| scene.overlays.len())
    }

    /// Overlay elements across every materialized scene
    pub fn total_overlay_count(&self) -> usize {
        self.scenes.values().map(|scene| scene.overlays.len()).sum()
    }

    /// Placements of the overlays in a scene's hotspot container
    pub fn overlay_placements(&self, handle: SceneHandle) -> Vec<HotspotPlacement> {
        self.scenes
            .get(Self::scene_key(handle))
            .map(|scene| scene.overlays.values().copied().collect())
            .unwrap_or_default()
    }

    /// Id of the visible scene
    pub fn active_scene_id(&self) -> Option<&str> {
        self.active
            .and_then(|key| self.scenes.get(key))
            .map(|scene| scene.request.scene_id.as_str())
    }

    /// Ids of activated scenes, oldest first
    pub fn activation_log(&self) -> &[String] {
        &self.activation_log
    }

    /// Live view-change registrations
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    fn scene_key(handle: SceneHandle) -> SceneKey {
        SceneKey::from(KeyData::from_ffi(handle.0))
    }

    fn ticket_key(ticket: LoadTicket) -> TicketKey {
        TicketKey::from(KeyData::from_ffi(ticket.0))
    }

    fn take_scripted_failure(&mut self, scene_id: &str) -> bool {
        match self.scripted_failures.get_mut(scene_id) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

impl SceneRenderer for HeadlessRenderer {
    fn check_capabilities(&self) -> Result<(), CapabilityError> {
        match &self.missing_capability {
            Some(capability) => Err(CapabilityError::Missing(capability.clone())),
            None => Ok(()),
        }
    }

    fn create_scene(&mut self, request: &SceneRequest) -> Result<LoadTicket, SceneLoadError> {
        *self.create_calls.entry(request.scene_id.clone()).or_insert(0) += 1;

        let fail = self.take_scripted_failure(&request.scene_id);
        let key = self.pending.insert(PendingLoad {
            request: request.clone(),
            polls_remaining: self.load_latency,
            fail,
        });
        Ok(LoadTicket(key.data().as_ffi()))
    }

    fn poll_scene(&mut self, ticket: LoadTicket) -> LoadPoll {
        let key = Self::ticket_key(ticket);
        let Some(load) = self.pending.get_mut(key) else {
            return LoadPoll::Failed(SceneLoadError::Materialize {
                scene: String::new(),
                reason: format!("unknown load ticket {ticket:?}"),
            });
        };

        if load.polls_remaining > 0 {
            load.polls_remaining -= 1;
            return LoadPoll::Pending;
        }

        let Some(load) = self.pending.remove(key) else {
            return LoadPoll::Pending;
        };
        if load.fail {
            return LoadPoll::Failed(SceneLoadError::Materialize {
                scene: load.request.scene_id,
                reason: format!("could not fetch {}", load.request.source.path),
            });
        }

        let scene_key = self.scenes.insert(HeadlessScene {
            request: load.request,
            overlays: SlotMap::with_key(),
        });
        LoadPoll::Ready(SceneHandle(scene_key.data().as_ffi()))
    }

    fn cancel_load(&mut self, ticket: LoadTicket) {
        self.pending.remove(Self::ticket_key(ticket));
    }

    fn destroy_scene(&mut self, handle: SceneHandle) {
        let key = Self::scene_key(handle);
        if self.scenes.remove(key).is_some() && self.active == Some(key) {
            self.active = None;
            self.bearing = None;
        }
    }

    fn activate_scene(&mut self, handle: SceneHandle) -> Result<(), RenderError> {
        let key = Self::scene_key(handle);
        let scene = self.scenes.get(key).ok_or(RenderError::StaleScene(handle))?;

        self.bearing = Some(scene.request.view.yaw);
        self.activation_log.push(scene.request.scene_id.clone());
        self.active = Some(key);
        Ok(())
    }

    fn create_overlay_element(
        &mut self,
        scene: SceneHandle,
        placement: HotspotPlacement,
    ) -> Result<OverlayHandle, RenderError> {
        let scene = self
            .scenes
            .get_mut(Self::scene_key(scene))
            .ok_or(RenderError::StaleScene(scene))?;
        let key = scene.overlays.insert(placement);
        Ok(OverlayHandle(key.data().as_ffi()))
    }

    fn destroy_overlay_element(&mut self, scene: SceneHandle, element: OverlayHandle) {
        if let Some(scene) = self.scenes.get_mut(Self::scene_key(scene)) {
            scene.overlays.remove(OverlayKey::from(KeyData::from_ffi(element.0)));
        }
    }

    fn view_bearing(&self) -> Option<f32> {
        self.bearing
    }

    fn subscribe_view_changes(&mut self) -> Option<ViewSubscription> {
        self.active?;
        let subscription = ViewSubscription(self.next_subscription);
        self.next_subscription += 1;
        self.subscriptions.push(subscription);
        Some(subscription)
    }

    fn unsubscribe_view_changes(&mut self, subscription: ViewSubscription) {
        self.subscriptions.retain(|s| *s != subscription);
    }
}
