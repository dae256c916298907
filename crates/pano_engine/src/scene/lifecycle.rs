//! Scene Lifecycle Manager - residency tracking for panoramic scenes
//!
//! Every scene in the registry has exactly one [`LoadState`] for the whole
//! session:
//!
//! ```text
//! Unloaded --request--> Loading --success--> Loaded
//!     ^                    |                   |
//!     +------failure-------+                   |
//!     +---------------------eviction-----------+
//! ```
//!
//! The manager is the only writer of load state and of the resident set.
//! It coalesces repeated requests for a scene that is already loading,
//! preloads a small window of linked neighbors after each switch, and
//! keeps the number of resident scenes under the configured ceiling by
//! evicting the least recently activated ones.
//!
//! ## Protected scenes
//!
//! Two scenes are never evicted: the active scene and the single pinned
//! scene (the target of the latest foreground [`ensure_loaded`] call, until
//! it is activated or fails). With a ceiling of at least two, eviction can
//! therefore always restore the budget.
//!
//! [`ensure_loaded`]: SceneLifecycleManager::ensure_loaded

use std::collections::HashMap;

use super::registry::SceneRegistry;
use crate::core::config::{GeometryConfig, LifecycleConfig};
use crate::events::{EventArg, EventSystem, EventType};
use crate::foundation::memory::MemoryUsage;
use crate::foundation::time::DelayTimer;
use crate::render::{LoadPoll, LoadTicket, SceneHandle, SceneLoadError, SceneRenderer, SceneRequest};

/// Per-scene load state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Not materialized
    Unloaded,
    /// Materialization requested, not finished
    Loading,
    /// Materialized and resident
    Loaded,
}

/// Outcome of a load request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadProgress {
    /// The scene is resident
    Ready(SceneHandle),
    /// The scene is loading; poll again after the next update
    Pending,
}

/// Bookkeeping for one scene
#[derive(Debug, Clone)]
struct SceneSlot {
    state: LoadState,
    ticket: Option<LoadTicket>,
    handle: Option<SceneHandle>,
    /// Activation sequence number of the last activation
    last_activated: Option<u64>,
    /// Load sequence number of the last completed load
    loaded_seq: u64,
    /// Requested by background preloading rather than navigation
    preload: bool,
}

impl SceneSlot {
    fn new() -> Self {
        Self {
            state: LoadState::Unloaded,
            ticket: None,
            handle: None,
            last_activated: None,
            loaded_seq: 0,
            preload: false,
        }
    }
}

/// Tracks load state and the resident set for every scene
pub struct SceneLifecycleManager {
    config: LifecycleConfig,
    geometry: GeometryConfig,
    slots: HashMap<String, SceneSlot>,
    /// Scene ids in registry order, for deterministic iteration
    order: Vec<String>,
    /// Visible scene
    active: Option<String>,
    /// Target of the latest foreground request
    pinned: Option<String>,
    activation_seq: u64,
    load_seq: u64,
    preload_timer: DelayTimer,
    preload_origin: Option<String>,
    requests_issued: u64,
}

impl SceneLifecycleManager {
    /// Create a manager with every registry scene unloaded
    pub fn new(registry: &SceneRegistry, config: LifecycleConfig, geometry: GeometryConfig) -> Self {
        let order: Vec<String> = registry.all_scenes().iter().map(|s| s.id.clone()).collect();
        let slots = order.iter().map(|id| (id.clone(), SceneSlot::new())).collect();
        log::debug!("Creating SceneLifecycleManager with config: {:?}", config);

        Self {
            config,
            geometry,
            slots,
            order,
            active: None,
            pinned: None,
            activation_seq: 0,
            load_seq: 0,
            preload_timer: DelayTimer::new(),
            preload_origin: None,
            requests_issued: 0,
        }
    }

    /// Lifecycle settings in use
    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Load state of a scene (`None` for unknown ids)
    pub fn state(&self, id: &str) -> Option<LoadState> {
        self.slots.get(id).map(|slot| slot.state)
    }

    /// Handle of a resident scene
    pub fn handle(&self, id: &str) -> Option<SceneHandle> {
        self.slots
            .get(id)
            .filter(|slot| slot.state == LoadState::Loaded)
            .and_then(|slot| slot.handle)
    }

    /// Number of resident scenes
    pub fn resident_count(&self) -> usize {
        self.count_in(LoadState::Loaded)
    }

    /// Number of scenes currently loading
    pub fn loading_count(&self) -> usize {
        self.count_in(LoadState::Loading)
    }

    /// Resident scene ids in registry order
    pub fn resident_ids(&self) -> Vec<&str> {
        self.ids_in(LoadState::Loaded)
    }

    /// Materialization requests issued since startup
    pub fn requests_issued(&self) -> u64 {
        self.requests_issued
    }

    /// Scene currently marked active
    pub fn active_scene(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Scene protected as the target of the latest foreground request
    pub fn pinned_scene(&self) -> Option<&str> {
        self.pinned.as_deref()
    }

    /// Whether a neighbor preload is scheduled
    pub fn preload_scheduled(&self) -> bool {
        self.preload_timer.is_armed()
    }

    fn count_in(&self, state: LoadState) -> usize {
        self.slots.values().filter(|slot| slot.state == state).count()
    }

    fn ids_in(&self, state: LoadState) -> Vec<&str> {
        self.order
            .iter()
            .filter(|id| self.slots.get(id.as_str()).is_some_and(|slot| slot.state == state))
            .map(String::as_str)
            .collect()
    }

    /// Make sure a scene is resident, materializing it if needed
    ///
    /// Idempotent: a resident scene returns its existing handle, and a scene
    /// that is already loading does not trigger a second materialization.
    /// The requested scene becomes the pinned scene.
    pub fn ensure_loaded(
        &mut self,
        registry: &SceneRegistry,
        renderer: &mut dyn SceneRenderer,
        events: &mut EventSystem,
        id: &str,
    ) -> Result<LoadProgress, SceneLoadError> {
        let slot = self
            .slots
            .get_mut(id)
            .ok_or_else(|| SceneLoadError::UnknownScene(id.to_string()))?;
        // A foreground request upgrades a preload in flight
        slot.preload = false;
        let state = slot.state;
        let handle = slot.handle;

        match state {
            LoadState::Loaded => match handle {
                Some(handle) => Ok(LoadProgress::Ready(handle)),
                None => Err(SceneLoadError::Materialize {
                    scene: id.to_string(),
                    reason: "resident scene has no handle".to_string(),
                }),
            },
            LoadState::Loading => {
                self.pinned = Some(id.to_string());
                Ok(LoadProgress::Pending)
            }
            LoadState::Unloaded => {
                self.pinned = Some(id.to_string());
                if let Err(err) = self.request_load(registry, renderer, events, id, false) {
                    self.pinned = None;
                    return Err(err);
                }
                Ok(self.handle(id).map_or(LoadProgress::Pending, LoadProgress::Ready))
            }
        }
    }

    /// Issue a materialization request and poll it once
    ///
    /// Renderers that materialize synchronously resolve on that first poll.
    fn request_load(
        &mut self,
        registry: &SceneRegistry,
        renderer: &mut dyn SceneRenderer,
        events: &mut EventSystem,
        id: &str,
        preload: bool,
    ) -> Result<(), SceneLoadError> {
        let scene = registry
            .by_id(id)
            .ok_or_else(|| SceneLoadError::UnknownScene(id.to_string()))?;
        let request = SceneRequest::for_scene(scene, &self.geometry);

        log::debug!("Requesting scene '{}' ({})", id, request.source.path);
        let ticket = match renderer.create_scene(&request) {
            Ok(ticket) => ticket,
            Err(err) => {
                self.report_failure(events, id, preload, &err);
                return Err(err);
            }
        };
        self.requests_issued += 1;

        if let Some(slot) = self.slots.get_mut(id) {
            slot.state = LoadState::Loading;
            slot.ticket = Some(ticket);
            slot.preload = preload;
        }
        self.poll_one(renderer, events, id)
    }

    /// Poll in-flight loads and run a due neighbor preload
    pub fn update(
        &mut self,
        delta_time: f32,
        registry: &SceneRegistry,
        renderer: &mut dyn SceneRenderer,
        events: &mut EventSystem,
    ) {
        let loading: Vec<String> = self.ids_in(LoadState::Loading).into_iter().map(str::to_string).collect();
        for id in loading {
            // Failures are reported by poll_one
            let _ = self.poll_one(renderer, events, &id);
        }

        if self.preload_timer.tick(delta_time) {
            if let Some(origin) = self.preload_origin.take() {
                let (count, ceiling) = (self.config.preload_count, self.config.max_resident_scenes);
                self.preload_neighbors(registry, renderer, events, &origin, count, ceiling);
            }
        }
    }

    fn poll_one(
        &mut self,
        renderer: &mut dyn SceneRenderer,
        events: &mut EventSystem,
        id: &str,
    ) -> Result<(), SceneLoadError> {
        let Some(ticket) = self.slots.get(id).and_then(|slot| slot.ticket) else {
            return Ok(());
        };

        match renderer.poll_scene(ticket) {
            LoadPoll::Pending => Ok(()),
            LoadPoll::Ready(handle) => {
                self.load_seq += 1;
                if let Some(slot) = self.slots.get_mut(id) {
                    slot.state = LoadState::Loaded;
                    slot.ticket = None;
                    slot.handle = Some(handle);
                    slot.loaded_seq = self.load_seq;
                }
                log::debug!("Scene '{}' loaded ({} resident)", id, self.resident_count());
                let event = events.stamp(EventType::SceneLoaded).with_scene(id);
                events.send(event);

                let ceiling = self.config.max_resident_scenes;
                let keep = self.active.clone();
                self.evict_if_over_budget(renderer, events, ceiling, keep.as_deref());
                Ok(())
            }
            LoadPoll::Failed(err) => {
                let preload = self.slots.get(id).is_some_and(|slot| slot.preload);
                if let Some(slot) = self.slots.get_mut(id) {
                    slot.state = LoadState::Unloaded;
                    slot.ticket = None;
                    slot.handle = None;
                    slot.preload = false;
                }
                if self.pinned.as_deref() == Some(id) {
                    self.pinned = None;
                }
                self.report_failure(events, id, preload, &err);
                Err(err)
            }
        }
    }

    fn report_failure(&self, events: &mut EventSystem, id: &str, preload: bool, err: &SceneLoadError) {
        if preload {
            log::warn!("Preload of scene '{}' failed: {}", id, err);
        } else {
            log::error!("{}", err);
        }
        let event = events
            .stamp(EventType::SceneLoadFailed)
            .with_scene(id)
            .with_arg("reason", EventArg::Reason(err.to_string()));
        events.send(event);
    }

    /// Schedule neighbor preloading for `id` after the configured delay
    ///
    /// Replaces any preload that was scheduled but has not run yet.
    pub fn schedule_preload(&mut self, id: &str) {
        self.preload_origin = Some(id.to_string());
        self.preload_timer.arm(self.config.preload_delay);
    }

    /// Drop a scheduled preload
    pub fn cancel_preload(&mut self) {
        self.preload_origin = None;
        self.preload_timer.cancel();
    }

    /// Load up to `max_count` of the scenes linked from `id`
    ///
    /// Only the first `max_count` distinct link targets are considered;
    /// those already resident or loading are skipped. Requests stop as soon
    /// as resident plus loading scenes reach `max_resident`. Failures are
    /// logged and otherwise ignored. Returns the number of requests issued,
    /// failed ones included.
    pub fn preload_neighbors(
        &mut self,
        registry: &SceneRegistry,
        renderer: &mut dyn SceneRenderer,
        events: &mut EventSystem,
        id: &str,
        max_count: usize,
        max_resident: usize,
    ) -> usize {
        let Some(scene) = registry.by_id(id) else {
            return 0;
        };

        let mut issued = 0;
        for target in scene.neighbor_ids().into_iter().take(max_count) {
            if self.state(target) != Some(LoadState::Unloaded) {
                continue;
            }
            if self.resident_count() + self.loading_count() >= max_resident {
                log::debug!("Preload of '{}' skipped: resident ceiling reached", target);
                break;
            }
            if self.request_load(registry, renderer, events, target, true).is_err() {
                log::debug!("Continuing preload after failure of '{}'", target);
            }
            issued += 1;
        }
        issued
    }

    /// Record that a scene became the visible one
    pub fn mark_activated(&mut self, id: &str) {
        self.activation_seq += 1;
        if let Some(slot) = self.slots.get_mut(id) {
            slot.last_activated = Some(self.activation_seq);
        }
        self.active = Some(id.to_string());
        if self.pinned.as_deref() == Some(id) {
            self.pinned = None;
        }
    }

    fn is_protected(&self, id: &str, keep: Option<&str>) -> bool {
        keep == Some(id) || self.active.as_deref() == Some(id) || self.pinned.as_deref() == Some(id)
    }

    /// Evict least recently activated scenes until at most `max_resident` remain
    ///
    /// Never evicts `keep`, the active scene or the pinned scene. Scenes that
    /// were never activated (finished preloads) go first, then the oldest
    /// activation; ties fall back to load order. Returns the evicted ids.
    pub fn evict_if_over_budget(
        &mut self,
        renderer: &mut dyn SceneRenderer,
        events: &mut EventSystem,
        max_resident: usize,
        keep: Option<&str>,
    ) -> Vec<String> {
        let mut evicted = Vec::new();
        while self.resident_count() > max_resident {
            let candidate = self
                .slots
                .iter()
                .filter(|(id, slot)| slot.state == LoadState::Loaded && !self.is_protected(id, keep))
                .min_by_key(|(_, slot)| (slot.last_activated.is_some(), slot.last_activated, slot.loaded_seq))
                .map(|(id, _)| id.clone());

            let Some(id) = candidate else {
                log::warn!(
                    "Cannot evict below {} resident scenes: every resident scene is protected",
                    max_resident
                );
                break;
            };
            self.evict(renderer, events, &id);
            evicted.push(id);
        }
        evicted
    }

    /// React to a memory sample
    ///
    /// Above the pressure threshold every unprotected resident scene is
    /// released. Returns the evicted ids.
    pub fn trim_for_memory_pressure(
        &mut self,
        renderer: &mut dyn SceneRenderer,
        events: &mut EventSystem,
        usage: MemoryUsage,
    ) -> Vec<String> {
        if !usage.should_cleanup(self.config.memory_pressure_threshold) {
            return Vec::new();
        }

        // A pinned scene that is still loading holds no resident slot
        let floor = self
            .slots
            .iter()
            .filter(|(id, slot)| slot.state == LoadState::Loaded && self.is_protected(id, None))
            .count();
        let evicted = self.evict_if_over_budget(renderer, events, floor, None);
        log::info!(
            "Memory pressure ({:.0}% used): released {} scenes",
            usage.usage_ratio() * 100.0,
            evicted.len()
        );
        evicted
    }

    fn evict(&mut self, renderer: &mut dyn SceneRenderer, events: &mut EventSystem, id: &str) {
        let Some(slot) = self.slots.get_mut(id) else {
            return;
        };
        if let Some(handle) = slot.handle.take() {
            renderer.destroy_scene(handle);
        }
        slot.state = LoadState::Unloaded;
        log::debug!("Evicted scene '{}'", id);

        let event = events.stamp(EventType::SceneEvicted).with_scene(id);
        events.send(event);
    }

    /// Release every resident scene (session teardown)
    ///
    /// Loads still in flight are cancelled in the renderer.
    pub fn release_all(&mut self, renderer: &mut dyn SceneRenderer) {
        self.cancel_preload();
        for slot in self.slots.values_mut() {
            if let Some(handle) = slot.handle.take() {
                renderer.destroy_scene(handle);
            }
            if let Some(ticket) = slot.ticket.take() {
                renderer.cancel_load(ticket);
            }
            *slot = SceneSlot::new();
        }
        self.active = None;
        self.pinned = None;
    }
}
