//! Tour engine
//!
//! Wires the registry, lifecycle manager, navigation controller, minimap
//! projector and view models around a host-supplied [`SceneRenderer`].
//! Hosts drive it with [`TourEngine::update`] once per frame and forward
//! user input and renderer notifications to the matching methods.

use crate::config::ConfigError;
use crate::core::config::TourSettings;
use crate::events::{EventArg, EventSystem, EventType};
use crate::foundation::memory::MemoryUsage;
use crate::foundation::time::SessionClock;
use crate::minimap::{MinimapFrame, MinimapProjector};
use crate::navigation::{pick_scene_for_floor, NavigationController, NavigationOutcome, NavigationState};
use crate::render::{CapabilityError, SceneRenderer, ViewSubscription};
use crate::scene::{Scene, SceneLifecycleManager, SceneRegistry, TourDocument};
use crate::ui::{self, FloorButton, HotspotMarker, LocationPanel, TapHint};
use thiserror::Error;

/// Fatal startup errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Tour document or settings rejected
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The host cannot render panoramas
    #[error("Rendering capability error: {0}")]
    Capability(#[from] CapabilityError),
}

/// Panorama tour engine
///
/// Single-threaded: every method runs on the host's UI thread. Events
/// queued during a call are dispatched at the end of the next
/// [`update`](Self::update).
pub struct TourEngine<R: SceneRenderer> {
    registry: SceneRegistry,
    settings: TourSettings,
    renderer: R,
    lifecycle: SceneLifecycleManager,
    navigation: NavigationController,
    minimap: MinimapProjector,
    tap_hint: TapHint,
    events: EventSystem,
    clock: SessionClock,
    /// Scene the minimap was last told about
    shown_scene: Option<String>,
}

impl<R: SceneRenderer> TourEngine<R> {
    /// Validate everything and start loading the first scene
    ///
    /// Fails on invalid settings, a renderer missing a required capability,
    /// or an empty or malformed tour document.
    pub fn new(document: TourDocument, settings: TourSettings, renderer: R) -> Result<Self, EngineError> {
        log::info!("Initializing tour engine...");
        settings.validate()?;
        renderer.check_capabilities()?;
        let registry = SceneRegistry::load(document)?;

        let lifecycle = SceneLifecycleManager::new(&registry, settings.lifecycle.clone(), settings.geometry.clone());
        let navigation = NavigationController::new(settings.navigation.clone());
        let minimap = MinimapProjector::new(settings.minimap.clone());
        let tap_hint = TapHint::new(settings.navigation.tap_hint_delay, settings.navigation.tap_hint_duration);

        let mut engine = Self {
            registry,
            settings,
            renderer,
            lifecycle,
            navigation,
            minimap,
            tap_hint,
            events: EventSystem::new(),
            clock: SessionClock::new(),
            shown_scene: None,
        };

        engine.minimap.mount(&engine.registry, &mut engine.renderer);
        engine
            .navigation
            .start(&engine.registry, &mut engine.lifecycle, &mut engine.renderer, &mut engine.events);
        engine.sync_minimap();

        log::info!("Tour engine ready with {} scenes", engine.registry.len());
        Ok(engine)
    }

    /// Advance every time-dependent component by `delta_time` seconds
    pub fn update(&mut self, delta_time: f32) {
        self.clock.advance(delta_time);
        self.events.update_time(self.clock.elapsed());

        self.lifecycle
            .update(delta_time, &self.registry, &mut self.renderer, &mut self.events);
        self.navigation.update(
            delta_time,
            &self.registry,
            &mut self.lifecycle,
            &mut self.renderer,
            &mut self.events,
        );
        self.tap_hint.update(delta_time, &mut self.events);
        self.sync_minimap();

        self.events.dispatch();
    }

    fn sync_minimap(&mut self) {
        let current = self.navigation.current_scene_id();
        if current == self.shown_scene.as_deref() {
            return;
        }
        self.shown_scene = current.map(str::to_string);
        if let Some(id) = current {
            self.minimap.on_scene_changed(&self.registry, &mut self.renderer, id);
        }
    }

    /// Start a switch to scene `id`
    pub fn navigate_to(&mut self, id: &str) -> NavigationOutcome {
        self.navigation.navigate_to(&self.registry, &mut self.events, id)
    }

    /// Follow the hotspot marker at `index` of the visible scene
    pub fn click_hotspot(&mut self, index: usize) -> Option<NavigationOutcome> {
        self.navigation.navigate_to_overlay(&self.registry, &mut self.events, index)
    }

    /// Move to the best scene on `floor`
    ///
    /// Returns `None` when the floor has no scenes.
    pub fn select_floor(&mut self, floor: i32) -> Option<NavigationOutcome> {
        let target = {
            let current = self.current_scene();
            let candidates = self.registry.scenes_on_floor(floor);
            pick_scene_for_floor(floor, current, &candidates).map(|scene| scene.id.clone())
        };

        match target {
            Some(id) => Some(self.navigate_to(&id)),
            None => {
                log::debug!("Floor {} has no scenes", floor);
                None
            }
        }
    }

    /// Show or hide hotspot markers (a tap on the panorama)
    pub fn toggle_hotspots(&mut self) -> bool {
        self.tap_hint.dismiss(&mut self.events);
        self.navigation.toggle_hotspot_overlay(&mut self.events)
    }

    /// Camera orientation changed; forwarded from a renderer subscription
    pub fn on_view_changed(&mut self, subscription: ViewSubscription, bearing: f32) -> bool {
        let accepted = self.minimap.on_view_changed(&self.registry, subscription, bearing);
        if accepted {
            let event = self
                .events
                .stamp(EventType::ViewChanged)
                .with_arg("bearing", EventArg::Bearing(bearing));
            self.events.send(event);
        }
        accepted
    }

    /// The renderer's view handle went away
    pub fn on_view_unavailable(&mut self) {
        log::warn!("Renderer view unavailable; minimap heading disabled");
        self.minimap.on_view_lost(&self.registry);
    }

    /// Host memory sample; releases cached scenes under pressure
    pub fn on_memory_pressure(&mut self, usage: MemoryUsage) -> Vec<String> {
        self.lifecycle
            .trim_for_memory_pressure(&mut self.renderer, &mut self.events, usage)
    }

    /// Visible scene
    pub fn current_scene(&self) -> Option<&Scene> {
        self.navigation
            .current_scene_id()
            .and_then(|id| self.registry.by_id(id))
    }

    /// Location panel for the visible scene
    pub fn location_panel(&self) -> Option<LocationPanel> {
        self.current_scene().map(LocationPanel::for_scene)
    }

    /// Floor selector buttons
    pub fn floor_buttons(&self) -> Vec<FloorButton> {
        ui::floor_buttons(&self.registry, self.current_scene().map(|scene| scene.floor))
    }

    /// Hotspot markers of the visible scene
    pub fn hotspot_markers(&self) -> Vec<HotspotMarker> {
        ui::hotspot_markers(&self.registry, self.navigation.overlays(), self.navigation.hotspots_visible())
    }

    /// Latest minimap frame
    pub fn minimap(&self) -> Option<&MinimapFrame> {
        self.minimap.frame()
    }

    /// Whether the tap hint is on screen
    pub fn tap_hint_visible(&self) -> bool {
        self.tap_hint.is_visible()
    }

    /// Navigation state
    pub fn navigation_state(&self) -> &NavigationState {
        self.navigation.state()
    }

    /// Navigation controller
    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    /// Lifecycle manager
    pub fn lifecycle(&self) -> &SceneLifecycleManager {
        &self.lifecycle
    }

    /// Scene registry
    pub fn registry(&self) -> &SceneRegistry {
        &self.registry
    }

    /// Settings the engine was created with
    pub fn settings(&self) -> &TourSettings {
        &self.settings
    }

    /// Renderer
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Mutable renderer access for hosts that drive the camera
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Event system, for registering handlers
    pub fn events_mut(&mut self) -> &mut EventSystem {
        &mut self.events
    }

    /// Seconds since the engine started
    pub fn elapsed(&self) -> f64 {
        self.clock.elapsed()
    }

    /// Tear everything down and hand the renderer back
    pub fn shutdown(mut self) -> R {
        log::info!("Shutting down tour engine...");
        self.minimap.unmount(&mut self.renderer);
        self.navigation.shutdown(&mut self.renderer);
        self.lifecycle.release_all(&mut self.renderer);
        self.events.clear();
        log::info!("Tour engine shutdown complete");
        self.renderer
    }
}
