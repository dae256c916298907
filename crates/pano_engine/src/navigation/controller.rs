//! Navigation controller
//!
//! Owns the session's [`NavigationState`] and drives scene switches through
//! a small, frame-driven state machine:
//!
//! ```text
//! Idle --navigate_to--> LeadOut --lead elapsed--> AwaitingLoad --ready--> LeadIn --trail elapsed--> Idle
//!                                                      |
//!                                                      +--load failed--> Idle (previous scene kept)
//! ```
//!
//! The first scene goes through `Startup`, which swaps in as soon as the
//! scene is resident and retries failed loads after a short pause.
//! The lead and trail delays exist only so a host can play its transition
//! animation without the swap itself becoming visible.

use super::overlay::OverlayManager;
use crate::core::config::NavigationConfig;
use crate::events::{EventArg, EventSystem, EventType};
use crate::foundation::time::DelayTimer;
use crate::render::{SceneHandle, SceneRenderer};
use crate::scene::{LoadProgress, LoadState, SceneLifecycleManager, SceneRegistry};

/// Pause before a failed startup load is retried (seconds)
const STARTUP_RETRY_DELAY: f32 = 1.0;

/// Session navigation state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    /// Visible scene, `None` until the first scene is shown
    pub current_scene_id: Option<String>,
    /// A scene switch is in flight
    pub transitioning: bool,
    /// Hotspot markers are shown
    pub hotspots_visible: bool,
}

/// Phase of the scene-switch state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    /// Nothing in flight
    Idle,
    /// Waiting for the first scene
    Startup,
    /// Outgoing animation window
    LeadOut,
    /// Waiting for the target scene to become resident
    AwaitingLoad,
    /// Incoming animation window
    LeadIn,
}

/// Result of a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// A transition to the target started
    Started,
    /// The target is already the visible scene
    AlreadyCurrent,
    /// Another transition is in flight; the request was dropped
    Busy,
    /// The target is not in the registry
    UnknownScene,
}

/// Scene-switch state machine and hotspot visibility
pub struct NavigationController {
    config: NavigationConfig,
    state: NavigationState,
    phase: TransitionPhase,
    target: Option<String>,
    /// Set once the target's load has been requested
    load_requested: bool,
    transition_timer: DelayTimer,
    auto_hide: DelayTimer,
    overlays: OverlayManager,
    transitions_completed: u64,
}

impl NavigationController {
    /// Create an idle controller with no current scene
    pub fn new(config: NavigationConfig) -> Self {
        Self {
            config,
            state: NavigationState::default(),
            phase: TransitionPhase::Idle,
            target: None,
            load_requested: false,
            transition_timer: DelayTimer::new(),
            auto_hide: DelayTimer::new(),
            overlays: OverlayManager::new(),
            transitions_completed: 0,
        }
    }

    /// Current navigation state
    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    /// Current state-machine phase
    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    /// Visible scene id
    pub fn current_scene_id(&self) -> Option<&str> {
        self.state.current_scene_id.as_deref()
    }

    /// Scene a transition in flight is heading to
    pub fn pending_target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Whether a scene switch is in flight
    pub fn is_transitioning(&self) -> bool {
        self.state.transitioning
    }

    /// Whether hotspot markers are shown
    pub fn hotspots_visible(&self) -> bool {
        self.state.hotspots_visible
    }

    /// Overlay markers of the visible scene
    pub fn overlays(&self) -> &OverlayManager {
        &self.overlays
    }

    /// Auto-hide countdown for hotspot markers
    pub fn auto_hide_timer(&self) -> &DelayTimer {
        &self.auto_hide
    }

    /// Completed scene switches, startup excluded
    pub fn transitions_completed(&self) -> u64 {
        self.transitions_completed
    }

    /// Begin showing the first scene of the registry
    pub fn start(
        &mut self,
        registry: &SceneRegistry,
        lifecycle: &mut SceneLifecycleManager,
        renderer: &mut dyn SceneRenderer,
        events: &mut EventSystem,
    ) {
        let Some(first) = registry.first_scene() else {
            log::error!("Cannot start navigation: the registry has no scenes");
            return;
        };

        log::info!("Starting tour at '{}'", first.id);
        self.target = Some(first.id.clone());
        self.load_requested = false;
        self.phase = TransitionPhase::Startup;
        self.state.transitioning = true;
        self.try_swap(registry, lifecycle, renderer, events);
    }

    /// Request a switch to `target_id`
    ///
    /// Ignored while another switch is in flight or when the target is
    /// already visible. Otherwise the lead-out window starts; the swap
    /// itself happens in [`update`](Self::update).
    pub fn navigate_to(&mut self, registry: &SceneRegistry, events: &mut EventSystem, target_id: &str) -> NavigationOutcome {
        if !registry.contains(target_id) {
            log::warn!("Ignoring navigation to unknown scene '{}'", target_id);
            return NavigationOutcome::UnknownScene;
        }
        if self.current_scene_id() == Some(target_id) {
            log::debug!("Ignoring navigation to '{}': already there", target_id);
            return NavigationOutcome::AlreadyCurrent;
        }
        if self.state.transitioning {
            log::debug!("Ignoring navigation to '{}': transition in flight", target_id);
            return NavigationOutcome::Busy;
        }

        log::info!(
            "Navigating from '{}' to '{}'",
            self.current_scene_id().unwrap_or("-"),
            target_id
        );
        self.target = Some(target_id.to_string());
        self.load_requested = false;
        self.phase = TransitionPhase::LeadOut;
        self.state.transitioning = true;
        self.transition_timer.arm(self.config.transition_lead);

        let event = events.stamp(EventType::TransitionStarted).with_scene(target_id);
        events.send(event);
        NavigationOutcome::Started
    }

    /// Navigate to the target of the marker at `index`
    pub fn navigate_to_overlay(
        &mut self,
        registry: &SceneRegistry,
        events: &mut EventSystem,
        index: usize,
    ) -> Option<NavigationOutcome> {
        let target = self.overlays.target_at(index)?.to_string();
        Some(self.navigate_to(registry, events, &target))
    }

    /// Flip hotspot visibility, returning the new value
    ///
    /// Showing the markers (re)starts the auto-hide countdown; there is only
    /// ever one countdown. Without a visible scene this does nothing.
    pub fn toggle_hotspot_overlay(&mut self, events: &mut EventSystem) -> bool {
        if self.state.current_scene_id.is_none() {
            return false;
        }
        let visible = !self.state.hotspots_visible;
        self.set_hotspots_visible(visible, events);
        visible
    }

    fn set_hotspots_visible(&mut self, visible: bool, events: &mut EventSystem) {
        if visible {
            self.auto_hide.arm(self.config.hotspot_auto_hide);
        } else {
            self.auto_hide.cancel();
        }
        if self.state.hotspots_visible == visible {
            return;
        }

        self.state.hotspots_visible = visible;
        let event_type = if visible { EventType::HotspotsShown } else { EventType::HotspotsHidden };
        let event = events.stamp(event_type);
        events.send(event);
    }

    /// Advance timers and the scene-switch state machine
    ///
    /// Call after the lifecycle manager's update so load progress is current.
    pub fn update(
        &mut self,
        delta_time: f32,
        registry: &SceneRegistry,
        lifecycle: &mut SceneLifecycleManager,
        renderer: &mut dyn SceneRenderer,
        events: &mut EventSystem,
    ) {
        if self.auto_hide.tick(delta_time) {
            log::debug!("Auto-hiding hotspots");
            self.set_hotspots_visible(false, events);
        }

        match self.phase {
            TransitionPhase::Idle => {}
            TransitionPhase::Startup => {
                if self.transition_timer.is_armed() && !self.transition_timer.tick(delta_time) {
                    return;
                }
                self.try_swap(registry, lifecycle, renderer, events);
            }
            TransitionPhase::LeadOut => {
                if self.transition_timer.tick(delta_time) {
                    self.phase = TransitionPhase::AwaitingLoad;
                    self.try_swap(registry, lifecycle, renderer, events);
                }
            }
            TransitionPhase::AwaitingLoad => self.try_swap(registry, lifecycle, renderer, events),
            TransitionPhase::LeadIn => {
                if self.transition_timer.tick(delta_time) {
                    self.finish_transition(events);
                }
            }
        }
    }

    fn try_swap(
        &mut self,
        registry: &SceneRegistry,
        lifecycle: &mut SceneLifecycleManager,
        renderer: &mut dyn SceneRenderer,
        events: &mut EventSystem,
    ) {
        let Some(target) = self.target.clone() else {
            self.finish_transition(events);
            return;
        };

        // A load that failed while in flight leaves the scene unloaded
        if self.load_requested && lifecycle.state(&target) == Some(LoadState::Unloaded) {
            self.load_failed(&target, "scene could not be loaded", events);
            return;
        }

        match lifecycle.ensure_loaded(registry, renderer, events, &target) {
            Ok(LoadProgress::Pending) => self.load_requested = true,
            Ok(LoadProgress::Ready(handle)) => self.swap(registry, lifecycle, renderer, events, &target, handle),
            Err(err) => self.load_failed(&target, &err.to_string(), events),
        }
    }

    fn load_failed(&mut self, target: &str, reason: &str, events: &mut EventSystem) {
        self.load_requested = false;

        if self.phase == TransitionPhase::Startup {
            log::warn!("Retrying first scene '{}' in {}s", target, STARTUP_RETRY_DELAY);
            self.transition_timer.arm(STARTUP_RETRY_DELAY);
            return;
        }
        self.abort_transition(target, reason, events);
    }

    fn abort_transition(&mut self, target: &str, reason: &str, events: &mut EventSystem) {
        log::warn!(
            "Navigation to '{}' aborted ({}); staying on '{}'",
            target,
            reason,
            self.current_scene_id().unwrap_or("-")
        );
        self.target = None;
        self.load_requested = false;
        self.phase = TransitionPhase::Idle;
        self.state.transitioning = false;
        self.transition_timer.cancel();

        let event = events
            .stamp(EventType::TransitionAborted)
            .with_scene(target)
            .with_arg("reason", EventArg::Reason(reason.to_string()));
        events.send(event);
    }

    /// Replace the visible scene with the resident `target`
    fn swap(
        &mut self,
        registry: &SceneRegistry,
        lifecycle: &mut SceneLifecycleManager,
        renderer: &mut dyn SceneRenderer,
        events: &mut EventSystem,
        target: &str,
        handle: SceneHandle,
    ) {
        let Some(scene) = registry.by_id(target) else {
            self.abort_transition(target, "scene vanished from the registry", events);
            return;
        };

        // Outgoing markers go before anything is created for the new scene
        self.overlays.clear(renderer);

        if let Err(err) = renderer.activate_scene(handle) {
            self.restore_previous_overlays(registry, lifecycle, renderer);
            if self.phase == TransitionPhase::Startup {
                self.load_failed(target, &err.to_string(), events);
            } else {
                self.abort_transition(target, &err.to_string(), events);
            }
            return;
        }

        if let Err(err) = self.overlays.build(renderer, handle, scene) {
            log::warn!("Scene '{}' is shown without hotspot markers: {}", target, err);
        }

        lifecycle.mark_activated(target);
        self.state.current_scene_id = Some(target.to_string());
        self.set_hotspots_visible(false, events);
        lifecycle.schedule_preload(target);
        self.load_requested = false;

        let event = events
            .stamp(EventType::SceneActivated)
            .with_scene(target)
            .with_arg("floor", EventArg::Floor(scene.floor));
        events.send(event);

        if self.phase == TransitionPhase::Startup {
            log::info!("Showing '{}'", scene.name);
            self.target = None;
            self.phase = TransitionPhase::Idle;
            self.state.transitioning = false;
            self.transition_timer.cancel();
        } else {
            self.phase = TransitionPhase::LeadIn;
            self.transition_timer.arm(self.config.transition_trail);
        }
    }

    fn restore_previous_overlays(
        &mut self,
        registry: &SceneRegistry,
        lifecycle: &SceneLifecycleManager,
        renderer: &mut dyn SceneRenderer,
    ) {
        let Some(current) = self.state.current_scene_id.as_deref() else {
            return;
        };
        let (Some(scene), Some(handle)) = (registry.by_id(current), lifecycle.handle(current)) else {
            return;
        };
        if let Err(err) = self.overlays.build(renderer, handle, scene) {
            log::warn!("Could not restore hotspot markers for '{}': {}", current, err);
        }
    }

    fn finish_transition(&mut self, events: &mut EventSystem) {
        let target = self.target.take();
        self.phase = TransitionPhase::Idle;
        self.state.transitioning = false;
        self.transition_timer.cancel();
        self.transitions_completed += 1;

        if let Some(target) = target {
            log::info!("Arrived at '{}'", target);
            let event = events.stamp(EventType::TransitionFinished).with_scene(target);
            events.send(event);
        }
    }

    /// Remove the visible scene's markers (session teardown)
    pub fn shutdown(&mut self, renderer: &mut dyn SceneRenderer) {
        self.overlays.clear(renderer);
        self.auto_hide.cancel();
        self.transition_timer.cancel();
        self.target = None;
        self.phase = TransitionPhase::Idle;
        self.state.transitioning = false;
        self.state.hotspots_visible = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{GeometryConfig, LifecycleConfig};
    use crate::render::HeadlessRenderer;

    const TOUR: &str = r#"{ "scenes": [
        { "id": "a", "name": "A", "floor": 0, "position": { "x": 0, "y": 0 },
          "linkHotspots": [ { "yaw": 0.1, "pitch": 0, "target": "b" }, { "yaw": 0.2, "pitch": 0, "target": "c" } ] },
        { "id": "b", "name": "B", "floor": 0, "position": { "x": 10, "y": 0 },
          "linkHotspots": [ { "yaw": 3.0, "pitch": 0, "target": "a" } ] },
        { "id": "c", "name": "C", "floor": 1, "position": { "x": 0, "y": 0 } }
    ] }"#;

    struct Fixture {
        registry: SceneRegistry,
        lifecycle: SceneLifecycleManager,
        renderer: HeadlessRenderer,
        events: EventSystem,
        nav: NavigationController,
    }

    impl Fixture {
        fn new(renderer: HeadlessRenderer) -> Self {
            let registry = SceneRegistry::from_json_str(TOUR).unwrap();
            // Keep background preloading out of the way of load counts
            let lifecycle_config = LifecycleConfig::default().with_preload(2, 30.0);
            let lifecycle = SceneLifecycleManager::new(&registry, lifecycle_config, GeometryConfig::default());
            let nav = NavigationController::new(NavigationConfig::default().with_transition(0.3, 0.1).with_auto_hide(5.0));
            Self { registry, lifecycle, renderer, events: EventSystem::new(), nav }
        }

        fn started(renderer: HeadlessRenderer) -> Self {
            let mut fixture = Self::new(renderer);
            fixture.nav.start(&fixture.registry, &mut fixture.lifecycle, &mut fixture.renderer, &mut fixture.events);
            fixture
        }

        fn step(&mut self, dt: f32) {
            self.lifecycle.update(dt, &self.registry, &mut self.renderer, &mut self.events);
            self.nav.update(dt, &self.registry, &mut self.lifecycle, &mut self.renderer, &mut self.events);
        }

        fn navigate(&mut self, id: &str) -> NavigationOutcome {
            self.nav.navigate_to(&self.registry, &mut self.events, id)
        }

        fn run(&mut self, seconds: f32) {
            let steps = (seconds / 0.05).round() as usize;
            for _ in 0..steps {
                self.step(0.05);
            }
        }

        fn saw(&self, event_type: EventType) -> bool {
            self.events.pending().iter().any(|e| e.event_type == event_type)
        }
    }

    #[test]
    fn test_start_shows_first_scene_immediately() {
        let fixture = Fixture::started(HeadlessRenderer::new());

        assert_eq!(fixture.nav.current_scene_id(), Some("a"));
        assert_eq!(fixture.nav.phase(), TransitionPhase::Idle);
        assert!(!fixture.nav.is_transitioning());
        assert_eq!(fixture.renderer.active_scene_id(), Some("a"));
        assert_eq!(fixture.nav.overlays().len(), 2);
    }

    #[test]
    fn test_start_waits_for_slow_load() {
        let mut fixture = Fixture::started(HeadlessRenderer::new().with_load_latency(2));
        assert_eq!(fixture.nav.current_scene_id(), None);
        assert_eq!(fixture.nav.phase(), TransitionPhase::Startup);

        fixture.step(0.016);
        fixture.step(0.016);
        assert_eq!(fixture.nav.current_scene_id(), Some("a"));
        assert_eq!(fixture.renderer.create_calls("a"), 1);
    }

    #[test]
    fn test_start_retries_failed_load() {
        let mut renderer = HeadlessRenderer::new();
        renderer.fail_loads("a", 1);
        let mut fixture = Fixture::started(renderer);
        assert_eq!(fixture.nav.current_scene_id(), None);

        fixture.run(STARTUP_RETRY_DELAY + 0.1);
        assert_eq!(fixture.nav.current_scene_id(), Some("a"));
        assert_eq!(fixture.renderer.create_calls("a"), 2);
    }

    #[test]
    fn test_navigation_runs_lead_out_then_lead_in() {
        let mut fixture = Fixture::started(HeadlessRenderer::new());

        assert_eq!(fixture.navigate("b"), NavigationOutcome::Started);
        assert!(fixture.nav.is_transitioning());
        assert_eq!(fixture.nav.phase(), TransitionPhase::LeadOut);

        fixture.step(0.2);
        assert_eq!(fixture.nav.current_scene_id(), Some("a"));

        fixture.step(0.2);
        assert_eq!(fixture.nav.current_scene_id(), Some("b"));
        assert_eq!(fixture.nav.phase(), TransitionPhase::LeadIn);
        assert!(fixture.nav.is_transitioning());

        fixture.step(0.2);
        assert_eq!(fixture.nav.phase(), TransitionPhase::Idle);
        assert!(!fixture.nav.is_transitioning());
        assert_eq!(fixture.nav.transitions_completed(), 1);
        assert!(fixture.saw(EventType::TransitionFinished));
    }

    #[test]
    fn test_navigation_rejections() {
        let mut fixture = Fixture::started(HeadlessRenderer::new());

        assert_eq!(fixture.navigate("a"), NavigationOutcome::AlreadyCurrent);
        assert_eq!(fixture.navigate("nowhere"), NavigationOutcome::UnknownScene);
        assert_eq!(fixture.navigate("b"), NavigationOutcome::Started);
        assert_eq!(fixture.navigate("c"), NavigationOutcome::Busy);

        fixture.run(1.0);
        assert_eq!(fixture.nav.current_scene_id(), Some("b"));
        assert_eq!(fixture.renderer.create_calls("c"), 0);
    }

    #[test]
    fn test_only_one_overlay_set_after_switch() {
        let mut fixture = Fixture::started(HeadlessRenderer::new());
        fixture.navigate("b");
        fixture.run(1.0);

        let b = fixture.lifecycle.handle("b").unwrap();
        assert_eq!(fixture.renderer.overlay_count(b), 1);
        assert_eq!(fixture.renderer.total_overlay_count(), 1);
        assert_eq!(fixture.nav.overlays().scene_id(), Some("b"));
    }

    #[test]
    fn test_failed_navigation_keeps_previous_scene() {
        let mut renderer = HeadlessRenderer::new();
        renderer.fail_loads("c", 1);
        let mut fixture = Fixture::started(renderer);

        fixture.navigate("c");
        fixture.run(1.0);

        assert_eq!(fixture.nav.current_scene_id(), Some("a"));
        assert!(!fixture.nav.is_transitioning());
        assert_eq!(fixture.nav.phase(), TransitionPhase::Idle);
        assert_eq!(fixture.renderer.total_overlay_count(), 2);
        assert!(fixture.saw(EventType::TransitionAborted));

        // Retried transparently on the next attempt
        assert_eq!(fixture.navigate("c"), NavigationOutcome::Started);
        fixture.run(1.0);
        assert_eq!(fixture.nav.current_scene_id(), Some("c"));
    }

    #[test]
    fn test_failure_after_pending_load_aborts() {
        let mut renderer = HeadlessRenderer::new().with_load_latency(3);
        renderer.fail_loads("b", 1);
        let mut fixture = Fixture::new(renderer);
        fixture.nav.start(&fixture.registry, &mut fixture.lifecycle, &mut fixture.renderer, &mut fixture.events);
        fixture.run(0.5);
        assert_eq!(fixture.nav.current_scene_id(), Some("a"));

        fixture.navigate("b");
        fixture.run(1.0);
        assert_eq!(fixture.nav.current_scene_id(), Some("a"));
        assert!(!fixture.nav.is_transitioning());
        assert_eq!(fixture.renderer.create_calls("b"), 1);
    }

    #[test]
    fn test_switch_hides_hotspots() {
        let mut fixture = Fixture::started(HeadlessRenderer::new());
        assert!(fixture.nav.toggle_hotspot_overlay(&mut fixture.events));

        fixture.navigate("b");
        fixture.run(1.0);
        assert!(!fixture.nav.hotspots_visible());
        assert!(!fixture.nav.auto_hide_timer().is_armed());
    }

    #[test]
    fn test_auto_hide_fires_once() {
        let mut fixture = Fixture::started(HeadlessRenderer::new());
        fixture.nav.toggle_hotspot_overlay(&mut fixture.events);

        fixture.run(4.0);
        assert!(fixture.nav.hotspots_visible());
        fixture.run(1.5);
        assert!(!fixture.nav.hotspots_visible());
    }

    #[test]
    fn test_retoggle_restarts_single_timer() {
        let mut fixture = Fixture::started(HeadlessRenderer::new());
        fixture.nav.toggle_hotspot_overlay(&mut fixture.events);
        fixture.run(3.0);
        fixture.nav.toggle_hotspot_overlay(&mut fixture.events);
        fixture.nav.toggle_hotspot_overlay(&mut fixture.events);

        assert!(fixture.nav.hotspots_visible());
        assert_eq!(fixture.nav.auto_hide_timer().remaining(), Some(5.0));

        // The first countdown would have fired here
        fixture.run(3.0);
        assert!(fixture.nav.hotspots_visible());
        fixture.run(2.5);
        assert!(!fixture.nav.hotspots_visible());
    }

    #[test]
    fn test_toggle_without_scene_is_noop() {
        let mut fixture = Fixture::new(HeadlessRenderer::new());
        assert!(!fixture.nav.toggle_hotspot_overlay(&mut fixture.events));
        assert!(!fixture.nav.auto_hide_timer().is_armed());
    }

    #[test]
    fn test_navigate_by_overlay_index() {
        let mut fixture = Fixture::started(HeadlessRenderer::new());

        let outcome = fixture.nav.navigate_to_overlay(&fixture.registry, &mut fixture.events, 1);
        assert_eq!(outcome, Some(NavigationOutcome::Started));
        assert_eq!(fixture.nav.pending_target(), Some("c"));
        assert_eq!(fixture.nav.navigate_to_overlay(&fixture.registry, &mut fixture.events, 9), None);
    }
}
