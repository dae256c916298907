//! End-to-end tests of the tour engine against the headless renderer

mod floor_selection;
mod lifecycle_budget;

use crate::core::config::TourSettings;
use crate::render::HeadlessRenderer;
use crate::scene::TourDocument;
use crate::TourEngine;

/// Simulated frame length
pub(crate) const FRAME: f32 = 1.0 / 60.0;

/// Three floors: a ground floor loop, an upper floor with two equidistant
/// rooms and a single far-away basement scene.
pub(crate) const BUILDING: &str = r#"{ "scenes": [
    { "id": "lobby", "name": "Lobby", "floor": 0, "position": { "x": 0, "y": 0, "z": 0 },
      "initialViewParameters": { "yaw": 0.0, "pitch": 0.0, "fov": 1.5 },
      "linkHotspots": [
          { "yaw": 0.0, "pitch": 0.0, "target": "hall", "distance": 10 },
          { "yaw": 0.8, "pitch": 0.0, "target": "office" },
          { "yaw": 1.6, "pitch": 0.3, "target": "landing", "distance": 25 },
          { "yaw": 3.1, "pitch": -0.4, "target": "cellar" } ] },
    { "id": "hall", "name": "Hall", "floor": 0, "position": { "x": 10, "y": 0, "z": 0 },
      "linkHotspots": [
          { "yaw": 3.1, "pitch": 0.0, "target": "lobby" },
          { "yaw": 1.5, "pitch": 0.0, "target": "office" } ] },
    { "id": "office", "name": "Office", "floor": 0, "position": { "x": 10, "y": 8, "z": 0 },
      "linkHotspots": [
          { "yaw": -1.5, "pitch": 0.0, "target": "hall" },
          { "yaw": 2.4, "pitch": 0.0, "target": "lobby" } ] },
    { "id": "landing", "name": "Landing", "floor": 1, "position": { "x": 0, "y": 25, "z": 3 },
      "linkHotspots": [
          { "yaw": 0.0, "pitch": -0.3, "target": "lobby" },
          { "yaw": 1.0, "pitch": 0.0, "target": "studio" },
          { "yaw": -1.0, "pitch": 0.0, "target": "loft" } ] },
    { "id": "studio", "name": "Studio", "floor": 1, "position": { "x": 20, "y": 0, "z": 0 },
      "linkHotspots": [ { "yaw": 2.0, "pitch": 0.0, "target": "landing" } ] },
    { "id": "loft", "name": "Loft", "floor": 1, "position": { "x": -20, "y": 0, "z": 0 },
      "linkHotspots": [ { "yaw": -2.0, "pitch": 0.0, "target": "landing" } ] },
    { "id": "cellar", "name": "Cellar", "floor": -1, "position": { "x": 1000000, "y": -500000, "z": 0 },
      "linkHotspots": [ { "yaw": 0.0, "pitch": 0.5, "target": "lobby" } ] }
] }"#;

pub(crate) fn building() -> TourDocument {
    TourDocument::from_json_str(BUILDING).unwrap()
}

pub(crate) fn start(settings: TourSettings, renderer: HeadlessRenderer) -> TourEngine<HeadlessRenderer> {
    TourEngine::new(building(), settings, renderer).unwrap()
}

/// Run whole frames for roughly `seconds`
pub(crate) fn run(engine: &mut TourEngine<HeadlessRenderer>, seconds: f32) {
    let frames = (seconds / FRAME).round() as usize;
    for _ in 0..frames {
        engine.update(FRAME);
    }
}

/// Run frames until no transition is in flight
pub(crate) fn settle(engine: &mut TourEngine<HeadlessRenderer>) {
    for _ in 0..600 {
        if !engine.navigation_state().transitioning {
            return;
        }
        engine.update(FRAME);
    }
    panic!("transition did not settle within ten seconds");
}

/// Navigate to `id` and wait for the switch to finish
pub(crate) fn walk_to(engine: &mut TourEngine<HeadlessRenderer>, id: &str) {
    let outcome = engine.navigate_to(id);
    assert_eq!(outcome, crate::navigation::NavigationOutcome::Started, "navigating to {id}");
    settle(engine);
    assert_eq!(engine.navigation_state().current_scene_id.as_deref(), Some(id));
}
