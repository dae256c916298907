//! Floor picking over a whole registry and through the engine

use super::*;
use crate::foundation::math::distance;
use crate::navigation::{pick_scene_for_floor, NavigationOutcome};
use crate::scene::SceneRegistry;

const ABC: &str = r#"{ "scenes": [
    { "id": "A", "name": "A", "floor": 0, "position": { "x": 0, "y": 0, "z": 0 },
      "linkHotspots": [ { "yaw": 0, "pitch": 0, "target": "B" } ] },
    { "id": "B", "name": "B", "floor": 0, "position": { "x": 10, "y": 0, "z": 0 } },
    { "id": "C", "name": "C", "floor": 1, "position": { "x": 0, "y": 0, "z": 0 } }
] }"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_scene_on_every_floor_without_current() {
        let registry = SceneRegistry::load(building()).unwrap();

        for floor in registry.distinct_floors() {
            let scenes = registry.scenes_on_floor(floor);
            let picked = pick_scene_for_floor(floor, None, &scenes).unwrap();
            assert_eq!(picked.id, scenes[0].id, "floor {floor}");
        }
    }

    #[test]
    fn test_pick_is_nearest_and_first_among_ties() {
        let registry = SceneRegistry::load(building()).unwrap();

        for current in registry.all_scenes() {
            for floor in registry.distinct_floors() {
                let scenes = registry.scenes_on_floor(floor);
                let picked = pick_scene_for_floor(floor, Some(current), &scenes).unwrap();

                let distances: Vec<f32> = scenes
                    .iter()
                    .map(|s| distance(&current.position, &s.position))
                    .collect();
                let best = distances.iter().copied().fold(f32::INFINITY, f32::min);
                let first_best = distances.iter().position(|d| *d == best).unwrap();

                assert_eq!(picked.id, scenes[first_best].id, "from {} to floor {}", current.id, floor);
            }
        }
    }

    #[test]
    fn test_equidistant_rooms_resolve_to_registry_order() {
        let registry = SceneRegistry::load(building()).unwrap();
        let lobby = registry.by_id("lobby").unwrap();

        // studio and loft are both 20 away from the lobby
        let picked = pick_scene_for_floor(1, Some(lobby), &registry.scenes_on_floor(1)).unwrap();
        assert_eq!(picked.id, "studio");
    }

    #[test]
    fn test_abc_example() {
        let registry = SceneRegistry::from_json_str(ABC).unwrap();
        let a = registry.by_id("A").unwrap();

        // The current scene stays eligible on its own floor
        assert_eq!(pick_scene_for_floor(0, Some(a), &registry.scenes_on_floor(0)).unwrap().id, "A");
        assert_eq!(pick_scene_for_floor(1, Some(a), &registry.scenes_on_floor(1)).unwrap().id, "C");
    }

    #[test]
    fn test_engine_floor_selection() {
        let document = TourDocument::from_json_str(ABC).unwrap();
        let mut engine = TourEngine::new(document, TourSettings::default(), HeadlessRenderer::new()).unwrap();

        assert_eq!(engine.select_floor(0), Some(NavigationOutcome::AlreadyCurrent));
        assert_eq!(engine.select_floor(7), None);
        assert_eq!(engine.select_floor(1), Some(NavigationOutcome::Started));
        settle(&mut engine);
        assert_eq!(engine.current_scene().unwrap().id, "C");
    }

    #[test]
    fn test_floor_buttons_track_current_floor() {
        let mut engine = start(TourSettings::default(), HeadlessRenderer::new());

        let buttons = engine.floor_buttons();
        let labels: Vec<&str> = buttons.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Basement 1", "Ground", "Level 1"]);
        assert!(buttons[1].active);

        engine.select_floor(-1);
        settle(&mut engine);
        let buttons = engine.floor_buttons();
        assert!(buttons[0].active);
        assert!(!buttons[1].active);
    }
}
