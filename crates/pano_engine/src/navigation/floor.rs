//! Floor selection

use crate::foundation::math::distance;
use crate::scene::Scene;

/// Pick the destination scene when the user selects `floor`
///
/// - No scenes on the floor: `None` (stay where you are)
/// - No current scene: the first scene on the floor in registry order
/// - Otherwise: the scene nearest to the current one in world space, the
///   earliest in registry order winning ties
///
/// The current scene is an eligible candidate, so re-selecting the current
/// floor picks the current scene.
pub fn pick_scene_for_floor<'a>(
    floor: i32,
    current: Option<&Scene>,
    scenes_on_floor: &[&'a Scene],
) -> Option<&'a Scene> {
    let mut candidates = scenes_on_floor.iter().copied().filter(|scene| scene.floor == floor);

    let Some(current) = current else {
        return candidates.next();
    };

    let mut best: Option<(&Scene, f32)> = None;
    for scene in candidates {
        let d = distance(&current.position, &scene.position);
        match best {
            Some((_, best_distance)) if d >= best_distance => {}
            _ => best = Some((scene, d)),
        }
    }
    best.map(|(scene, _)| scene)
}
