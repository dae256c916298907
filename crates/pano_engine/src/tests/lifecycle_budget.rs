//! Resident-set ceiling, load coalescing and memory pressure

use super::*;
use crate::core::config::LifecycleConfig;
use crate::foundation::memory::MemoryUsage;
use crate::scene::LoadState;

const ROUTE: [&str; 11] = [
    "hall", "office", "lobby", "landing", "studio", "landing", "loft", "landing", "lobby", "cellar", "lobby",
];

fn settings(lifecycle: LifecycleConfig) -> TourSettings {
    TourSettings { lifecycle, ..TourSettings::default() }
}

fn assert_within_budget(engine: &TourEngine<HeadlessRenderer>, ceiling: usize) {
    let resident = engine.lifecycle().resident_count();
    assert!(resident <= ceiling, "{resident} scenes resident, ceiling {ceiling}");
    assert_eq!(engine.renderer().materialized_count(), resident);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resident_ceiling_holds_on_every_frame() {
        let lifecycle = LifecycleConfig::default().with_max_resident(3).with_preload(2, 0.2);
        let mut engine = start(settings(lifecycle), HeadlessRenderer::new().with_load_latency(2));
        run(&mut engine, 0.5);

        for target in ROUTE {
            assert_eq!(engine.navigate_to(target), crate::navigation::NavigationOutcome::Started);
            for _ in 0..90 {
                engine.update(FRAME);
                assert_within_budget(&engine, 3);
            }
            assert_eq!(engine.current_scene().unwrap().id, target);
        }
    }

    #[test]
    fn test_revisits_reuse_resident_scenes() {
        let mut engine = start(TourSettings::default(), HeadlessRenderer::new());

        walk_to(&mut engine, "hall");
        walk_to(&mut engine, "lobby");
        walk_to(&mut engine, "hall");

        assert_eq!(engine.renderer().create_calls("lobby"), 1);
        assert_eq!(engine.renderer().create_calls("hall"), 1);
    }

    #[test]
    fn test_navigation_joins_preload_in_flight() {
        let lifecycle = LifecycleConfig::default().with_preload(2, 0.0);
        let mut engine = start(settings(lifecycle), HeadlessRenderer::new().with_load_latency(30));

        // Wait for the lobby, then for the preload of its first neighbors to start
        run(&mut engine, 0.6);
        assert_eq!(engine.current_scene().unwrap().id, "lobby");
        assert_eq!(engine.lifecycle().state("hall"), Some(LoadState::Loading));

        walk_to(&mut engine, "hall");
        assert_eq!(engine.renderer().create_calls("hall"), 1);
    }

    #[test]
    fn test_preload_loads_first_neighbors_only() {
        let lifecycle = LifecycleConfig::default().with_preload(2, 0.5);
        let mut engine = start(settings(lifecycle), HeadlessRenderer::new());
        run(&mut engine, 1.0);

        assert_eq!(engine.lifecycle().resident_ids(), vec!["lobby", "hall", "office"]);
        assert_eq!(engine.lifecycle().state("landing"), Some(LoadState::Unloaded));
    }

    #[test]
    fn test_memory_pressure_releases_all_but_current() {
        let mut engine = start(TourSettings::default(), HeadlessRenderer::new());
        walk_to(&mut engine, "hall");
        run(&mut engine, 1.5);
        assert!(engine.lifecycle().resident_count() > 1);

        assert!(engine.on_memory_pressure(MemoryUsage::new(300, 1000)).is_empty());
        let evicted = engine.on_memory_pressure(MemoryUsage::new(950, 1000));

        assert!(!evicted.is_empty());
        assert_eq!(engine.lifecycle().resident_ids(), vec!["hall"]);
        assert_eq!(engine.renderer().total_overlay_count(), 2);

        // Evicted scenes load again on demand
        walk_to(&mut engine, "lobby");
        assert_eq!(engine.renderer().create_calls("lobby"), 2);
    }

    #[test]
    fn test_shutdown_releases_everything() {
        let mut engine = start(TourSettings::default(), HeadlessRenderer::new());
        walk_to(&mut engine, "hall");
        run(&mut engine, 1.5);

        let renderer = engine.shutdown();
        assert_eq!(renderer.materialized_count(), 0);
        assert_eq!(renderer.total_overlay_count(), 0);
        assert_eq!(renderer.subscription_count(), 0);
        assert_eq!(renderer.pending_count(), 0);
    }

    #[test]
    fn test_shutdown_during_slow_load_leaves_nothing_pending() {
        let mut engine = start(TourSettings::default(), HeadlessRenderer::new().with_load_latency(2));
        run(&mut engine, 0.5);
        assert_eq!(engine.navigate_to("cellar"), crate::navigation::NavigationOutcome::Started);
        for _ in 0..300 {
            if engine.lifecycle().state("cellar") == Some(LoadState::Loading) {
                break;
            }
            engine.update(FRAME);
        }
        assert_eq!(engine.lifecycle().state("cellar"), Some(LoadState::Loading));

        let renderer = engine.shutdown();
        assert_eq!(renderer.pending_count(), 0);
        assert_eq!(renderer.materialized_count(), 0);
    }
}
