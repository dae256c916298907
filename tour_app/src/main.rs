//! Scripted walkthrough of a panorama tour
//!
//! Drives the tour engine against the headless renderer, printing the
//! location panel, floor selector and an ASCII minimap after every step.
//!
//! ```text
//! tour_walkthrough [TOUR_JSON] [SETTINGS_TOML_OR_RON]
//! ```

mod ascii;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pano_engine::foundation::logging;
use pano_engine::prelude::*;
use thiserror::Error;

const FRAME: f32 = 1.0 / 60.0;
const MINIMAP_COLS: usize = 36;
const MINIMAP_ROWS: usize = 14;
/// Polls a simulated image fetch stays pending
const LOAD_LATENCY: u32 = 12;

#[derive(Error, Debug)]
enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("usage: tour_walkthrough [TOUR_JSON] [SETTINGS_TOML_OR_RON]")]
    Usage,
}

/// One scripted user action
#[derive(Debug, Clone, Copy)]
enum Step {
    Click(usize),
    Floor(i32),
    Goto(&'static str),
    ToggleHotspots,
    Turn(f32),
    MemorySample { used_mb: u64, limit_mb: u64 },
    Wait(f32),
}

const SCRIPT: &[Step] = &[
    Step::Wait(1.5),
    Step::ToggleHotspots,
    Step::Click(0),
    Step::Turn(1.2),
    Step::Floor(1),
    Step::Turn(-0.6),
    Step::Click(1),
    Step::Floor(0),
    Step::MemorySample { used_mb: 880, limit_mb: 1024 },
    Step::Floor(-1),
    Step::Goto("entrance"),
    Step::ToggleHotspots,
    Step::Wait(6.0),
];

struct WalkthroughApp {
    engine: TourEngine<HeadlessRenderer>,
}

impl WalkthroughApp {
    fn new(tour_path: &Path, settings_path: Option<&Path>) -> Result<Self, AppError> {
        log::info!("Loading tour from {}", tour_path.display());
        let document = TourDocument::load_from_file(tour_path)?;
        let settings = match settings_path {
            Some(path) => {
                log::info!("Loading settings from {}", path.display());
                TourSettings::load_from_file(path)?
            }
            None => TourSettings::default(),
        };

        let renderer = HeadlessRenderer::new().with_load_latency(LOAD_LATENCY);
        let mut engine = TourEngine::new(document, settings, renderer)?;
        engine.events_mut().register_handler(EventType::SceneActivated, Box::new(ArrivalLogger));
        engine.events_mut().register_handler(EventType::TransitionAborted, Box::new(ArrivalLogger));

        Ok(Self { engine })
    }

    fn run(&mut self) {
        self.settle();
        self.print_status("start");

        for step in SCRIPT {
            self.apply(*step);
            self.settle();
            self.print_status(&format!("{step:?}"));
        }
    }

    fn apply(&mut self, step: Step) {
        match step {
            Step::Click(index) => {
                if let Some(marker) = self.engine.hotspot_markers().get(index) {
                    println!("> following marker {} to {}", index, marker.target_name);
                }
                if self.engine.click_hotspot(index).is_none() {
                    println!("> no marker at index {index}");
                }
            }
            Step::Floor(floor) => {
                let outcome = self.engine.select_floor(floor);
                println!("> floor {floor}: {outcome:?}");
            }
            Step::Goto(id) => {
                let outcome = self.engine.navigate_to(id);
                println!("> go to {id}: {outcome:?}");
            }
            Step::ToggleHotspots => {
                let visible = self.engine.toggle_hotspots();
                println!("> hotspots {}", if visible { "shown" } else { "hidden" });
            }
            Step::Turn(yaw) => {
                for subscription in self.engine.renderer_mut().turn_camera(yaw) {
                    self.engine.on_view_changed(subscription, yaw);
                }
            }
            Step::MemorySample { used_mb, limit_mb } => {
                let released = self.engine.on_memory_pressure(MemoryUsage::new(used_mb, limit_mb));
                println!("> memory {used_mb}/{limit_mb} MB: released {released:?}");
            }
            Step::Wait(seconds) => self.advance(seconds),
        }
    }

    fn advance(&mut self, seconds: f32) {
        let frames = (seconds / FRAME).round() as usize;
        for _ in 0..frames {
            self.engine.update(FRAME);
        }
    }

    /// Run frames until the current transition is over
    fn settle(&mut self) {
        let mut frames = 0;
        while self.engine.navigation_state().transitioning && frames < 600 {
            self.engine.update(FRAME);
            frames += 1;
        }
        if frames == 600 {
            log::warn!("Transition still running after {} frames", frames);
        }
    }

    fn print_status(&self, label: &str) {
        println!();
        println!("== {label} (t = {:.2}s)", self.engine.elapsed());

        match self.engine.location_panel() {
            Some(panel) => println!("{panel}"),
            None => println!("(no scene yet)"),
        }

        let floors: Vec<String> = self
            .engine
            .floor_buttons()
            .iter()
            .map(|b| if b.active { format!("[{}]", b.label) } else { b.label.clone() })
            .collect();
        println!("Floors: {}", floors.join("  "));

        let state = self.engine.navigation_state();
        if state.hotspots_visible {
            for marker in self.engine.hotspot_markers() {
                let distance = marker.distance_label.unwrap_or_default();
                println!("  ({}) -> {} {}", marker.index, marker.target_name, distance);
            }
        }
        if self.engine.tap_hint_visible() {
            println!("  {}", pano_engine::ui::TAP_HINT_TEXT);
        }

        let lifecycle = self.engine.lifecycle();
        println!(
            "Resident: {:?} (loading {})",
            lifecycle.resident_ids(),
            lifecycle.loading_count()
        );

        if let Some(frame) = self.engine.minimap() {
            println!("{}", ascii::render_minimap(frame, MINIMAP_COLS, MINIMAP_ROWS));
        }
    }

    fn shutdown(self) {
        let renderer = self.engine.shutdown();
        log::info!("Renderer activated {} scenes", renderer.activation_log().len());
    }
}

/// Logs arrivals and aborted switches
struct ArrivalLogger;

impl EventHandler for ArrivalLogger {
    fn on_event(&mut self, event: &Event) -> bool {
        match event.event_type {
            EventType::SceneActivated => log::info!(
                "Arrived at '{}' (floor {})",
                event.get_scene_id().unwrap_or("?"),
                event.get_floor().unwrap_or_default()
            ),
            EventType::TransitionAborted => log::warn!(
                "Could not reach '{}': {}",
                event.get_scene_id().unwrap_or("?"),
                event.get_reason().unwrap_or("unknown")
            ),
            _ => {}
        }
        false
    }
}

fn asset_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("assets").join(name)
}

fn parse_args() -> Result<(PathBuf, Option<PathBuf>), AppError> {
    let mut args = std::env::args().skip(1);
    let tour = args.next().map_or_else(|| asset_path("tour.json"), PathBuf::from);
    let settings = args.next().map(PathBuf::from);
    if args.next().is_some() {
        return Err(AppError::Usage);
    }
    Ok((tour, settings.or_else(|| Some(asset_path("settings.toml")))))
}

fn run() -> Result<(), AppError> {
    let (tour, settings) = parse_args()?;
    let mut app = WalkthroughApp::new(&tour, settings.as_deref())?;
    app.run();
    app.shutdown();
    Ok(())
}

fn main() -> ExitCode {
    logging::init();
    log::info!("Starting tour walkthrough");

    match run() {
        Ok(()) => {
            log::info!("Walkthrough finished successfully");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("Walkthrough failed: {}", err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
