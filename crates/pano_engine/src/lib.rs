//! # Pano Engine
//!
//! Scene navigation and lifecycle engine for panoramic building tours.
//!
//! ## Features
//!
//! - **Scene Registry**: Immutable scene graph loaded from a JSON tour document
//! - **Lifecycle Management**: Coalesced async loads, neighbor preloading, LRU eviction
//! - **Navigation**: Single-transition state machine with hotspot auto-hide
//! - **Floor Selection**: Nearest-scene picking across building levels
//! - **Minimap**: Flat overhead projection with live camera heading
//!
//! The engine never draws anything itself. It talks to a panorama renderer
//! through the [`render::SceneRenderer`] trait and exposes plain view models
//! for the host UI.
//!
//! ## Quick Start
//!
//! ```rust
//! use pano_engine::prelude::*;
//!
//! let document = TourDocument::from_json_str(r#"{ "scenes": [
//!     { "id": "lobby", "name": "Lobby", "floor": 0, "position": { "x": 0, "y": 0 },
//!       "linkHotspots": [ { "yaw": 0.5, "pitch": 0, "target": "hall" } ] },
//!     { "id": "hall", "name": "Hall", "floor": 0, "position": { "x": 5, "y": 0 } }
//! ] }"#)?;
//!
//! let mut engine = TourEngine::new(document, TourSettings::default(), HeadlessRenderer::new())?;
//! assert_eq!(engine.current_scene().map(|s| s.id.as_str()), Some("lobby"));
//!
//! engine.navigate_to("hall");
//! for _ in 0..60 {
//!     engine.update(1.0 / 60.0);
//! }
//! assert_eq!(engine.current_scene().map(|s| s.id.as_str()), Some("hall"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Configuration
pub mod config;
pub mod core;

// Low-level utilities
pub mod events;
pub mod foundation;

// Subsystems
pub mod minimap;
pub mod navigation;
pub mod render;
pub mod scene;
pub mod ui;

mod engine;

pub use engine::{EngineError, TourEngine};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        core::config::{GeometryConfig, LifecycleConfig, MinimapConfig, NavigationConfig, TourSettings},
        events::{Event, EventHandler, EventSystem, EventType},
        foundation::memory::MemoryUsage,
        minimap::MinimapFrame,
        navigation::{NavigationOutcome, NavigationState},
        render::{HeadlessRenderer, SceneRenderer},
        scene::{LoadState, Scene, SceneRegistry, TourDocument},
        ui::{FloorButton, HotspotMarker, LocationPanel},
        EngineError, TourEngine,
    };
}

#[cfg(test)]
mod tests;
