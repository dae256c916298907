//! Scene navigation
//!
//! The [`NavigationController`] owns the current scene and the single
//! in-flight transition. Floor selection is a pure function feeding it a
//! target id; hotspot markers are managed per activation by the
//! [`OverlayManager`].

pub mod controller;
pub mod floor;
pub mod overlay;

pub use controller::{NavigationController, NavigationOutcome, NavigationState, TransitionPhase};
pub use floor::pick_scene_for_floor;
pub use overlay::{distance_label, HotspotOverlay, OverlayManager};
