//! Host-facing view models
//!
//! Plain data describing what a host UI should draw: floor buttons, the
//! location panel, hotspot markers and the tap hint. Nothing here draws;
//! hosts render these however they like.

pub mod hint;
pub mod panels;

pub use hint::{TapHint, TAP_HINT_TEXT};
pub use panels::{floor_buttons, floor_label, hotspot_markers, FloorButton, HotspotMarker, LocationPanel};
