//! Scene data and residency
//!
//! ## Architecture
//!
//! ```text
//! Tour document (JSON)
//!      ↓
//! Scene Registry (immutable catalog)
//!      ↓
//! Scene Lifecycle Manager (load state, preloading, eviction)
//!      ↓
//! Renderer (materialized scenes)
//! ```
//!
//! The registry is read-only after load. The lifecycle manager owns every
//! load-state transition and is the only component that creates or
//! destroys renderer scenes.

pub mod document;
pub mod lifecycle;
pub mod registry;

pub use document::{HotspotDocument, LevelDocument, PositionDocument, SceneDocument, TourDocument, ViewDocument};
pub use lifecycle::{LoadProgress, LoadState, SceneLifecycleManager};
pub use registry::{DanglingReference, GeometryOverride, LinkHotspot, Scene, SceneRegistry, ViewParameters};
