//! Renderer abstraction
//!
//! The tour engine never decodes imagery or projects 3D geometry itself. It
//! decides *which* scene to materialize, *when* to activate it and where its
//! overlay markers go, then hands those decisions to a [`SceneRenderer`].
//! Any panorama engine can sit behind the trait through a thin adapter.

pub mod headless;

pub use headless::HeadlessRenderer;

use crate::core::config::GeometryConfig;
use crate::scene::{Scene, ViewParameters};
use thiserror::Error;

/// Renderer-issued handle to a materialized scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneHandle(pub u64);

/// Renderer-issued handle to an overlay element inside a scene's hotspot container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayHandle(pub u64);

/// Token for an in-flight scene materialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(pub u64);

/// Registration for camera-orientation change notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewSubscription(pub u64);

/// Where the panorama image for a scene comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    /// Path or URL of the equirectangular image
    pub path: String,
}

/// Equirectangular geometry resolution levels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquirectGeometry {
    /// Level widths in pixels, lowest first
    pub levels: Vec<u32>,
}

/// Limits applied to the interactive view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewLimits {
    /// Resolution beyond which zooming stops
    pub max_resolution: u32,
    /// Widest allowed field of view in radians
    pub max_fov: f32,
}

/// Everything a renderer needs to materialize one scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneRequest {
    /// Scene id the request is for
    pub scene_id: String,
    /// Image source
    pub source: ImageSource,
    /// Resolution levels
    pub geometry: EquirectGeometry,
    /// Initial view
    pub view: ViewParameters,
    /// View limiter
    pub limits: ViewLimits,
    /// Keep the lowest level resident so the scene never shows blank
    pub pin_first_level: bool,
}

impl SceneRequest {
    /// Build the request for a scene, applying its per-scene overrides
    pub fn for_scene(scene: &Scene, geometry: &GeometryConfig) -> Self {
        Self {
            scene_id: scene.id.clone(),
            source: ImageSource { path: geometry.image_path(&scene.id) },
            geometry: EquirectGeometry {
                levels: scene
                    .geometry
                    .levels
                    .clone()
                    .unwrap_or_else(|| geometry.resolution_levels.clone()),
            },
            view: scene.initial_view,
            limits: ViewLimits {
                max_resolution: scene.geometry.face_size.unwrap_or(geometry.max_view_resolution),
                max_fov: geometry.max_fov_radians(),
            },
            pin_first_level: true,
        }
    }
}

/// Placement of an overlay element on the panorama sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HotspotPlacement {
    /// Horizontal angle
    pub yaw: f32,
    /// Vertical angle
    pub pitch: f32,
}

/// Result of polling an in-flight load
#[derive(Debug, Clone, PartialEq)]
pub enum LoadPoll {
    /// Still fetching or decoding
    Pending,
    /// Materialized and ready to activate
    Ready(SceneHandle),
    /// Materialization failed; the ticket is spent
    Failed(SceneLoadError),
}

/// Required rendering capability missing from the host
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    /// A named capability is unavailable
    #[error("rendering capability '{0}' is not available; enable hardware acceleration or use a supported viewer")]
    Missing(String),
}

/// Per-scene materialization failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneLoadError {
    /// Id not in the registry
    #[error("scene '{0}' is not part of this tour")]
    UnknownScene(String),

    /// The renderer could not build the scene
    #[error("failed to load scene '{scene}': {reason}")]
    Materialize {
        /// Scene id
        scene: String,
        /// Renderer-provided reason
        reason: String,
    },
}

/// Failures of operations on already materialized scenes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// Handle no longer refers to a materialized scene
    #[error("scene handle {0:?} is not materialized")]
    StaleScene(SceneHandle),

    /// Overlay element could not be created
    #[error("could not create overlay element: {0}")]
    Overlay(String),
}

/// Narrow capability interface over a panorama rendering engine
///
/// # Threading
/// Not `Send + Sync`: the engine runs on the host's single UI/event thread.
pub trait SceneRenderer {
    /// Report missing host capabilities before anything else is attempted
    fn check_capabilities(&self) -> Result<(), CapabilityError>;

    /// Start materializing a scene
    fn create_scene(&mut self, request: &SceneRequest) -> Result<LoadTicket, SceneLoadError>;

    /// Check on an in-flight materialization
    fn poll_scene(&mut self, ticket: LoadTicket) -> LoadPoll;

    /// Abandon an in-flight materialization; the ticket is dead afterwards
    fn cancel_load(&mut self, ticket: LoadTicket);

    /// Release everything the renderer holds for a scene
    fn destroy_scene(&mut self, handle: SceneHandle);

    /// Make a materialized scene the visible one
    fn activate_scene(&mut self, handle: SceneHandle) -> Result<(), RenderError>;

    /// Add an overlay element to a scene's hotspot container
    fn create_overlay_element(
        &mut self,
        scene: SceneHandle,
        placement: HotspotPlacement,
    ) -> Result<OverlayHandle, RenderError>;

    /// Remove an overlay element from a scene's hotspot container
    fn destroy_overlay_element(&mut self, scene: SceneHandle, element: OverlayHandle);

    /// Live camera yaw of the active view, `None` while no view exists
    fn view_bearing(&self) -> Option<f32>;

    /// Register for camera-orientation change notifications
    ///
    /// Returns `None` while no view exists. The host forwards each change to
    /// [`TourEngine::on_view_changed`](crate::TourEngine::on_view_changed)
    /// together with the subscription it belongs to.
    fn subscribe_view_changes(&mut self) -> Option<ViewSubscription>;

    /// Cancel a view-change registration
    fn unsubscribe_view_changes(&mut self, subscription: ViewSubscription);
}
