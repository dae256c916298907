//! # Unified Configuration System
//!
//! All tunables of the tour engine in one place. Every section has defaults,
//! so a settings file only needs to name the values it changes.
//!
//! ## Configuration Categories
//!
//! - **Lifecycle Config**: resident scene ceiling, neighbor preloading
//! - **Navigation Config**: transition pacing, hotspot auto-hide, tap hint
//! - **Geometry Config**: resolution levels, view limits, image path convention
//! - **Minimap Config**: canvas size, margin and marker sizes

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError};

/// # Lifecycle Configuration
///
/// Bounds the resident scene cache and controls background preloading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Maximum number of scenes kept materialized at once
    pub max_resident_scenes: usize,
    /// How many directly linked neighbors to preload after a switch
    pub preload_count: usize,
    /// Seconds between a scene switch and the start of neighbor preloading
    pub preload_delay: f32,
    /// Usage ratio above which a memory sample counts as pressure
    pub memory_pressure_threshold: f32,
}

impl LifecycleConfig {
    /// Set the resident ceiling
    pub fn with_max_resident(mut self, max_resident_scenes: usize) -> Self {
        self.max_resident_scenes = max_resident_scenes;
        self
    }

    /// Configure preloading
    pub fn with_preload(mut self, count: usize, delay: f32) -> Self {
        self.preload_count = count;
        self.preload_delay = delay;
        self
    }

    /// Validate ranges
    pub fn validate(&self) -> Result<(), String> {
        // The active scene plus the incoming one must fit during a switch
        if self.max_resident_scenes < 2 {
            return Err(format!(
                "lifecycle.max_resident_scenes must be at least 2, got {}",
                self.max_resident_scenes
            ));
        }
        if self.preload_count > self.max_resident_scenes {
            return Err(format!(
                "lifecycle.preload_count ({}) exceeds lifecycle.max_resident_scenes ({})",
                self.preload_count, self.max_resident_scenes
            ));
        }
        if self.preload_delay < 0.0 {
            return Err("lifecycle.preload_delay must not be negative".to_string());
        }
        if !(0.0..=1.0).contains(&self.memory_pressure_threshold) {
            return Err("lifecycle.memory_pressure_threshold must be between 0 and 1".to_string());
        }
        Ok(())
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            max_resident_scenes: 5,
            preload_count: 2,
            preload_delay: 1.0,
            memory_pressure_threshold: 0.75,
        }
    }
}

/// # Navigation Configuration
///
/// Fixed delays used to pace scene switches and overlay visibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Seconds of transition animation before the scene swap
    pub transition_lead: f32,
    /// Seconds of transition animation after the scene swap
    pub transition_trail: f32,
    /// Seconds before visible hotspots hide themselves
    pub hotspot_auto_hide: f32,
    /// Seconds after the first scene appears before the tap hint shows
    pub tap_hint_delay: f32,
    /// Seconds the tap hint stays visible
    pub tap_hint_duration: f32,
}

impl NavigationConfig {
    /// Set transition pacing
    pub fn with_transition(mut self, lead: f32, trail: f32) -> Self {
        self.transition_lead = lead;
        self.transition_trail = trail;
        self
    }

    /// Set hotspot auto-hide duration
    pub fn with_auto_hide(mut self, seconds: f32) -> Self {
        self.hotspot_auto_hide = seconds;
        self
    }

    /// Validate ranges
    pub fn validate(&self) -> Result<(), String> {
        let durations = [
            ("navigation.transition_lead", self.transition_lead),
            ("navigation.transition_trail", self.transition_trail),
            ("navigation.hotspot_auto_hide", self.hotspot_auto_hide),
            ("navigation.tap_hint_delay", self.tap_hint_delay),
            ("navigation.tap_hint_duration", self.tap_hint_duration),
        ];
        for (name, value) in durations {
            if value < 0.0 || !value.is_finite() {
                return Err(format!("{name} must be a non-negative number of seconds"));
            }
        }
        Ok(())
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            transition_lead: 0.3,
            transition_trail: 0.1,
            hotspot_auto_hide: 5.0,
            tap_hint_delay: 1.0,
            tap_hint_duration: 3.0,
        }
    }
}

/// # Geometry Configuration
///
/// What the renderer is told about each panorama: where its image lives,
/// which resolution levels to build, and how far the view may zoom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Equirectangular resolution levels, lowest first
    pub resolution_levels: Vec<u32>,
    /// Maximum resolution used by the view limiter
    pub max_view_resolution: u32,
    /// Maximum field of view in degrees
    pub max_fov_degrees: f32,
    /// Image path template; `{id}` is replaced with the scene id
    pub image_path_template: String,
}

impl GeometryConfig {
    /// Resolve the image path for a scene id
    pub fn image_path(&self, scene_id: &str) -> String {
        self.image_path_template.replace("{id}", scene_id)
    }

    /// Maximum field of view in radians
    pub fn max_fov_radians(&self) -> f32 {
        self.max_fov_degrees.to_radians()
    }

    /// Validate ranges
    pub fn validate(&self) -> Result<(), String> {
        if self.resolution_levels.is_empty() {
            return Err("geometry.resolution_levels must list at least one level".to_string());
        }
        if self.resolution_levels.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err("geometry.resolution_levels must be strictly increasing".to_string());
        }
        if self.max_fov_degrees <= 0.0 || self.max_fov_degrees >= 180.0 {
            return Err("geometry.max_fov_degrees must be between 0 and 180".to_string());
        }
        if !self.image_path_template.contains("{id}") {
            return Err("geometry.image_path_template must contain '{id}'".to_string());
        }
        Ok(())
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            resolution_levels: vec![512, 1024, 2048, 4096],
            max_view_resolution: 2048,
            max_fov_degrees: 100.0,
            image_path_template: "images/{id}-pano.jpg".to_string(),
        }
    }
}

/// # Minimap Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinimapConfig {
    /// Square canvas edge length in pixels
    pub canvas_size: f32,
    /// Blank border kept around the projected layout
    pub margin: f32,
    /// Radius of ordinary scene markers
    pub point_radius: f32,
    /// Radius of the current scene marker
    pub current_point_radius: f32,
    /// Length of the facing-direction segment
    pub heading_length: f32,
}

impl MinimapConfig {
    /// Width and height available for the layout once margins are removed
    pub fn drawable_size(&self) -> f32 {
        self.canvas_size - 2.0 * self.margin
    }

    /// Validate ranges
    pub fn validate(&self) -> Result<(), String> {
        if self.margin < 0.0 {
            return Err("minimap.margin must not be negative".to_string());
        }
        if self.drawable_size() <= 0.0 {
            return Err(format!(
                "minimap.canvas_size ({}) must exceed twice minimap.margin ({})",
                self.canvas_size, self.margin
            ));
        }
        Ok(())
    }
}

impl Default for MinimapConfig {
    fn default() -> Self {
        Self {
            canvas_size: 180.0,
            margin: 20.0,
            point_radius: 3.0,
            current_point_radius: 6.0,
            heading_length: 10.0,
        }
    }
}

/// # Complete Tour Settings
///
/// Top-level configuration handed to the engine at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TourSettings {
    /// Scene cache and preloading
    pub lifecycle: LifecycleConfig,
    /// Transition pacing
    pub navigation: NavigationConfig,
    /// Renderer geometry hints
    pub geometry: GeometryConfig,
    /// Overhead map layout
    pub minimap: MinimapConfig,
}

impl TourSettings {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.lifecycle.validate().map_err(ConfigError::Invalid)?;
        self.navigation.validate().map_err(ConfigError::Invalid)?;
        self.geometry.validate().map_err(ConfigError::Invalid)?;
        self.minimap.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }
}

impl Config for TourSettings {}
