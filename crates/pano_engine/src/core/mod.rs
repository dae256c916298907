//! # Core Engine Module
//!
//! Shared configuration used by every subsystem of the tour engine.
//!
//! ## Organization
//!
//! - **Config**: Unified settings for lifecycle, navigation, geometry and minimap
//! - **Foundation**: Low-level utilities (math, time, memory, logging)

pub mod config;

// Re-export foundation modules for convenience
pub use crate::foundation;

// Re-export commonly used config types
pub use config::{
    TourSettings,
    LifecycleConfig,
    NavigationConfig,
    GeometryConfig,
    MinimapConfig,
    Config,
    ConfigError,
};
