//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and distance helpers
//! - Memory usage sampling for cache pressure decisions
//! - Countdown timers for transition pacing and auto-hide
//! - Logging utilities

pub mod math;
pub mod memory;
pub mod time;
pub mod logging;
