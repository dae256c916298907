//! Math utilities and types
//!
//! Scene positions live in a shared 3D world frame; the minimap works in a
//! flat 2D canvas frame.

pub use nalgebra::{Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 2D point type (canvas space)
pub type Point2 = nalgebra::Point2<f32>;

/// Euclidean distance between two world positions
pub fn distance(a: &Vec3, b: &Vec3) -> f32 {
    (a - b).magnitude()
}

/// Point reached by walking `length` from `origin` along a heading of `angle` radians.
///
/// Angle zero points along +X and grows towards +Y, matching a canvas that
/// is rotated by `angle` before drawing a segment along its local X axis.
pub fn heading_tip(origin: Point2, angle: f32, length: f32) -> Point2 {
    Point2::new(origin.x + length * angle.cos(), origin.y + length * angle.sin())
}
