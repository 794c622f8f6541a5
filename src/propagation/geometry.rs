//! Distance calculations between antenna positions.
//!
//! The free-space model uses the straight-line (slant) distance; the two-ray
//! ground model measures separation along the ground plane and treats the
//! `z` components as antenna heights.

use super::types::Position;

/// Squared 3-D Euclidean distance.
pub fn distance2(a: &Position, b: &Position) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    dx * dx + dy * dy + dz * dz
}

/// 3-D Euclidean distance in meters.
pub fn distance(a: &Position, b: &Position) -> f64 {
    distance2(a, b).sqrt()
}

/// Distance projected onto the ground plane (heights ignored).
pub fn horizontal_distance(a: &Position, b: &Position) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}
