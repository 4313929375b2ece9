//! Planar vector helpers shared by layout, reactions and animation
//!
//! Thin wrappers over `glam::Vec2` so the algorithms read in the terms of the
//! board: a position is displaced along a direction scaled by a factor.

use glam::Vec2;

/// Euclidean distance between two positions
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Vector pointing from `b` to `a`
#[inline]
pub fn direction(a: Vec2, b: Vec2) -> Vec2 {
    a - b
}

#[inline]
pub fn displace(pos: Vec2, delta: Vec2) -> Vec2 {
    pos + delta
}

#[inline]
pub fn scale(v: Vec2, factor: f32) -> Vec2 {
    v * factor
}

/// Linear interpolation between `src` (phase 0) and `dst` (phase 1)
#[inline]
pub fn lerp(src: Vec2, dst: Vec2, phase: f32) -> Vec2 {
    dst * phase + src * (1.0 - phase)
}

/// Unweighted mean of a set of points, `None` when there are none
pub fn centroid<I>(points: I) -> Option<Vec2>
where
    I: IntoIterator<Item = Vec2>,
{
    let (sum, count) = points
        .into_iter()
        .fold((Vec2::ZERO, 0u32), |(sum, count), p| (sum + p, count + 1));
    (count > 0).then(|| sum / count as f32)
}
