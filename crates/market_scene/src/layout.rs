//! Spatial layout policies: where each entity's sphere goes.

use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

/// How entities are distributed in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutPolicy {
    /// Evenly spaced on a horizontal circle of `radius` around the Y axis.
    Ring { radius: f32 },
    /// Independently and uniformly sampled inside a cube of the given
    /// half-extent. Overlap between entities is allowed.
    RandomVolume { half_extent: f32 },
}

impl Default for LayoutPolicy {
    fn default() -> Self {
        LayoutPolicy::Ring { radius: 10.0 }
    }
}

/// Position of entity `index` out of `total` using the thread-local RNG for
/// [`LayoutPolicy::RandomVolume`].
///
/// Callers never lay out an empty list; `total == 0` is treated as `1`.
pub fn position_of(index: usize, total: usize, policy: LayoutPolicy) -> Vec3 {
    position_with_rng(index, total, policy, &mut rand::thread_rng())
}

/// Same as [`position_of`] with an explicit random source, so a seeded RNG
/// reproduces a random layout exactly.
///
/// A non-finite radius or half-extent is degenerate and places every entity
/// at the origin.
pub fn position_with_rng<R: Rng + ?Sized>(
    index: usize,
    total: usize,
    policy: LayoutPolicy,
    rng: &mut R,
) -> Vec3 {
    match policy {
        LayoutPolicy::Ring { radius } => {
            if !radius.is_finite() {
                return Vec3::ZERO;
            }
            let total = total.max(1);
            let angle = TAU * (index % total) as f32 / total as f32;
            Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius)
        }
        LayoutPolicy::RandomVolume { half_extent } => {
            let h = half_extent.abs();
            if h == 0.0 || !h.is_finite() {
                return Vec3::ZERO;
            }
            Vec3::new(
                rng.gen_range(-h..=h),
                rng.gen_range(-h..=h),
                rng.gen_range(-h..=h),
            )
        }
    }
}
