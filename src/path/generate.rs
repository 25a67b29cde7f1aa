//! Random curved paths for layers that have no hand-placed waypaths.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::waypath::Waypath;
use crate::core::Result;
use crate::placement::RandomSource;

/// Request for one random path painted with `layer`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratedPath {
    pub layer: u16,
    pub samples: u32, // Points along the curve
}

impl Default for GeneratedPath {
    fn default() -> Self {
        Self { layer: 0, samples: 50 }
    }
}

/// A cubic Bezier with start, end and both control points drawn uniformly
/// over a `width × height` grid, sampled at `samples + 1` evenly spaced `t`.
pub fn random_curved_path(width: usize, height: usize, samples: u32, rng: &mut impl RandomSource) -> Result<Waypath> {
    let (max_x, max_y) = (width.saturating_sub(1) as f32, height.saturating_sub(1) as f32);
    let mut point = || Vec2::new(rng.next_range(0.0, max_x), rng.next_range(0.0, max_y));
    let start = point();
    let end = point();
    let c1 = point();
    let c2 = point();

    let steps = samples.max(1);
    let points = (0..=steps)
        .map(|i| cubic_bezier(start, c1, c2, end, i as f32 / steps as f32))
        .collect();
    Waypath::open(points)
}

#[inline]
fn cubic_bezier(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
}
