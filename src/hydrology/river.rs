//! River carving along a waypath.
//!
//! The channel profile depends only on the distance to the sampled
//! centerline: a riverbed out to half the width, a shoreline out to the full
//! width that is pulled toward the water level, then one smoothing pass over
//! twice the width. Heights are in the units of the grid being carved.

use glam::Vec2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::smoothing::smooth_footprint;
use super::Carved;
use crate::core::{Error, Result};
use crate::math::{lerp, smoothstep01, Grid, EPSILON};
use crate::path::{distance_to_segment, Waypath};
use crate::placement::RandomSource;

/// How far shoreline cells are pulled toward the water level. The pull only
/// lowers the shore, never raises it.
pub const SHORE_WATER_BLEND: f32 = 0.7;

/// Channel shape parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiverParams {
    pub width: f32,        // Channel width in cells
    pub depth: f32,        // Maximum lowering at the centerline
    pub slope_factor: f32, // Scales `depth`
    pub water_level: f32,
    pub smoothness: u32,   // Bezier samples per control triple
}

impl Default for RiverParams {
    fn default() -> Self {
        Self {
            width: 4.0,
            depth: 0.1,
            slope_factor: 0.9,
            water_level: 0.4,
            smoothness: 8,
        }
    }
}

impl RiverParams {
    pub fn validate(&self) -> Result<()> {
        if !self.depth.is_finite() || self.depth < 0.0 {
            return Err(Error::InvalidWaterFeature(format!("river depth must be >= 0, got {}", self.depth)));
        }
        if !self.slope_factor.is_finite() || self.slope_factor < 0.0 {
            return Err(Error::InvalidWaterFeature(format!(
                "river slope factor must be >= 0, got {}",
                self.slope_factor
            )));
        }
        if !self.water_level.is_finite() {
            return Err(Error::InvalidWaterFeature("river water level must be finite".into()));
        }
        Ok(())
    }
}

/// Carve a river channel into a copy of `heights`.
///
/// A width of (near) zero, or a non-finite width, leaves the terrain as is.
pub fn carve_river(heights: &Grid<f32>, path: &Waypath, params: &RiverParams) -> Result<Carved> {
    params.validate()?;
    let mut wetness = heights.map(|_| 0.0f32);

    let width = params.width;
    if !(width > EPSILON) || !width.is_finite() {
        log::debug!("River width {} too small, terrain unchanged", width);
        return Ok(Carved { heights: heights.clone(), wetness });
    }

    let samples = path.sample(params.smoothness);
    let dist = distance_field(heights.width(), heights.height(), &samples, 3.0 * width)?;

    let half = width * 0.5;
    let lowering = params.depth * params.slope_factor;
    let water_level = params.water_level;

    let mut carved = heights.clone();
    carved.par_rows_mut().for_each(|(y, row)| {
        for (x, h) in row.iter_mut().enumerate() {
            let d = dist[(x, y)];
            if d <= width {
                *h = channel_height(*h, d, half, lowering, water_level).max(0.0);
            }
        }
    });

    let footprint = 2.0 * width;
    smooth_footprint(&mut carved, |x, y| dist[(x, y)] <= footprint);

    for (w, &d) in wetness.as_mut_slice().iter_mut().zip(dist.as_slice()) {
        *w = river_wetness(d, width);
    }

    log::debug!(
        "Carved river: {} samples, width {:.1}, lowering {:.3}",
        samples.len(), width, lowering
    );
    Ok(Carved { heights: carved, wetness })
}

/// Height at distance `d` from the centerline for a cell originally at `h`.
fn channel_height(h: f32, d: f32, half: f32, lowering: f32, water_level: f32) -> f32 {
    if d <= half {
        return h - lowering * (1.0 - 0.5 * smoothstep01(d / half));
    }

    let shore = h - 0.5 * lowering * (1.0 - smoothstep01((d - half) / half));
    if water_level < shore {
        let bed_edge = h - 0.5 * lowering;
        lerp(shore, water_level, SHORE_WATER_BLEND).max(bed_edge)
    } else {
        shore
    }
}

/// 1 inside the channel, fading linearly to 0 at three times the width.
#[inline]
fn river_wetness(d: f32, width: f32) -> f32 {
    if d <= width {
        1.0
    } else {
        (1.0 - (d - width) / (2.0 * width)).clamp(0.0, 1.0)
    }
}

/// Distance from every cell to the nearest polyline segment, computed only
/// within `reach`; cells farther away hold `f32::INFINITY`.
pub fn distance_field(width: usize, height: usize, samples: &[Vec2], reach: f32) -> Result<Grid<f32>> {
    let mut field = Grid::filled(width, height, f32::INFINITY)?;
    let segments: Vec<(Vec2, Vec2)> = match samples {
        [] => return Ok(field),
        [only] => vec![(*only, *only)],
        _ => samples.windows(2).map(|w| (w[0], w[1])).collect(),
    };

    field.par_rows_mut().for_each(|(y, row)| {
        let fy = y as f32;
        for &(a, b) in &segments {
            if fy < a.y.min(b.y) - reach || fy > a.y.max(b.y) + reach {
                continue;
            }
            let x0 = (a.x.min(b.x) - reach).floor().max(0.0) as usize;
            let x1 = ((a.x.max(b.x) + reach).ceil().max(0.0) as usize).min(width - 1);
            for x in x0..=x1 {
                let d = distance_to_segment(Vec2::new(x as f32, fy), a, b);
                if d <= reach && d < row[x] {
                    row[x] = d;
                }
            }
        }
    });

    Ok(field)
}

/// A rock or other prop placed on a river bank.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BankProp {
    pub position: Vec2,
    pub yaw_degrees: f32,
}

/// Props on both banks every `spacing` centerline samples, offset 0.6 widths
/// from the centerline and jittered by up to one cell.
pub fn bank_props(samples: &[Vec2], width: f32, spacing: usize, rng: &mut impl RandomSource) -> Vec<BankProp> {
    if samples.len() < 2 || spacing == 0 {
        return Vec::new();
    }

    let offset = width * 0.6;
    let mut props = Vec::with_capacity(2 * samples.len() / spacing + 2);
    for i in (0..samples.len()).step_by(spacing) {
        let prev = samples[i.saturating_sub(1)];
        let next = samples[(i + 1).min(samples.len() - 1)];
        let normal = (next - prev).perp().normalize_or_zero();
        let normal = if normal == Vec2::ZERO { Vec2::X } else { normal };

        for side in [-1.0f32, 1.0] {
            let jitter = Vec2::new(rng.next_range(-1.0, 1.0), rng.next_range(-1.0, 1.0));
            props.push(BankProp {
                position: samples[i] + normal * offset * side + jitter,
                yaw_degrees: rng.next_range(0.0, 360.0),
            });
        }
    }
    props
}
