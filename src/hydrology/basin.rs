//! Lake basins and ocean shorelines.

use glam::Vec2;
use noise::{NoiseFn, Perlin};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::Carved;
use crate::core::{Error, Result};
use crate::math::{lerp, smoothstep01, Grid, EPSILON};

/// Circular basin with a noise-perturbed edge
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasinParams {
    pub center: Vec2,
    pub radius: f32,
    pub depth: f32,                 // Floor sits this far below the center height
    pub shore_width: Option<f32>,   // Defaults to `radius`
    pub edge_noise_frequency: f32,
    pub edge_variation: f32,        // Max radius growth as a fraction of `radius`
    pub seed: u32,
}

impl Default for BasinParams {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            radius: 16.0,
            depth: 0.1,
            shore_width: None,
            edge_noise_frequency: 0.05,
            edge_variation: 0.3,
            seed: 0,
        }
    }
}

impl BasinParams {
    pub fn validate(&self) -> Result<()> {
        if !self.center.is_finite() {
            return Err(Error::InvalidWaterFeature("basin center must be finite".into()));
        }
        let checks = [
            ("depth", self.depth),
            ("edge_noise_frequency", self.edge_noise_frequency),
            ("edge_variation", self.edge_variation),
            ("shore_width", self.shore_width.unwrap_or(0.0)),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidWaterFeature(format!("basin {} must be >= 0, got {}", name, value)));
            }
        }
        Ok(())
    }

    fn shore(&self) -> f32 {
        self.shore_width.unwrap_or(self.radius)
    }
}

/// Carve a basin into a copy of `heights`. Terrain is only ever lowered and
/// never goes below zero.
pub fn carve_basin(heights: &Grid<f32>, params: &BasinParams) -> Result<Carved> {
    params.validate()?;
    let mut wetness = heights.map(|_| 0.0f32);

    let radius = params.radius;
    if !(radius > EPSILON) || !radius.is_finite() {
        log::debug!("Basin radius {} too small, terrain unchanged", radius);
        return Ok(Carved { heights: heights.clone(), wetness });
    }

    let (cx, cy) = heights.clamp_cell(params.center.x.round() as i64, params.center.y.round() as i64);
    let reference = heights[(cx, cy)];
    let floor = (reference - params.depth).max(0.0);
    let shore = params.shore();
    let outer = radius * (1.0 + params.edge_variation) + shore;

    let perlin = Perlin::new(params.seed);
    let effective_radius = |x: usize, y: usize| {
        let f = params.edge_noise_frequency as f64;
        let n = perlin.get([x as f64 * f, y as f64 * f]) as f32;
        let n01 = ((n + 1.0) * 0.5).clamp(0.0, 1.0);
        radius + n01 * params.edge_variation * radius
    };

    let mut carved = heights.clone();
    carved
        .par_rows_mut()
        .zip(wetness.par_rows_mut())
        .for_each(|((y, row), (_, wet_row))| {
            for (x, h) in row.iter_mut().enumerate() {
                let d = Vec2::new(x as f32, y as f32).distance(params.center);
                if d > outer {
                    continue;
                }
                let r_eff = effective_radius(x, y);
                let rim = lerp(floor, *h, 0.5);

                let (target, wet) = if d <= r_eff {
                    (lerp(floor, rim, smoothstep01(d / r_eff)), 1.0)
                } else if shore > EPSILON && d <= r_eff + shore {
                    let t = smoothstep01((d - r_eff) / shore);
                    (lerp(rim, *h, t), 1.0 - t)
                } else {
                    continue;
                };

                *h = h.min(target).max(0.0);
                wet_row[x] = wet;
            }
        });

    log::debug!(
        "Carved basin at ({:.1}, {:.1}): radius {:.1}, floor {:.3}",
        params.center.x, params.center.y, radius, floor
    );
    Ok(Carved { heights: carved, wetness })
}

/// Wetness for an ocean at `level`: 1 below the level, fading to 0 over
/// `band` height units above it.
pub fn ocean_wetness(heights: &Grid<f32>, level: f32, band: f32) -> Grid<f32> {
    heights.map(|&h| {
        if h <= level {
            1.0
        } else if band > EPSILON {
            1.0 - smoothstep01((h - level) / band)
        } else {
            0.0
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> BasinParams {
        BasinParams { center: Vec2::new(32.0, 32.0), radius: 10.0, depth: 0.2, ..Default::default() }
    }

    #[test]
    fn test_flat_basin_scenario() {
        let heights = Grid::filled(64, 64, 0.5f32).unwrap();
        let carved = carve_basin(&heights, &scenario()).unwrap();
        assert!(carved.heights[(32, 32)] < 0.5);
        assert_eq!(carved.heights[(0, 0)], 0.5);
        assert!(carved.heights.as_slice().iter().all(|&h| h >= 0.0));
    }

    #[test]
    fn test_never_raises() {
        let data = (0..64 * 64).map(|i| ((i % 64) as f32 / 63.0)).collect();
        let heights = Grid::from_vec(64, 64, data).unwrap();
        let carved = carve_basin(&heights, &scenario()).unwrap();
        for (a, b) in carved.heights.as_slice().iter().zip(heights.as_slice()) {
            assert!(a <= b);
        }
    }

    #[test]
    fn test_floor_clamped_at_zero() {
        let heights = Grid::filled(32, 32, 0.05f32).unwrap();
        let params = BasinParams { center: Vec2::new(16.0, 16.0), radius: 6.0, depth: 1.0, ..Default::default() };
        let carved = carve_basin(&heights, &params).unwrap();
        assert_eq!(carved.heights[(16, 16)], 0.0);
        assert!(carved.heights.as_slice().iter().all(|&h| h >= 0.0));
    }

    #[test]
    fn test_wetness() {
        let heights = Grid::filled(64, 64, 0.5f32).unwrap();
        let carved = carve_basin(&heights, &scenario()).unwrap();
        assert_eq!(carved.wetness[(32, 32)], 1.0);
        assert_eq!(carved.wetness[(0, 0)], 0.0);
        assert!(carved.wetness.as_slice().iter().all(|w| (0.0..=1.0).contains(w)));
    }

    #[test]
    fn test_zero_radius_is_noop() {
        let heights = Grid::filled(16, 16, 0.5f32).unwrap();
        let params = BasinParams { radius: 0.0, ..scenario() };
        assert_eq!(carve_basin(&heights, &params).unwrap().heights, heights);
    }

    #[test]
    fn test_invalid_params() {
        let heights = Grid::filled(16, 16, 0.5f32).unwrap();
        let params = BasinParams { depth: -0.5, ..scenario() };
        assert!(matches!(carve_basin(&heights, &params), Err(Error::InvalidWaterFeature(_))));
    }

    #[test]
    fn test_ocean_wetness() {
        let heights = Grid::from_vec(3, 1, vec![0.1f32, 0.45, 0.9]).unwrap();
        let wet = ocean_wetness(&heights, 0.4, 0.1);
        assert_eq!(wet[(0, 0)], 1.0);
        assert!((wet[(1, 0)] - 0.5).abs() < 1e-5);
        assert_eq!(wet[(2, 0)], 0.0);
    }
}
