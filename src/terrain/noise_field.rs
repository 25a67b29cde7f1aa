//! Multi-octave value noise sampled over a grid.
//!
//! The basis is a hashed integer lattice with smoothstep-bilinear
//! interpolation, so the field is a pure function of [`NoiseParams`]; any
//! randomness comes in through the offsets, which callers randomize
//! explicitly via [`NoiseParams::randomize_offset`].

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::math::{inverse_lerp, Grid};
use crate::placement::RandomSource;

/// Smallest usable noise scale; non-positive scales are clamped up to this.
pub const MIN_SCALE: f32 = 0.0001;

/// Upper bound (exclusive) for randomized offsets.
pub const MAX_RANDOM_OFFSET: f32 = 9999.0;

/// Parameters controlling fractal value noise
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    pub seed: u32,
    pub octaves: i32,      // Detail layers, 0 = flat field
    pub scale: f32,        // Horizontal scale (larger = smoother)
    pub lacunarity: f32,   // Frequency multiplier per octave (>= 1)
    pub persistence: f32,  // Amplitude multiplier per octave, [0, 1]
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 4,
            scale: 50.0,
            lacunarity: 2.0,
            persistence: 0.5,
            offset_x: 100.0,
            offset_y: 100.0,
        }
    }
}

impl NoiseParams {
    /// Return a copy with scale and lacunarity clamped into range, or an
    /// error when the parameters cannot be repaired.
    pub fn validated(&self) -> Result<Self> {
        if self.octaves < 0 {
            return Err(Error::InvalidNoiseParams(format!("octaves must be >= 0, got {}", self.octaves)));
        }
        if !self.scale.is_finite() {
            return Err(Error::InvalidNoiseParams(format!("scale must be finite, got {}", self.scale)));
        }
        if !self.lacunarity.is_finite() {
            return Err(Error::InvalidNoiseParams(format!("lacunarity must be finite, got {}", self.lacunarity)));
        }
        if !(0.0..=1.0).contains(&self.persistence) {
            return Err(Error::InvalidNoiseParams(format!("persistence must be in [0, 1], got {}", self.persistence)));
        }
        if !self.offset_x.is_finite() || !self.offset_y.is_finite() {
            return Err(Error::InvalidNoiseParams("offsets must be finite".into()));
        }

        let mut out = self.clone();
        if out.scale <= 0.0 {
            log::warn!("Noise scale {} clamped to {}", out.scale, MIN_SCALE);
            out.scale = MIN_SCALE;
        }
        if out.lacunarity < 1.0 {
            log::warn!("Noise lacunarity {} clamped to 1", out.lacunarity);
            out.lacunarity = 1.0;
        }
        Ok(out)
    }

    /// Draw both offsets uniformly from `[0, MAX_RANDOM_OFFSET)`.
    pub fn randomize_offset(&mut self, rng: &mut impl RandomSource) {
        self.offset_x = rng.next_range(0.0, MAX_RANDOM_OFFSET);
        self.offset_y = rng.next_range(0.0, MAX_RANDOM_OFFSET);
    }

    /// Fractal value at a grid position. Expects already-validated params.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let mut amplitude = 1.0f32;
        let mut frequency = 1.0f32;
        let mut value = 0.0f32;

        for _ in 0..self.octaves {
            let sx = (x / self.scale) * frequency + self.offset_x;
            let sy = (y / self.scale) * frequency + self.offset_y;
            if !sx.is_finite() || !sy.is_finite() {
                // Frequency overflowed; higher octaves carry no usable detail
                break;
            }
            value += value_noise(sx, sy, self.seed) * amplitude;

            amplitude *= self.persistence;
            frequency *= self.lacunarity;
        }
        value
    }
}

/// A sampled noise grid together with its observed value range.
#[derive(Clone, Debug)]
pub struct NoiseField {
    pub values: Grid<f32>,
    pub min: f32,
    pub max: f32,
}

impl NoiseField {
    /// Sample fractal noise for every cell of a `width × height` grid.
    pub fn generate(width: usize, height: usize, params: &NoiseParams) -> Result<Self> {
        let params = params.validated()?;
        let mut values = Grid::<f32>::new(width, height)?;

        if params.octaves == 0 {
            return Ok(Self { values, min: 0.0, max: 0.0 });
        }

        values.par_rows_mut().for_each(|(y, row)| {
            for (x, v) in row.iter_mut().enumerate() {
                *v = params.sample(x as f32, y as f32);
            }
        });

        let (min, max) = values.min_max();
        log::debug!("Noise field {}x{}: range [{:.4}, {:.4}]", width, height, min, max);
        Ok(Self { values, min, max })
    }

    /// Value at `(x, y)` remapped from `[min, max]` to `[0, 1]`.
    pub fn normalized(&self, x: usize, y: usize) -> f32 {
        inverse_lerp(self.min, self.max, self.values[(x, y)])
    }
}

/// Integer hash producing a value in [0, 1].
fn hash_2d(ix: i32, iy: i32, seed: u32) -> f32 {
    let mut h = (ix as u32).wrapping_mul(374761393)
        .wrapping_add((iy as u32).wrapping_mul(668265263))
        .wrapping_add(seed.wrapping_mul(1274126177));
    h = (h ^ (h >> 13)).wrapping_mul(1103515245);
    h = h ^ (h >> 16);
    (h & 0x7FFFFFFF) as f32 / 0x7FFFFFFF_u32 as f32
}

/// Smooth 2D value noise in [-1, 1].
fn value_noise(x: f32, y: f32, seed: u32) -> f32 {
    let fx0 = x.floor();
    let fy0 = y.floor();
    let ix = fx0 as i32;
    let iy = fy0 as i32;

    // Smoothstep for C1 continuity
    let fx = x - fx0;
    let fy = y - fy0;
    let fx = fx * fx * (3.0 - 2.0 * fx);
    let fy = fy * fy * (3.0 - 2.0 * fy);

    let h00 = hash_2d(ix, iy, seed);
    // Lattice coordinates saturate for huge inputs; neighbors wrap like the hash
    let (ix1, iy1) = (ix.wrapping_add(1), iy.wrapping_add(1));
    let h10 = hash_2d(ix1, iy, seed);
    let h01 = hash_2d(ix, iy1, seed);
    let h11 = hash_2d(ix1, iy1, seed);

    let a = h00 + (h10 - h00) * fx;
    let b = h01 + (h11 - h01) * fx;
    (a + (b - a) * fy) * 2.0 - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::SeedSequence;

    #[test]
    fn test_noise_params_default() {
        let params = NoiseParams::default();
        assert_eq!(params.octaves, 4);
        assert_eq!(params.scale, 50.0);
        assert_eq!(params.lacunarity, 2.0);
        assert_eq!(params.persistence, 0.5);
    }

    #[test]
    fn test_values_within_observed_range() {
        let params = NoiseParams { offset_x: 0.0, offset_y: 0.0, ..Default::default() };
        let field = NoiseField::generate(64, 48, &params).unwrap();
        assert!(field.min <= field.max);
        for &v in field.values.as_slice() {
            assert!(v >= field.min && v <= field.max);
        }
    }

    #[test]
    fn test_zero_octaves_is_flat() {
        let params = NoiseParams { octaves: 0, ..Default::default() };
        let field = NoiseField::generate(16, 16, &params).unwrap();
        assert_eq!(field.min, 0.0);
        assert_eq!(field.max, 0.0);
        assert!(field.values.as_slice().iter().all(|&v| v == 0.0));
        assert_eq!(field.normalized(3, 3), 0.0);
    }

    #[test]
    fn test_deterministic() {
        let params = NoiseParams::default();
        let a = NoiseField::generate(32, 32, &params).unwrap();
        let b = NoiseField::generate(32, 32, &params).unwrap();
        assert_eq!(a.values, b.values);
    }

    #[test]
    fn test_different_seeds() {
        let a = NoiseField::generate(32, 32, &NoiseParams { seed: 1, ..Default::default() }).unwrap();
        let b = NoiseField::generate(32, 32, &NoiseParams { seed: 2, ..Default::default() }).unwrap();
        assert_ne!(a.values, b.values);
    }

    #[test]
    fn test_scale_clamped_not_divided_by_zero() {
        let params = NoiseParams { scale: 0.0, ..Default::default() };
        let field = NoiseField::generate(8, 8, &params).unwrap();
        assert!(field.values.as_slice().iter().all(|v| v.is_finite()));
        assert_eq!(params.validated().unwrap().scale, MIN_SCALE);
    }

    #[test]
    fn test_invalid_params() {
        let bad = [
            NoiseParams { octaves: -1, ..Default::default() },
            NoiseParams { scale: f32::NAN, ..Default::default() },
            NoiseParams { persistence: 1.5, ..Default::default() },
        ];
        for params in bad {
            assert!(matches!(
                NoiseField::generate(8, 8, &params),
                Err(Error::InvalidNoiseParams(_))
            ));
        }
    }

    #[test]
    fn test_lacunarity_clamped() {
        let params = NoiseParams { lacunarity: 0.25, ..Default::default() };
        assert_eq!(params.validated().unwrap().lacunarity, 1.0);
    }

    #[test]
    fn test_randomize_offset_seeded() {
        let mut a = NoiseParams::default();
        let mut b = NoiseParams::default();
        a.randomize_offset(&mut SeedSequence::new(9).stream(0));
        b.randomize_offset(&mut SeedSequence::new(9).stream(0));
        assert_eq!(a, b);
        assert!((0.0..MAX_RANDOM_OFFSET).contains(&a.offset_x));
    }

    #[test]
    fn test_extreme_inputs_stay_finite() {
        let cases = [
            NoiseParams { scale: 0.0, octaves: 12, ..Default::default() },
            NoiseParams { offset_x: 3e9, offset_y: -3e9, ..Default::default() },
            NoiseParams { octaves: 200, ..Default::default() },
        ];
        for params in cases {
            let field = NoiseField::generate(128, 128, &params).unwrap();
            assert!(field.min <= field.max);
            for &v in field.values.as_slice() {
                assert!(v.is_finite());
                assert!(v >= field.min && v <= field.max);
            }
        }
    }

    #[test]
    fn test_value_noise_range() {
        for i in 0..200 {
            let v = value_noise(i as f32 * 0.37, i as f32 * 0.91, 5);
            assert!((-1.0..=1.0).contains(&v));
        }
    }
}
