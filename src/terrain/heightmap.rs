//! Normalized heightmap synthesis: noise → normalize → falloff → curve.

use rayon::prelude::*;

use super::curve::HeightCurve;
use super::noise_field::{NoiseField, NoiseParams};
use crate::core::{Error, Result};
use crate::math::{inverse_lerp, Grid};

/// Build a `width × height` heightmap with every value in [0, 1].
///
/// Per cell the noise value is normalized against the field's range, the
/// falloff (when given) is subtracted, negatives become 0 and everything else
/// goes through `curve`.
pub fn synthesize(
    width: usize,
    height: usize,
    params: &NoiseParams,
    curve: HeightCurve,
    falloff: Option<&Grid<f32>>,
) -> Result<Grid<f32>> {
    if let Some(f) = falloff {
        if f.width() != width || f.height() != height {
            return Err(Error::InvalidDimensions { width: f.width(), height: f.height() });
        }
    }

    let field = NoiseField::generate(width, height, params)?;
    let (min, max) = (field.min, field.max);
    let mut heights = field.values;

    heights.par_rows_mut().for_each(|(y, row)| {
        for (x, v) in row.iter_mut().enumerate() {
            let mut t = inverse_lerp(min, max, *v);
            if let Some(f) = falloff {
                t -= f[(x, y)];
            }
            *v = if t < 0.0 { 0.0 } else { curve.evaluate(t) };
        }
    });

    log::debug!(
        "Synthesized {}x{} heightmap (curve: {}, falloff: {})",
        width, height, curve, falloff.is_some()
    );
    Ok(heights)
}

/// Convert a normalized heightmap to world units.
pub fn scale_to_depth(heights: &Grid<f32>, depth: f32) -> Grid<f32> {
    heights.map(|h| h * depth)
}
