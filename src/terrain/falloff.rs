//! Island falloff maps: 0 at the center rising to 1 at the grid edges.

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::math::{Grid, EPSILON};

/// Shape of the falloff curve `v^a / (v^a + (b - b·v)^a)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FalloffParams {
    pub direction: f32, // Exponent `a`, steepness of the transition
    pub range: f32,     // `b`, pushes the transition toward the edges
}

impl Default for FalloffParams {
    fn default() -> Self {
        Self { direction: 3.0, range: 3.0 }
    }
}

impl FalloffParams {
    pub fn validate(&self) -> Result<()> {
        if !self.direction.is_finite() || self.direction <= 0.0 {
            return Err(Error::InvalidFalloff(format!("direction must be > 0, got {}", self.direction)));
        }
        if !self.range.is_finite() || self.range < 0.0 {
            return Err(Error::InvalidFalloff(format!("range must be >= 0, got {}", self.range)));
        }
        Ok(())
    }

    /// Falloff for a chebyshev distance `v` in [0, 1] from the center.
    pub fn evaluate(&self, v: f32) -> f32 {
        let a = self.direction;
        let b = self.range;
        let num = v.powf(a);
        let denom = num + (b - b * v).max(0.0).powf(a);
        if denom < EPSILON {
            return 0.0;
        }
        (num / denom).clamp(0.0, 1.0)
    }
}

/// Square `size × size` falloff map.
pub fn generate(size: usize, params: &FalloffParams) -> Result<Grid<f32>> {
    generate_rect(size, size, params)
}

/// Rectangular falloff map, each axis normalized independently.
pub fn generate_rect(width: usize, height: usize, params: &FalloffParams) -> Result<Grid<f32>> {
    params.validate()?;
    let mut grid = Grid::<f32>::new(width, height)?;

    for (y, row) in grid.rows_mut().enumerate() {
        let w = axis_coord(y, height);
        for (x, v) in row.iter_mut().enumerate() {
            let u = axis_coord(x, width);
            *v = params.evaluate(u.abs().max(w.abs()));
        }
    }
    Ok(grid)
}

/// Map index `i` of an `n`-cell axis to [-1, 1].
#[inline]
fn axis_coord(i: usize, n: usize) -> f32 {
    if n <= 1 {
        return 0.0;
    }
    i as f32 / (n - 1) as f32 * 2.0 - 1.0
}
