//! 3×3 box smoothing restricted to a footprint.

use rayon::prelude::*;

use crate::math::Grid;

/// Replace every cell inside the footprint with the mean of its 3×3
/// neighborhood (edge-clamped), read from a snapshot taken before the pass.
///
/// Cells outside the footprint are left untouched.
pub fn smooth_footprint<F>(heights: &mut Grid<f32>, in_footprint: F)
where
    F: Fn(usize, usize) -> bool + Sync,
{
    let snapshot = heights.clone();

    heights.par_rows_mut().for_each(|(y, row)| {
        for (x, v) in row.iter_mut().enumerate() {
            if !in_footprint(x, y) {
                continue;
            }
            let (xi, yi) = (x as i64, y as i64);
            let mut total = 0.0f32;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    total += *snapshot.get_clamped(xi + dx, yi + dy);
                }
            }
            *v = total / 9.0;
        }
    });
}
