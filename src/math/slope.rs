//! Terrain steepness from a heightmap.

use rayon::prelude::*;

use super::grid::Grid;

/// Steepness in degrees at `(x, y)` of a normalized heightmap scaled to `depth`
/// world units, assuming one world unit per cell horizontally.
///
/// Central differences with edge-clamped neighbors; 0 = flat, 90 = vertical.
pub fn steepness_at(heights: &Grid<f32>, depth: f32, x: usize, y: usize) -> f32 {
    let (x, y) = (x as i64, y as i64);
    let left = *heights.get_clamped(x - 1, y);
    let right = *heights.get_clamped(x + 1, y);
    let down = *heights.get_clamped(x, y - 1);
    let up = *heights.get_clamped(x, y + 1);

    let dx = (right - left) * depth * 0.5;
    let dy = (up - down) * depth * 0.5;
    (dx * dx + dy * dy).sqrt().atan().to_degrees()
}

/// Steepness for every cell, computed row-parallel.
pub fn steepness_map(heights: &Grid<f32>, depth: f32) -> Grid<f32> {
    let mut out = heights.map(|_| 0.0f32);
    out.par_rows_mut().for_each(|(y, row)| {
        for (x, v) in row.iter_mut().enumerate() {
            *v = steepness_at(heights, depth, x, y);
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_is_zero() {
        let heights = Grid::filled(8, 8, 0.5f32).unwrap();
        let map = steepness_map(&heights, 100.0);
        assert!(map.as_slice().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_45_degree_ramp() {
        // Height rises one world unit per cell along x.
        let mut heights = Grid::<f32>::new(8, 8).unwrap();
        for y in 0..8 {
            for x in 0..8 {
                heights[(x, y)] = x as f32 / 10.0;
            }
        }
        let s = steepness_at(&heights, 10.0, 4, 4);
        assert!((s - 45.0).abs() < 1e-3, "steepness {}", s);
    }

    #[test]
    fn test_range_is_degrees() {
        let heights = Grid::from_vec(3, 1, vec![0.0f32, 1.0, 0.0]).unwrap();
        let map = steepness_map(&heights, 1000.0);
        for &s in map.as_slice() {
            assert!((0.0..=90.0).contains(&s));
        }
    }
}
