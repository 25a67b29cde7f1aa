//! Random river courses across the map.
//!
//! A course starts on the left or right edge somewhere in the middle band of
//! the map and advances toward the opposite edge in random-length segments,
//! occasionally bending sideways and back again, dodging high ground.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::math::Grid;
use crate::path::Waypath;
use crate::placement::RandomSource;

/// Course generation parameters. Segment lengths are fractions of the map width.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseParams {
    pub max_segments: usize,
    pub min_segment: f32,
    pub max_segment: f32,
    pub bend_chance: f32,  // Chance per segment to start a lateral bend
    pub avoid_height: f32, // Normalized height the course steers around
    pub allow_split: bool,
}

impl Default for CourseParams {
    fn default() -> Self {
        Self {
            max_segments: 85,
            min_segment: 0.07,
            max_segment: 0.12,
            bend_chance: 0.3,
            avoid_height: 0.6,
            allow_split: false,
        }
    }
}

/// A generated main channel and its optional branch.
#[derive(Clone, Debug, PartialEq)]
pub struct RiverCourse {
    pub main: Waypath,
    pub split: Option<Waypath>,
}

impl RiverCourse {
    pub fn paths(&self) -> impl Iterator<Item = &Waypath> {
        std::iter::once(&self.main).chain(self.split.as_ref())
    }
}

/// Generate a course over `heights` (normalized).
pub fn generate_course(heights: &Grid<f32>, rng: &mut impl RandomSource, params: &CourseParams) -> Result<RiverCourse> {
    let max_x = (heights.width() - 1) as f32;
    let max_y = (heights.height() - 1) as f32;
    let map_width = heights.width() as f32;
    let rows = heights.height() as f32;

    let too_high = |x: f32, y: f32| *heights.get_clamped(x.round() as i64, y.round() as i64) > params.avoid_height;

    let start_x = if rng.next_unit() > 0.5 { 0.0 } else { max_x };
    let start_y = rng.next_range(rows * 0.3, rows * 0.7).min(max_y);
    let forward = if start_x == 0.0 { 1.0 } else { -1.0 };

    let mut points = vec![Vec2::new(start_x, start_y)];
    let (mut x, mut y) = (start_x, start_y);
    let mut bending = false;

    for _ in 0..params.max_segments {
        let len = rng.next_range(params.min_segment, params.max_segment) * map_width;
        x = (x + len * forward).clamp(0.0, max_x);

        let bend = rng.next_unit() < params.bend_chance;
        if bend && !bending {
            bending = true;
            y = (y + rng.next_range(len * 0.2, len * 0.4)).clamp(0.0, max_y);
        } else if bending {
            bending = false;
            y = (y - rng.next_range(len * 0.2, len * 0.4)).clamp(0.0, max_y);
        }

        if too_high(x, y) {
            y = (y - len * 0.5).clamp(0.0, max_y);
            if too_high(x, y) {
                x = (x - len * forward * 0.5).clamp(0.0, max_x);
            }
        }

        // Never flow backward
        let last_x = points[points.len() - 1].x;
        if (forward > 0.0 && x < last_x) || (forward < 0.0 && x > last_x) {
            x = (last_x + len * forward).clamp(0.0, max_x);
        }

        points.push(Vec2::new(x, y));
        if x == 0.0 || x == max_x {
            break;
        }
    }

    let end = Vec2::new(if forward > 0.0 { max_x } else { 0.0 }, y);
    if points[points.len() - 1] != end {
        points.push(end);
    }
    if points.len() < 2 {
        // Single-column maps start on the far edge already
        points.push(end);
    }

    let split = if params.allow_split {
        Some(split_branch(&points, rng, params, max_x, max_y, map_width)?)
    } else {
        None
    };

    log::debug!("Generated river course with {} control points (split: {})", points.len(), split.is_some());
    Ok(RiverCourse { main: Waypath::open(points)?, split })
}

/// A branch wandering off from the midpoint of the main course.
fn split_branch(
    main: &[Vec2],
    rng: &mut impl RandomSource,
    params: &CourseParams,
    max_x: f32,
    max_y: f32,
    map_width: f32,
) -> Result<Waypath> {
    let start = main[main.len() / 2];
    let mut points = vec![start];
    let (mut x, mut y) = (start.x, start.y);

    for _ in 0..(params.max_segments / 2).max(1) {
        let len = rng.next_range(params.min_segment, params.max_segment) * map_width;
        x = (x + rng.next_range(-len, len)).clamp(0.0, max_x);
        y = (y + rng.next_range(-len, len)).clamp(0.0, max_y);
        points.push(Vec2::new(x, y));
        if x >= max_x || y >= max_y {
            break;
        }
    }
    Waypath::open(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::SeedSequence;

    #[test]
    fn test_crosses_the_map() {
        let heights = Grid::filled(128, 96, 0.2f32).unwrap();
        for seed in 0..8 {
            let mut rng = SeedSequence::new(seed).stream(0);
            let course = generate_course(&heights, &mut rng, &CourseParams::default()).unwrap();
            let pts = course.main.points();
            let (first, last) = (pts[0], pts[pts.len() - 1]);
            assert!(first.x == 0.0 || first.x == 127.0);
            assert_eq!(last.x, 127.0 - first.x);
            for p in pts {
                assert!((0.0..=127.0).contains(&p.x) && (0.0..=95.0).contains(&p.y));
            }
            assert!(course.split.is_none());
        }
    }

    #[test]
    fn test_monotonic_progress() {
        let heights = Grid::filled(128, 128, 0.2f32).unwrap();
        let mut rng = SeedSequence::new(5).stream(0);
        let course = generate_course(&heights, &mut rng, &CourseParams::default()).unwrap();
        let pts = course.main.points();
        let forward = (pts[pts.len() - 1].x - pts[0].x).signum();
        for w in pts.windows(2) {
            assert!((w[1].x - w[0].x) * forward >= 0.0);
        }
    }

    #[test]
    fn test_reproducible() {
        let heights = Grid::filled(64, 64, 0.2f32).unwrap();
        let params = CourseParams { allow_split: true, ..Default::default() };
        let a = generate_course(&heights, &mut SeedSequence::new(9).stream(1), &params).unwrap();
        let b = generate_course(&heights, &mut SeedSequence::new(9).stream(1), &params).unwrap();
        assert_eq!(a, b);
        assert!(a.split.is_some());
        assert_eq!(a.paths().count(), 2);
    }

    #[test]
    fn test_single_column_map() {
        let heights = Grid::filled(1, 8, 0.2f32).unwrap();
        let course = generate_course(&heights, &mut SeedSequence::new(1).stream(0), &CourseParams::default()).unwrap();
        assert!(course.main.points().len() >= 2);
    }
}
