//! Hydrology: river channels, lake basins and generated river courses.

pub mod basin;
pub mod course;
pub mod river;
pub mod smoothing;

pub use basin::{carve_basin, ocean_wetness, BasinParams};
pub use course::{generate_course, CourseParams, RiverCourse};
pub use river::{bank_props, carve_river, distance_field, BankProp, RiverParams, SHORE_WATER_BLEND};
pub use smoothing::smooth_footprint;

use crate::math::Grid;

/// Carved terrain plus a wetness mask in [0, 1] of the same size.
#[derive(Clone, Debug)]
pub struct Carved {
    pub heights: Grid<f32>,
    pub wetness: Grid<f32>,
}

/// Fold another wetness mask in, keeping the wetter value per cell.
pub fn merge_wetness(target: &mut Grid<f32>, other: &Grid<f32>) {
    for (a, &b) in target.as_mut_slice().iter_mut().zip(other.as_slice()) {
        *a = a.max(b);
    }
}
