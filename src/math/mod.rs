//! Mathematical utilities and data structures

pub mod grid;
pub mod interp;
pub mod slope;

pub use grid::Grid;
pub use interp::{inverse_lerp, lerp, smoothstep, smoothstep01, EPSILON};
pub use slope::{steepness_at, steepness_map};
