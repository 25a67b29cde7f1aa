//! Terrasculpt - grid-based terrain synthesis, hydrology carving, path
//! painting and vegetation placement

pub mod core;
pub mod math;
pub mod terrain;
pub mod hydrology;
pub mod path;
pub mod texture;
pub mod placement;
pub mod generation;
pub mod export;
