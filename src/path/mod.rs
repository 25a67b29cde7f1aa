//! Waypaths and path painting

pub mod generate;
pub mod painter;
pub mod waypath;

pub use generate::{random_curved_path, GeneratedPath};
pub use painter::{BrushShape, PaintedPaths, PathPainter, PathSpec};
pub use waypath::{clip_segment, densify, distance_to_polyline, distance_to_segment, smooth_bezier, Waypath};
