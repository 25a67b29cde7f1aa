//! Procedural heightmap synthesis

pub mod curve;
pub mod falloff;
pub mod heightmap;
pub mod noise_field;

pub use curve::HeightCurve;
pub use falloff::FalloffParams;
pub use heightmap::{scale_to_depth, synthesize};
pub use noise_field::{NoiseField, NoiseParams};
