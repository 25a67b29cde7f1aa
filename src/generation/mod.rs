//! Terrain generation pipeline: configuration and the staged composer.

pub mod composer;
pub mod config;

pub use composer::{ComposedTerrain, Placement, TerrainComposer, OCEAN_SHORE_BAND};
pub use config::{RiverSpec, TerrainParams, WaterFeature};
