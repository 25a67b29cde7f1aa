//! Terrain texture weights (splatmaps)

pub mod splatmap;

pub use splatmap::{Splatmap, TextureLayer, TextureRule};
