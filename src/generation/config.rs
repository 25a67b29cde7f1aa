//! Terrain composition parameters, loadable from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::hydrology::{BasinParams, CourseParams, RiverParams};
use crate::path::{BrushShape, GeneratedPath, PathSpec, Waypath};
use crate::placement::PlacementRule;
use crate::terrain::{FalloffParams, HeightCurve, NoiseParams};
use crate::texture::TextureLayer;

/// A river: explicit waypoints, or a generated course when none are given.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiverSpec {
    pub waypoints: Option<Waypath>,
    pub channel: RiverParams,
    pub course: CourseParams,
    /// Centerline samples between bank props, 0 = no props.
    pub bank_prop_spacing: usize,
}

/// A water body carved (or flooded) into the heightmap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WaterFeature {
    River(RiverSpec),
    Lake(BasinParams),
    /// Flat water plane at a normalized height; nothing is carved.
    Ocean { level: f32 },
}

impl WaterFeature {
    /// Declared water surface, if the feature has one.
    pub fn water_level(&self) -> Option<f32> {
        match self {
            WaterFeature::River(spec) => Some(spec.channel.water_level),
            WaterFeature::Lake(_) => None,
            WaterFeature::Ocean { level } => Some(*level),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            WaterFeature::River(spec) => spec.channel.validate(),
            WaterFeature::Lake(basin) => basin.validate(),
            WaterFeature::Ocean { level } if !level.is_finite() => {
                Err(Error::InvalidWaterFeature(format!("ocean level must be finite, got {}", level)))
            }
            WaterFeature::Ocean { .. } => Ok(()),
        }
    }
}

/// Everything [`TerrainComposer`](super::TerrainComposer) needs for one map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    pub width: usize,
    pub height: usize,
    pub depth: f32,              // World height of a normalized 1.0
    pub seed: u64,
    pub noise: NoiseParams,
    pub curve: HeightCurve,
    pub falloff: Option<FalloffParams>,
    pub randomize_offset: bool,
    pub water: Vec<WaterFeature>,
    pub paths: Vec<PathSpec>,
    pub generated_paths: Vec<GeneratedPath>, // Random curves, painted after `paths`
    pub path_brush_radius: u32,
    pub path_smoothness: u32,
    pub path_brush_shape: BrushShape,
    pub textures: Vec<TextureLayer>,
    pub shore_layer: Option<usize>,
    pub vegetation: Vec<PlacementRule>,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            depth: 10.0,
            seed: 0,
            noise: NoiseParams::default(),
            curve: HeightCurve::Linear,
            falloff: None,
            randomize_offset: false,
            water: Vec::new(),
            paths: Vec::new(),
            generated_paths: Vec::new(),
            path_brush_radius: 2,
            path_smoothness: 8,
            path_brush_shape: BrushShape::Diamond,
            textures: vec![
                TextureLayer::height_based("ground", HeightCurve::Constant),
                TextureLayer::slope_based("cliff", HeightCurve::EaseInOut),
                TextureLayer::height_based("sand", HeightCurve::EaseOut),
            ],
            shore_layer: Some(2),
            vegetation: vec![PlacementRule::grass(), PlacementRule::trees()],
        }
    }
}

impl TerrainParams {
    /// Parse from a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::info!("Loaded terrain params from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidDimensions { width: self.width, height: self.height });
        }
        if !self.depth.is_finite() || self.depth <= 0.0 {
            return Err(Error::InvalidNoiseParams(format!("depth must be > 0, got {}", self.depth)));
        }
        self.noise.validated()?;
        if let Some(falloff) = &self.falloff {
            falloff.validate()?;
        }
        for feature in &self.water {
            feature.validate()?;
        }
        if let Some(layer) = self.shore_layer {
            if layer >= self.textures.len() {
                return Err(Error::InvalidWaterFeature(format!(
                    "shore layer {} out of range ({} texture layers)",
                    layer,
                    self.textures.len()
                )));
            }
        }
        let path_layers = self.paths.iter().map(|p| p.layer).chain(self.generated_paths.iter().map(|g| g.layer));
        for layer in path_layers {
            if layer as usize >= self.textures.len() {
                return Err(Error::PathLayerOutOfRange { layer: layer as usize, layers: self.textures.len() });
            }
        }
        for rule in &self.vegetation {
            rule.validate()?;
        }
        Ok(())
    }
}
