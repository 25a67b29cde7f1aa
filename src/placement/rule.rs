//! Vegetation placement rules.

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::terrain::NoiseParams;

/// Default instance cap for tree layers.
pub const DEFAULT_TREE_CAP: usize = 500;

/// Predicate thresholds for one vegetation layer.
///
/// Heights are world units (normalized height × terrain depth). `noise` drives
/// the island pattern: a cell qualifies only where the raw noise value is
/// below `island_threshold`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementRule {
    pub name: String,
    pub min_height: f32,
    pub max_height: f32,
    pub max_steepness_degrees: f32,
    pub island_threshold: f32,      // Raw noise cutoff, roughly [-1, 1]
    pub density: f32,               // Acceptance probability, [0, 1]
    pub noise: NoiseParams,
    pub randomize_offset: bool,     // Re-roll noise offsets from the terrain seed
    pub jitter: f32,                // Max position offset in cells, 0 = cell corner
    pub max_instances: Option<usize>,
}

impl Default for PlacementRule {
    fn default() -> Self {
        Self::grass()
    }
}

impl PlacementRule {
    /// Dense ground cover with no instance cap.
    pub fn grass() -> Self {
        Self {
            name: "grass".into(),
            min_height: 0.0,
            max_height: 100.0,
            max_steepness_degrees: 70.0,
            island_threshold: 0.0,
            density: 0.5,
            noise: NoiseParams { scale: 40.0, ..Default::default() },
            randomize_offset: false,
            jitter: 0.0,
            max_instances: None,
        }
    }

    /// Sparse trees, jittered within their cell and capped.
    pub fn trees() -> Self {
        Self {
            name: "trees".into(),
            jitter: 1.0,
            max_instances: Some(DEFAULT_TREE_CAP),
            ..Self::grass()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let finite = [
            self.min_height,
            self.max_height,
            self.max_steepness_degrees,
            self.island_threshold,
            self.density,
            self.jitter,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidPlacementRule(format!("'{}' has a non-finite threshold", self.name)));
        }
        if self.min_height > self.max_height {
            return Err(Error::InvalidPlacementRule(format!(
                "'{}' min_height {} exceeds max_height {}",
                self.name, self.min_height, self.max_height
            )));
        }
        if !(0.0..=1.0).contains(&self.density) {
            return Err(Error::InvalidPlacementRule(format!(
                "'{}' density {} outside [0, 1]",
                self.name, self.density
            )));
        }
        if self.jitter < 0.0 {
            return Err(Error::InvalidPlacementRule(format!("'{}' jitter must be >= 0", self.name)));
        }
        self.noise
            .validated()
            .map_err(|e| Error::InvalidPlacementRule(format!("'{}' noise: {}", self.name, e)))?;
        Ok(())
    }
}
