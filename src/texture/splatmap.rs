//! Per-layer texture weights derived from height and slope.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::math::Grid;
use crate::terrain::HeightCurve;

/// How a texture layer's weight is derived.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextureRule {
    /// `curve(normalized height)`
    HeightBased { curve: HeightCurve },
    /// `curve(steepness / 90)`
    SlopeBased { curve: HeightCurve },
}

/// One terrain texture layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextureLayer {
    pub name: String,
    #[serde(flatten)]
    pub rule: TextureRule,
}

impl TextureLayer {
    pub fn height_based(name: impl Into<String>, curve: HeightCurve) -> Self {
        Self { name: name.into(), rule: TextureRule::HeightBased { curve } }
    }

    pub fn slope_based(name: impl Into<String>, curve: HeightCurve) -> Self {
        Self { name: name.into(), rule: TextureRule::SlopeBased { curve } }
    }

    /// Weight for a cell with normalized height `h` and steepness in degrees.
    #[inline]
    pub fn weight(&self, h: f32, steepness_degrees: f32) -> f32 {
        let w = match self.rule {
            TextureRule::HeightBased { curve } => curve.evaluate(h),
            TextureRule::SlopeBased { curve } => curve.evaluate(steepness_degrees / 90.0),
        };
        w.clamp(0.0, 1.0)
    }
}

/// Texture weight grids, one per layer, all the same size.
#[derive(Clone, Debug, PartialEq)]
pub struct Splatmap {
    pub layers: Vec<Grid<f32>>,
}

impl Splatmap {
    /// Zero weights for `layer_count` layers.
    pub fn new(width: usize, height: usize, layer_count: usize) -> Result<Self> {
        let blank = Grid::<f32>::new(width, height)?;
        Ok(Self { layers: vec![blank; layer_count] })
    }

    /// Evaluate every layer over a normalized heightmap and its steepness map.
    pub fn from_layers(heights: &Grid<f32>, steepness: &Grid<f32>, layers: &[TextureLayer]) -> Result<Self> {
        if !heights.same_size(steepness) {
            return Err(Error::InvalidDimensions { width: steepness.width(), height: steepness.height() });
        }

        let grids = layers
            .iter()
            .map(|layer| {
                let mut grid = heights.map(|_| 0.0f32);
                grid.par_rows_mut().for_each(|(y, row)| {
                    for (x, w) in row.iter_mut().enumerate() {
                        *w = layer.weight(heights[(x, y)], steepness[(x, y)]);
                    }
                });
                grid
            })
            .collect();

        Ok(Self { layers: grids })
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Weight of `layer` at `(x, y)`, 0 when out of range.
    pub fn weight(&self, layer: usize, x: usize, y: usize) -> f32 {
        self.layers
            .get(layer)
            .and_then(|g| g.get(x, y))
            .copied()
            .unwrap_or(0.0)
    }

    /// Set `layer` to 1 and every other layer to 0 at `(x, y)`.
    ///
    /// Returns false (and leaves the cell alone) if the layer or cell is out of range.
    pub fn paint_exclusive(&mut self, x: usize, y: usize, layer: usize) -> bool {
        if layer >= self.layers.len() || self.layers[layer].get(x, y).is_none() {
            return false;
        }
        for (i, grid) in self.layers.iter_mut().enumerate() {
            grid[(x, y)] = if i == layer { 1.0 } else { 0.0 };
        }
        true
    }

    /// Blend a shore layer in by wetness: the shore weight becomes
    /// `max(existing, wetness)` and every other layer is scaled by `1 - wetness`.
    pub fn blend_shore(&mut self, layer: usize, wetness: &Grid<f32>) -> Result<()> {
        if layer >= self.layers.len() {
            return Err(Error::InvalidWaterFeature(format!(
                "shore layer {} out of range ({} layers)",
                layer,
                self.layers.len()
            )));
        }
        if !self.layers[layer].same_size(wetness) {
            return Err(Error::InvalidDimensions { width: wetness.width(), height: wetness.height() });
        }

        for (i, grid) in self.layers.iter_mut().enumerate() {
            let is_shore = i == layer;
            for (w, &wet) in grid.as_mut_slice().iter_mut().zip(wetness.as_slice()) {
                let wet = wet.clamp(0.0, 1.0);
                *w = if is_shore { w.max(wet) } else { *w * (1.0 - wet) };
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: usize) -> Grid<f32> {
        let data = (0..width * 4).map(|i| (i % width) as f32 / (width - 1) as f32).collect();
        Grid::from_vec(width, 4, data).unwrap()
    }

    #[test]
    fn test_height_and_slope_layers() {
        let heights = ramp(11);
        let mut steepness = heights.map(|_| 0.0f32);
        steepness[(0, 0)] = 90.0;

        let layers = [
            TextureLayer::height_based("grass", HeightCurve::Linear),
            TextureLayer::slope_based("rock", HeightCurve::Linear),
        ];
        let splat = Splatmap::from_layers(&heights, &steepness, &layers).unwrap();
        assert_eq!(splat.layer_count(), 2);
        assert!((splat.weight(0, 5, 0) - 0.5).abs() < 1e-6);
        assert_eq!(splat.weight(1, 0, 0), 1.0);
        assert_eq!(splat.weight(1, 1, 0), 0.0);
    }

    #[test]
    fn test_mismatched_inputs() {
        let heights = ramp(8);
        let steepness = Grid::<f32>::new(4, 4).unwrap();
        assert!(Splatmap::from_layers(&heights, &steepness, &[]).is_err());
    }

    #[test]
    fn test_paint_exclusive() {
        let mut splat = Splatmap::new(4, 4, 3).unwrap();
        splat.layers[0][(1, 1)] = 0.8;
        assert!(splat.paint_exclusive(1, 1, 2));
        assert_eq!(splat.weight(0, 1, 1), 0.0);
        assert_eq!(splat.weight(2, 1, 1), 1.0);
        assert!(!splat.paint_exclusive(1, 1, 5));
        assert!(!splat.paint_exclusive(9, 1, 0));
    }

    #[test]
    fn test_blend_shore() {
        let mut splat = Splatmap::new(2, 1, 2).unwrap();
        splat.layers[0] = Grid::from_vec(2, 1, vec![1.0, 1.0]).unwrap();
        let wetness = Grid::from_vec(2, 1, vec![0.0, 0.75]).unwrap();
        splat.blend_shore(1, &wetness).unwrap();
        assert_eq!(splat.weight(0, 0, 0), 1.0);
        assert!((splat.weight(0, 1, 0) - 0.25).abs() < 1e-6);
        assert_eq!(splat.weight(1, 1, 0), 0.75);
        assert!(splat.blend_shore(4, &wetness).is_err());
    }

    #[test]
    fn test_layer_json() {
        let layer: TextureLayer =
            serde_json::from_str(r#"{"name": "cliff", "type": "slope_based", "curve": "easein"}"#).unwrap();
        assert_eq!(layer, TextureLayer::slope_based("cliff", HeightCurve::EaseInOut));
    }
}
