//! Path painting onto a layer-id mask.

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::waypath::{clip_segment, densify, Waypath};
use crate::core::{Cell, Error, Result};
use crate::math::Grid;
use crate::texture::Splatmap;

/// Brush footprint around each path sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushShape {
    /// Chebyshev ball: `max(|dx|, |dy|) <= r`.
    Square,
    /// Manhattan ball: `|dx| + |dy| <= r`.
    #[default]
    Diamond,
}

impl BrushShape {
    #[inline]
    fn covers(self, dx: i64, dy: i64, radius: i64) -> bool {
        match self {
            BrushShape::Square => dx.abs().max(dy.abs()) <= radius,
            BrushShape::Diamond => dx.abs() + dy.abs() <= radius,
        }
    }
}

/// A waypath and the texture layer it paints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathSpec {
    pub path: Waypath,
    pub layer: u16,
}

/// Output of [`PathPainter::paint`].
#[derive(Clone, Debug)]
pub struct PaintedPaths {
    /// Winning layer per cell, `None` where no path passes.
    pub layers: Grid<Option<u16>>,
    pub touched: HashSet<Cell>,
}

impl PaintedPaths {
    pub fn touched_cells(&self) -> &HashSet<Cell> {
        &self.touched
    }

    pub fn is_touched(&self, x: usize, y: usize) -> bool {
        self.touched.contains(&(x, y))
    }

    /// Paint every touched cell onto `splatmap`, winner-take-all.
    ///
    /// Fails without touching the splatmap when a path layer is missing.
    pub fn apply_to(&self, splatmap: &mut Splatmap) -> Result<()> {
        let layers = splatmap.layer_count();
        if let Some(layer) = self.layers.as_slice().iter().flatten().find(|&&l| l as usize >= layers) {
            return Err(Error::PathLayerOutOfRange { layer: *layer as usize, layers });
        }
        for ((x, y), layer) in self.layers.iter_cells() {
            if let Some(layer) = *layer {
                splatmap.paint_exclusive(x, y, layer as usize);
            }
        }
        Ok(())
    }
}

/// Stamps brushes along waypaths.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathPainter {
    pub brush_radius: u32,
    pub smoothness: u32, // Bezier samples per control triple, 0 = straight segments
    pub shape: BrushShape,
}

impl Default for PathPainter {
    fn default() -> Self {
        Self { brush_radius: 2, smoothness: 8, shape: BrushShape::Diamond }
    }
}

impl PathPainter {
    pub fn new(brush_radius: u32, smoothness: u32) -> Self {
        Self { brush_radius, smoothness, ..Default::default() }
    }

    pub fn with_shape(mut self, shape: BrushShape) -> Self {
        self.shape = shape;
        self
    }

    /// Paint `paths` in order onto a fresh `width × height` mask; later paths
    /// win where they overlap earlier ones.
    ///
    /// Each centerline segment is clipped to the grid (grown by the brush
    /// radius) before it is densified, so work stays bounded by the grid size
    /// however far a path wanders off the map.
    pub fn paint(&self, width: usize, height: usize, paths: &[PathSpec]) -> Result<PaintedPaths> {
        let mut layers = Grid::<Option<u16>>::new(width, height)?;
        let mut touched = HashSet::new();

        let margin = self.brush_radius as f32 + 1.0;
        let min = Vec2::splat(-margin);
        let max = Vec2::new(width as f32 - 1.0 + margin, height as f32 - 1.0 + margin);

        for spec in paths {
            let centerline = spec.path.sample(self.smoothness);
            let mut stamps = 0usize;
            for pair in centerline.windows(2) {
                let Some((a, b)) = clip_segment(pair[0], pair[1], min, max) else {
                    continue;
                };
                for p in densify(&[a, b], 1.0) {
                    self.stamp(&mut layers, &mut touched, p.x.round() as i64, p.y.round() as i64, spec.layer);
                    stamps += 1;
                }
            }
            log::debug!(
                "Painted path layer {} ({} control points, {} stamps)",
                spec.layer, spec.path.points().len(), stamps
            );
        }

        Ok(PaintedPaths { layers, touched })
    }

    fn stamp(&self, layers: &mut Grid<Option<u16>>, touched: &mut HashSet<Cell>, cx: i64, cy: i64, layer: u16) {
        let r = self.brush_radius as i64;
        for dy in -r..=r {
            for dx in -r..=r {
                if !self.shape.covers(dx, dy, r) {
                    continue;
                }
                let (x, y) = (cx + dx, cy + dy);
                if !layers.in_bounds(x, y) {
                    continue;
                }
                let cell = (x as usize, y as usize);
                layers[cell] = Some(layer);
                touched.insert(cell);
            }
        }
    }
}
