//! PNG and JSON export of composed terrain.

use std::path::Path;

use image::{GrayImage, Luma};
use serde_json::json;

use crate::core::Result;
use crate::generation::ComposedTerrain;
use crate::math::{inverse_lerp, Grid};

/// Write a [0, 1] grid as an 8-bit grayscale PNG. Values are clamped.
pub fn write_grayscale(grid: &Grid<f32>, path: impl AsRef<Path>) -> Result<()> {
    to_image(grid, |v| v).save(path.as_ref())?;
    Ok(())
}

/// Write a grid stretched from its own min/max to the full 8-bit range.
pub fn write_normalized(grid: &Grid<f32>, path: impl AsRef<Path>) -> Result<()> {
    let (min, max) = grid.min_max();
    to_image(grid, |v| inverse_lerp(min, max, v)).save(path.as_ref())?;
    Ok(())
}

/// Write a layer mask: unpainted cells black, each layer a distinct gray.
pub fn write_layer_mask(mask: &Grid<Option<u16>>, path: impl AsRef<Path>) -> Result<()> {
    let top = mask.as_slice().iter().flatten().copied().max().unwrap_or(0) as u32 + 1;
    let img = GrayImage::from_fn(mask.width() as u32, mask.height() as u32, |x, y| {
        let level = match mask[(x as usize, y as usize)] {
            Some(layer) => ((layer as u32 + 1) * 255 / top) as u8,
            None => 0,
        };
        Luma([level])
    });
    img.save(path.as_ref())?;
    Ok(())
}

fn to_image(grid: &Grid<f32>, f: impl Fn(f32) -> f32) -> GrayImage {
    GrayImage::from_fn(grid.width() as u32, grid.height() as u32, |x, y| {
        let v = f(grid[(x as usize, y as usize)]).clamp(0.0, 1.0);
        Luma([(v * 255.0).round() as u8])
    })
}

/// Summary statistics of a composed terrain.
pub fn summary(terrain: &ComposedTerrain) -> serde_json::Value {
    let (min, max) = terrain.heights.min_max();
    let layer_counts: Vec<usize> = {
        let layers = terrain.placements.iter().map(|p| p.layer + 1).max().unwrap_or(0);
        (0..layers).map(|l| terrain.placements_for(l).count()).collect()
    };

    json!({
        "width": terrain.heights.width(),
        "height": terrain.heights.height(),
        "depth": terrain.depth,
        "height_range": [min, max],
        "water_level": terrain.water_level,
        "rivers": terrain.rivers.iter().map(|r| r.points().len()).collect::<Vec<_>>(),
        "bank_props": terrain.bank_props.len(),
        "paths": terrain.paths.len(),
        "path_cells": terrain.path_cells.len(),
        "texture_layers": terrain.texture_weights.layer_count(),
        "placements": {
            "total": terrain.placements.len(),
            "per_layer": layer_counts,
        },
    })
}

/// Write [`summary`] as pretty-printed JSON.
pub fn write_summary(terrain: &ComposedTerrain, path: impl AsRef<Path>) -> Result<()> {
    let text = serde_json::to_string_pretty(&summary(terrain))?;
    std::fs::write(path.as_ref(), text)?;
    Ok(())
}
