//! Error types for terrain synthesis

use thiserror::Error;

/// Main error type for the library
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid grid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Invalid noise parameters: {0}")]
    InvalidNoiseParams(String),

    #[error("Degenerate waypath: {points} points (closed: {closed})")]
    DegenerateWaypath { points: usize, closed: bool },

    /// Internal bug: every grid access is expected to be clamped beforehand.
    #[error("Cell ({x}, {y}) out of range for {width}x{height} grid")]
    IndexOutOfRange { x: i64, y: i64, width: usize, height: usize },

    #[error("Path layer {layer} out of range ({layers} texture layers)")]
    PathLayerOutOfRange { layer: usize, layers: usize },

    #[error("Invalid falloff parameters: {0}")]
    InvalidFalloff(String),

    #[error("Invalid placement rule: {0}")]
    InvalidPlacementRule(String),

    #[error("Invalid water feature: {0}")]
    InvalidWaterFeature(String),

    #[error("Unknown height curve: {0}")]
    UnknownCurve(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}
