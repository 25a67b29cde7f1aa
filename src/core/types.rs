//! Core type aliases and re-exports

pub use glam::Vec2;

/// Standard Result type for the library
pub type Result<T> = std::result::Result<T, crate::core::error::Error>;

/// Grid cell coordinate `(x, y)`.
pub type Cell = (usize, usize);
