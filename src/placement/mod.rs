//! Vegetation placement: rules, the per-cell filter and seeded randomness.

pub mod filter;
pub mod random;
pub mod rule;

pub use filter::{evaluate, CellSample};
pub use random::{RandomSource, SeedSequence};
pub use rule::{PlacementRule, DEFAULT_TREE_CAP};
