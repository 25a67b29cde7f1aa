//! Per-cell vegetation acceptance.

use super::random::RandomSource;
use super::rule::PlacementRule;
use crate::core::Cell;

/// Terrain properties at one candidate cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellSample {
    pub cell: Cell,
    /// World units.
    pub height: f32,
    pub steepness_degrees: f32,
    /// Raw value of the rule's noise at this cell.
    pub noise: f32,
}

/// Whether a vegetation instance goes at this cell.
///
/// Exactly one value is drawn from `rng` per call, whatever the predicate
/// outcome, so a row's stream stays aligned across parameter changes.
pub fn evaluate(sample: &CellSample, rule: &PlacementRule, rng: &mut impl RandomSource) -> bool {
    let roll = rng.next_unit();

    sample.noise < rule.island_threshold
        && sample.steepness_degrees < rule.max_steepness_degrees
        && sample.height > rule.min_height
        && sample.height < rule.max_height
        && roll < rule.density
}
