//! Bounded rescaling of raw edit distances.

use std::fmt;

use crate::cost::{validate_cost, CostModel};
use crate::error::{CostOperation, DistanceError};
use crate::tree::TextTree;

/// How a raw distance is mapped to a comparable score.
///
/// The bounded modes are monotonic in the raw distance, return 0 for
/// identical trees and stay within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Normalization {
    /// `d / (Σ delete(A) + Σ insert(B))`: the fraction of the cost of
    /// rebuilding `B` from scratch.
    #[default]
    MaxCost,
    /// `2d / (w_max · (|A| + |B|) + d)` with `w_max` the largest insert or
    /// delete weight over both trees.
    Harmonic,
    /// The raw distance, unbounded.
    None,
}

impl Normalization {
    /// Returns true if scores produced by this mode lie in `[0, 1]`.
    #[must_use]
    pub const fn is_bounded(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Short lowercase name, used in metric names and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MaxCost => "max_cost",
            Self::Harmonic => "harmonic",
            Self::None => "none",
        }
    }

    /// Rescales `raw` using precomputed indel totals.
    ///
    /// A zero denominator (two empty trees, or free indels) yields 0.
    #[must_use]
    pub fn apply(self, raw: f64, bounds: &IndelBounds) -> f64 {
        match self {
            Self::MaxCost => bounded_ratio(raw, bounds.total),
            Self::Harmonic => {
                #[allow(clippy::cast_precision_loss)]
                let nodes = bounds.nodes as f64;
                bounded_ratio(2.0 * raw, bounds.max_weight * nodes + raw)
            }
            Self::None => raw,
        }
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `numerator / denominator` clamped to `[0, 1]`, or 0 when undefined.
fn bounded_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    (numerator / denominator).clamp(0.0, 1.0)
}

/// Insert/delete weight totals for one tree pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IndelBounds {
    /// Cost of deleting all of `A` plus inserting all of `B`.
    pub total: f64,
    /// Largest single delete (over `A`) or insert (over `B`) weight.
    pub max_weight: f64,
    /// `|A| + |B|`.
    pub nodes: usize,
}

impl IndelBounds {
    /// Collects the indel weights of `a` (deletes) and `b` (inserts).
    ///
    /// # Errors
    ///
    /// Propagates cost model failures and rejects invalid costs, exactly as
    /// the distance engine does.
    pub fn of<C: CostModel + ?Sized>(
        a: &TextTree,
        b: &TextTree,
        cost: &C,
    ) -> Result<Self, DistanceError> {
        let mut bounds = Self {
            nodes: a.len() + b.len(),
            ..Self::default()
        };
        for text in a.texts() {
            let weight = validate_cost(CostOperation::Delete, cost.delete(text)?)?;
            bounds.total += weight;
            bounds.max_weight = bounds.max_weight.max(weight);
        }
        for text in b.texts() {
            let weight = validate_cost(CostOperation::Insert, cost.insert(text)?)?;
            bounds.total += weight;
            bounds.max_weight = bounds.max_weight.max(weight);
        }
        Ok(bounds)
    }
}

/// Applies a [`Normalization`] to raw distances of arbitrary tree pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    mode: Normalization,
}

impl Normalizer {
    /// Creates a normalizer for the given mode.
    #[must_use]
    pub const fn new(mode: Normalization) -> Self {
        Self { mode }
    }

    /// Returns the mode.
    #[must_use]
    pub const fn mode(&self) -> Normalization {
        self.mode
    }

    /// Rescales the raw distance between `a` and `b`.
    ///
    /// # Errors
    ///
    /// See [`IndelBounds::of`].
    pub fn normalize<C: CostModel + ?Sized>(
        &self,
        raw: f64,
        a: &TextTree,
        b: &TextTree,
        cost: &C,
    ) -> Result<f64, DistanceError> {
        if self.mode == Normalization::None {
            return Ok(raw);
        }
        let bounds = IndelBounds::of(a, b, cost)?;
        Ok(self.mode.apply(raw, &bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::UnitCost;

    fn bounds(total: f64, max_weight: f64, nodes: usize) -> IndelBounds {
        IndelBounds {
            total,
            max_weight,
            nodes,
        }
    }

    #[test]
    fn max_cost_divides_by_rebuild_cost() {
        let score = Normalization::MaxCost.apply(2.0, &bounds(8.0, 1.0, 8));
        assert!((score - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn harmonic_matches_closed_form() {
        // 2·2 / (1·8 + 2)
        let score = Normalization::Harmonic.apply(2.0, &bounds(8.0, 1.0, 8));
        assert!((score - 0.4).abs() < 1e-12);
    }

    #[test]
    fn zero_distance_scores_zero() {
        for mode in [Normalization::MaxCost, Normalization::Harmonic, Normalization::None] {
            assert!(mode.apply(0.0, &bounds(6.0, 1.0, 6)).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn zero_denominator_scores_zero() {
        assert!(Normalization::MaxCost.apply(0.0, &IndelBounds::default()).abs() < f64::EPSILON);
        assert!(Normalization::Harmonic.apply(0.0, &IndelBounds::default()).abs() < f64::EPSILON);
    }

    #[test]
    fn bounded_modes_are_monotonic_and_capped() {
        let b = bounds(10.0, 1.0, 10);
        for mode in [Normalization::MaxCost, Normalization::Harmonic] {
            let mut previous = 0.0;
            for step in 0..=10 {
                let score = mode.apply(f64::from(step), &b);
                assert!(score >= previous, "{mode} not monotonic at {step}");
                assert!((0.0..=1.0).contains(&score));
                previous = score;
            }
            assert!((mode.apply(10.0, &b) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn none_passes_through() {
        assert!((Normalization::None.apply(7.5, &bounds(1.0, 1.0, 2)) - 7.5).abs() < f64::EPSILON);
        assert!(!Normalization::None.is_bounded());
    }

    #[test]
    fn normalizer_uses_unit_indels() {
        let a = TextTree::leaf("a").unwrap();
        let b = TextTree::leaf("b").unwrap();
        let score = Normalizer::default().normalize(1.0, &a, &b, &UnitCost).unwrap();
        assert!((score - 0.5).abs() < f64::EPSILON);
    }
}
