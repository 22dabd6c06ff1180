//! Metrics under evaluation.

use text_tree::rouge::pairwise_rouge_distance;
use text_tree::{CostModel, DistanceError, TextTree, TreeDistance};

/// A tree-pair metric the quality evaluator can score with.
///
/// Implementations must be safe to call from several threads at once.
pub trait TreeMetric: Send + Sync {
    /// Name used in results and reports.
    fn name(&self) -> &str;

    /// Scores the distance from `reference` to `candidate`.
    ///
    /// # Errors
    ///
    /// Returns the `DistanceError` that aborted this pair.
    fn score(&self, reference: &TextTree, candidate: &TextTree) -> Result<f64, DistanceError>;
}

impl<M: TreeMetric + ?Sized> TreeMetric for &M {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn score(&self, reference: &TextTree, candidate: &TextTree) -> Result<f64, DistanceError> {
        (**self).score(reference, candidate)
    }
}

impl<M: TreeMetric + ?Sized> TreeMetric for Box<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn score(&self, reference: &TextTree, candidate: &TextTree) -> Result<f64, DistanceError> {
        (**self).score(reference, candidate)
    }
}

/// Normalized tree edit distance (TTED, or TTED@k with a depth limit).
#[derive(Debug)]
pub struct TtedMetric<C> {
    name: String,
    distance: TreeDistance<C>,
}

impl<C: CostModel> TtedMetric<C> {
    /// Wraps a configured distance under the given name.
    #[must_use]
    pub fn new(name: impl Into<String>, distance: TreeDistance<C>) -> Self {
        Self {
            name: name.into(),
            distance,
        }
    }

    /// Returns the wrapped distance.
    #[must_use]
    pub const fn distance(&self) -> &TreeDistance<C> {
        &self.distance
    }
}

impl<C: CostModel> TreeMetric for TtedMetric<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn score(&self, reference: &TextTree, candidate: &TextTree) -> Result<f64, DistanceError> {
        self.distance.score(reference, candidate)
    }
}

/// Mean normalized distance over depth truncations (AvgTTED).
#[derive(Debug)]
pub struct AvgTtedMetric<C> {
    name: String,
    distance: TreeDistance<C>,
}

impl<C: CostModel> AvgTtedMetric<C> {
    /// Wraps a configured distance under the given name.
    #[must_use]
    pub fn new(name: impl Into<String>, distance: TreeDistance<C>) -> Self {
        Self {
            name: name.into(),
            distance,
        }
    }
}

impl<C: CostModel> TreeMetric for AvgTtedMetric<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn score(&self, reference: &TextTree, candidate: &TextTree) -> Result<f64, DistanceError> {
        self.distance.average_score(reference, candidate)
    }
}

/// Kernel distance over parent-child ROUGE similarities.
///
/// Lexical only, so it serves as the paraphrase-sensitive baseline.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairwiseRougeMetric;

impl TreeMetric for PairwiseRougeMetric {
    fn name(&self) -> &str {
        "pairwise_rouge"
    }

    fn score(&self, reference: &TextTree, candidate: &TextTree) -> Result<f64, DistanceError> {
        Ok(pairwise_rouge_distance(reference, candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use text_tree::{DistanceOptions, Outline, UnitCost};

    fn pair() -> (TextTree, TextTree) {
        let a = TextTree::from_outline(&Outline::new(
            "root",
            vec![Outline::new("a", vec![Outline::leaf("b")])],
        ))
        .unwrap();
        let b = TextTree::from_outline(&Outline::new(
            "root",
            vec![Outline::new("a", vec![Outline::leaf("c")])],
        ))
        .unwrap();
        (a, b)
    }

    #[test]
    fn tted_delegates_to_distance() {
        let (a, b) = pair();
        let metric = TtedMetric::new("unit", TreeDistance::new(UnitCost));
        assert_eq!(metric.name(), "unit");
        // One relabel over 3 + 3 indel cost.
        assert!((metric.score(&a, &b).unwrap() - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn depth_limited_tted_ignores_deep_changes() {
        let (a, b) = pair();
        let distance =
            TreeDistance::with_options(UnitCost, DistanceOptions::new().with_depth_limit(Some(1)));
        let metric = TtedMetric::new("unit@1", distance);
        assert!(metric.score(&a, &b).unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn avg_tted_averages_depths() {
        let (a, b) = pair();
        let metric = AvgTtedMetric::new("avg", TreeDistance::new(UnitCost));
        // Depth 1: 0, depth 2: 1/6.
        assert!((metric.score(&a, &b).unwrap() - 1.0 / 12.0).abs() < 1e-12);
    }

    #[test]
    fn rouge_metric_is_zero_for_identical_trees() {
        let (a, _) = pair();
        let metric: Box<dyn TreeMetric> = Box::new(PairwiseRougeMetric);
        assert_eq!(metric.name(), "pairwise_rouge");
        assert!(metric.score(&a, &a).unwrap().abs() < 1e-12);
    }
}
