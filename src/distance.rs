//! Metric composition: tree preparation, edit distance and normalization.

use std::borrow::Cow;

use crate::cost::CostModel;
use crate::error::DistanceError;
use crate::normalize::{Normalization, Normalizer};
use crate::ted::{Alignment, TreeEditDistance};
use crate::tree::TextTree;

/// Options for [`TreeDistance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceOptions {
    /// Score normalization.
    ///
    /// Default: [`Normalization::MaxCost`]
    pub normalization: Normalization,

    /// Trim both trees to this depth before comparing (TTED@k).
    ///
    /// Also caps the depths averaged by [`TreeDistance::average_score`].
    /// Default: None
    pub depth_limit: Option<usize>,

    /// Prefix each node's text with its ancestors' text before comparing.
    ///
    /// Default: false
    pub context: bool,

    /// Separator placed between ancestor and node text in context mode.
    ///
    /// Default: a single space
    pub context_separator: String,

    /// Recover the edit script alongside the distance.
    ///
    /// Default: false
    pub with_script: bool,
}

impl Default for DistanceOptions {
    fn default() -> Self {
        Self {
            normalization: Normalization::MaxCost,
            depth_limit: None,
            context: false,
            context_separator: " ".to_string(),
            with_script: false,
        }
    }
}

impl DistanceOptions {
    /// Creates options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the normalization.
    #[must_use]
    pub const fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    /// Sets the depth limit.
    #[must_use]
    pub const fn with_depth_limit(mut self, depth: Option<usize>) -> Self {
        self.depth_limit = depth;
        self
    }

    /// Enables or disables context mode.
    #[must_use]
    pub const fn with_context(mut self, context: bool) -> Self {
        self.context = context;
        self
    }

    /// Sets the context separator.
    #[must_use]
    pub fn with_context_separator(mut self, separator: impl Into<String>) -> Self {
        self.context_separator = separator.into();
        self
    }

    /// Enables or disables edit-script recovery.
    #[must_use]
    pub const fn with_script(mut self, with_script: bool) -> Self {
        self.with_script = with_script;
        self
    }
}

/// Result of comparing two trees.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// Raw edit distance.
    pub raw: f64,
    /// Normalized score.
    pub score: f64,
    /// Minimal-cost edit script, when requested.
    ///
    /// Node ids refer to the prepared trees (after depth trimming), which
    /// coincide with the inputs when no depth limit is set.
    pub alignment: Option<Alignment>,
}

/// A complete tree metric: cost model, preparation and normalization.
///
/// # Examples
///
/// ```
/// use text_tree::{DistanceOptions, Normalization, TextTree, TreeDistance, UnitCost};
///
/// let a = TextTree::from_parts(
///     vec!["paper".into(), "methods".into(), "results".into()],
///     vec![vec![1, 2], vec![], vec![]],
/// ).unwrap();
/// let b = TextTree::from_parts(
///     vec!["paper".into(), "results".into()],
///     vec![vec![1], vec![]],
/// ).unwrap();
///
/// let metric = TreeDistance::with_options(
///     UnitCost,
///     DistanceOptions::new().with_normalization(Normalization::MaxCost),
/// );
/// let m = metric.measure(&a, &b).unwrap();
/// assert!((m.raw - 1.0).abs() < f64::EPSILON);
/// assert!((m.score - 0.2).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct TreeDistance<C> {
    engine: TreeEditDistance<C>,
    options: DistanceOptions,
}

impl<C: CostModel> TreeDistance<C> {
    /// Creates a metric with default options.
    #[must_use]
    pub fn new(cost: C) -> Self {
        Self::with_options(cost, DistanceOptions::default())
    }

    /// Creates a metric with explicit options.
    #[must_use]
    pub const fn with_options(cost: C, options: DistanceOptions) -> Self {
        Self {
            engine: TreeEditDistance::new(cost),
            options,
        }
    }

    /// Returns the options.
    #[must_use]
    pub const fn options(&self) -> &DistanceOptions {
        &self.options
    }

    /// Returns the cost model.
    #[must_use]
    pub const fn cost_model(&self) -> &C {
        self.engine.cost_model()
    }

    /// Compares `a` and `b` under the configured options.
    ///
    /// # Errors
    ///
    /// Propagates every [`DistanceError`] raised by the cost model.
    pub fn measure(&self, a: &TextTree, b: &TextTree) -> Result<Measurement, DistanceError> {
        self.measure_at(a, b, self.options.depth_limit, self.options.normalization)
    }

    /// Returns only the normalized score.
    ///
    /// # Errors
    ///
    /// See [`measure`](Self::measure).
    pub fn score(&self, a: &TextTree, b: &TextTree) -> Result<f64, DistanceError> {
        self.measure(a, b).map(|m| m.score)
    }

    /// Returns the edit script between the prepared trees.
    ///
    /// # Errors
    ///
    /// See [`measure`](Self::measure).
    pub fn align(&self, a: &TextTree, b: &TextTree) -> Result<Alignment, DistanceError> {
        let (a, b) = self.prepare(a, b, self.options.depth_limit);
        self.engine.align(&a, &b)
    }

    /// Mean normalized score over every depth limit `1..=max_depth` (AvgTTED).
    ///
    /// `max_depth` is the deeper of the two trees, capped by the configured
    /// depth limit. Two single-level trees are compared at depth 0 only.
    /// Unbounded normalization is replaced by [`Normalization::MaxCost`] so
    /// that every depth contributes on the same scale.
    ///
    /// # Errors
    ///
    /// See [`measure`](Self::measure).
    pub fn average_score(&self, a: &TextTree, b: &TextTree) -> Result<f64, DistanceError> {
        let mut max_depth = a.max_depth().max(b.max_depth());
        if let Some(limit) = self.options.depth_limit {
            max_depth = max_depth.min(limit);
        }
        let normalization = if self.options.normalization.is_bounded() {
            self.options.normalization
        } else {
            Normalization::MaxCost
        };

        if max_depth == 0 {
            return self
                .measure_at(a, b, Some(0), normalization)
                .map(|m| m.score);
        }

        let mut total = 0.0;
        for depth in 1..=max_depth {
            total += self.measure_at(a, b, Some(depth), normalization)?.score;
        }
        #[allow(clippy::cast_precision_loss)]
        let count = max_depth as f64;
        Ok(total / count)
    }

    fn measure_at(
        &self,
        a: &TextTree,
        b: &TextTree,
        depth_limit: Option<usize>,
        normalization: Normalization,
    ) -> Result<Measurement, DistanceError> {
        let (a, b) = self.prepare(a, b, depth_limit);
        let (raw, alignment) = if self.options.with_script {
            let alignment = self.engine.align(&a, &b)?;
            (alignment.distance(), Some(alignment))
        } else {
            (self.engine.distance(&a, &b)?, None)
        };
        let score =
            Normalizer::new(normalization).normalize(raw, &a, &b, self.engine.cost_model())?;
        tracing::debug!(
            nodes_a = a.len(),
            nodes_b = b.len(),
            raw,
            score,
            depth_limit,
            "measured tree distance"
        );
        Ok(Measurement {
            raw,
            score,
            alignment,
        })
    }

    fn prepare<'t>(
        &self,
        a: &'t TextTree,
        b: &'t TextTree,
        depth_limit: Option<usize>,
    ) -> (Cow<'t, TextTree>, Cow<'t, TextTree>) {
        let prepare = |tree: &'t TextTree| {
            let mut tree = Cow::Borrowed(tree);
            match depth_limit {
                Some(depth) if tree.max_depth() > depth => {
                    tree = Cow::Owned(tree.truncated(depth));
                }
                _ => {}
            }
            if self.options.context {
                tree = Cow::Owned(tree.with_context(&self.options.context_separator));
            }
            tree
        };
        (prepare(a), prepare(b))
    }
}

/// Compares two trees with default options and returns the score together
/// with the edit script.
///
/// # Errors
///
/// Propagates every [`DistanceError`] raised by the cost model.
pub fn distance<C: CostModel + ?Sized>(
    a: &TextTree,
    b: &TextTree,
    cost: &C,
) -> Result<Measurement, DistanceError> {
    TreeDistance::with_options(cost, DistanceOptions::default().with_script(true)).measure(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::UnitCost;
    use crate::error::CostError;
    use crate::outline::Outline;

    fn paper() -> TextTree {
        TextTree::from_outline(
            &Outline::new(
                "paper",
                vec![
                    Outline::new("methods", vec![Outline::leaf("survey"), Outline::leaf("model")]),
                    Outline::new("results", vec![Outline::leaf("accuracy")]),
                ],
            ),
        )
        .unwrap()
    }

    fn shallow_variant() -> TextTree {
        TextTree::from_outline(
            &Outline::new(
                "paper",
                vec![
                    Outline::new("methods", vec![Outline::leaf("interviews"), Outline::leaf("model")]),
                    Outline::new("results", vec![Outline::leaf("recall")]),
                ],
            ),
        )
        .unwrap()
    }

    /// Multi-word (contextual) texts cost more to insert or delete.
    struct PrefixCost;

    impl CostModel for PrefixCost {
        fn relabel(&self, from: &str, to: &str) -> Result<f64, CostError> {
            Ok(if from == to { 0.0 } else { 1.0 })
        }
        fn insert(&self, text: &str) -> Result<f64, CostError> {
            Ok(if text.contains(' ') { 1.0 } else { 0.5 })
        }
        fn delete(&self, text: &str) -> Result<f64, CostError> {
            self.insert(text)
        }
    }

    #[test]
    fn entry_point_returns_script() {
        let m = distance(&paper(), &shallow_variant(), &UnitCost).unwrap();
        assert!((m.raw - 2.0).abs() < f64::EPSILON);
        assert!((m.score - 2.0 / 12.0).abs() < 1e-12);
        let alignment = m.alignment.unwrap();
        assert!((alignment.total_cost() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn depth_limit_hides_deeper_changes() {
        let metric = TreeDistance::with_options(
            UnitCost,
            DistanceOptions::new().with_depth_limit(Some(1)),
        );
        let m = metric.measure(&paper(), &shallow_variant()).unwrap();
        assert!(m.raw.abs() < f64::EPSILON);
        assert!(m.score.abs() < f64::EPSILON);
    }

    #[test]
    fn average_score_spans_depths() {
        let metric = TreeDistance::new(UnitCost);
        // depth 1: identical; depth 2: 2 / 12
        let avg = metric.average_score(&paper(), &shallow_variant()).unwrap();
        assert!((avg - 1.0 / 12.0).abs() < 1e-12);
    }

    #[test]
    fn average_score_of_single_nodes() {
        let metric = TreeDistance::new(UnitCost);
        let a = TextTree::leaf("x").unwrap();
        let b = TextTree::leaf("y").unwrap();
        assert!((metric.average_score(&a, &b).unwrap() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn context_mode_changes_labels() {
        let plain = TreeDistance::new(PrefixCost);
        let contextual = TreeDistance::with_options(PrefixCost, DistanceOptions::new().with_context(true));
        let a = paper();
        let b = shallow_variant();
        let plain_raw = plain.measure(&a, &b).unwrap().raw;
        let context_raw = contextual.measure(&a, &b).unwrap().raw;
        assert!((plain_raw - 2.0).abs() < f64::EPSILON);
        assert!((context_raw - 2.0).abs() < f64::EPSILON);

        // A renamed parent changes every contextual descendant label.
        let renamed = TextTree::from_outline(
            &Outline::new(
                "paper",
                vec![
                    Outline::new("approach", vec![Outline::leaf("survey"), Outline::leaf("model")]),
                    Outline::new("results", vec![Outline::leaf("accuracy")]),
                ],
            ),
        )
        .unwrap();
        assert!((plain.measure(&a, &renamed).unwrap().raw - 1.0).abs() < f64::EPSILON);
        assert!((contextual.measure(&a, &renamed).unwrap().raw - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unbounded_normalization_reports_raw() {
        let metric = TreeDistance::with_options(
            UnitCost,
            DistanceOptions::new().with_normalization(Normalization::None),
        );
        let m = metric.measure(&paper(), &TextTree::empty()).unwrap();
        assert!((m.score - 6.0).abs() < f64::EPSILON);
        assert!(m.alignment.is_none());
    }
}
