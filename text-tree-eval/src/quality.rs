//! Quality coefficients: how a metric responds to each perturbation class.
//!
//! For every class `c` and every magnitude `k` present in all three classes,
//! the aggregated response `R(c, k)` is contrasted with the mean response of
//! the other two classes at the same `k`:
//!
//! ```text
//! ratio(c) = aggregate over k of  R(c, k) / mean(R(o1, k), R(o2, k))
//!
//! paraphrase_invariance  = 1 - ratio(paraphrase)
//! structural_sensitivity = ratio(structural)
//! semantic_sensitivity   = ratio(semantic)
//! ```
//!
//! Undefined coefficients are NaN, never 0.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use text_tree::{DistanceError, TextTree};

use crate::error::{CorpusError, EvalError};
use crate::generator::{PerturbationConfig, PerturbationGenerator};
use crate::metric::TreeMetric;
use crate::perturbation::{ContentSource, PerturbationClass, PerturbationRecord};
use crate::stats::{count_as_f64, mean, median, nullable_f64, stddev, Aggregate};

/// Exclusion label for metrics returning NaN or infinity.
const NON_FINITE_SCORE: &str = "non_finite_score";

/// The three coefficients of one metric.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QualityCoefficients {
    /// `1 - ratio(paraphrase)`: near 1 when paraphrases barely move the score.
    #[serde(with = "nullable_f64")]
    pub paraphrase_invariance: f64,
    /// `ratio(structural)`.
    #[serde(with = "nullable_f64")]
    pub structural_sensitivity: f64,
    /// `ratio(semantic)`.
    #[serde(with = "nullable_f64")]
    pub semantic_sensitivity: f64,
}

impl QualityCoefficients {
    /// Coefficient names in report order.
    pub const NAMES: [&'static str; 3] = [
        "paraphrase_invariance",
        "structural_sensitivity",
        "semantic_sensitivity",
    ];

    /// Looks a coefficient up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "paraphrase_invariance" => Some(self.paraphrase_invariance),
            "structural_sensitivity" => Some(self.structural_sensitivity),
            "semantic_sensitivity" => Some(self.semantic_sensitivity),
            _ => None,
        }
    }

    /// Name → value mapping.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        Self::NAMES
            .into_iter()
            .filter_map(|name| self.get(name).map(|v| (name, v)))
            .collect()
    }

    /// True if every coefficient is defined.
    #[must_use]
    pub fn all_defined(&self) -> bool {
        !(self.paraphrase_invariance.is_nan()
            || self.structural_sensitivity.is_nan()
            || self.semantic_sensitivity.is_nan())
    }
}

/// Response statistics of one perturbation class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassStatistics {
    /// The class.
    pub class: PerturbationClass,
    /// Scored samples.
    pub samples: usize,
    /// Excluded samples.
    pub excluded: usize,
    /// Mean score over scored samples.
    #[serde(with = "nullable_f64")]
    pub mean: f64,
    /// Median score over scored samples.
    #[serde(with = "nullable_f64")]
    pub median: f64,
    /// Sample standard deviation.
    #[serde(with = "nullable_f64")]
    pub stddev: f64,
    /// Aggregated response per applied magnitude.
    pub by_magnitude: BTreeMap<usize, f64>,
}

/// Outcome of scoring one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleScore {
    /// Position of the reference in the input corpus.
    pub reference_index: usize,
    /// Perturbation class.
    pub class: PerturbationClass,
    /// Applied magnitude.
    pub magnitude: usize,
    /// Metric score, absent when excluded.
    pub score: Option<f64>,
    /// Error kind when excluded.
    pub excluded: Option<String>,
}

/// Everything one evaluation of one metric produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityResult {
    /// Metric name.
    pub metric: String,
    /// Aggregate used for responses and ratios.
    pub aggregate: Aggregate,
    /// The coefficients.
    pub coefficients: QualityCoefficients,
    /// Per-class response statistics, in class order.
    pub classes: Vec<ClassStatistics>,
    /// Magnitudes present in all three classes.
    pub matched_magnitudes: Vec<usize>,
    /// Classes without any scored sample.
    pub degenerate_classes: Vec<PerturbationClass>,
    /// Excluded samples per error kind.
    pub exclusions: BTreeMap<String, usize>,
    /// Excluded / total samples (0 for no samples).
    pub exclusion_rate: f64,
    /// Samples the generator could not produce.
    pub generation_skipped: usize,
    /// Per-sample scores, in record order.
    pub samples: Vec<SampleScore>,
}

impl QualityResult {
    /// Coefficient name → value.
    #[must_use]
    pub fn coefficient_map(&self) -> BTreeMap<&'static str, f64> {
        self.coefficients.to_map()
    }

    /// Statistics of one class.
    #[must_use]
    pub fn class(&self, class: PerturbationClass) -> Option<&ClassStatistics> {
        self.classes.iter().find(|s| s.class == class)
    }

    /// Total excluded samples.
    #[must_use]
    pub fn excluded_total(&self) -> usize {
        self.exclusions.values().sum()
    }

    /// Fails if any class ended up without scored samples.
    ///
    /// # Errors
    ///
    /// Returns `EvalError::DegenerateCorpus` naming those classes.
    pub fn ensure_complete(&self) -> Result<(), EvalError> {
        if self.degenerate_classes.is_empty() {
            Ok(())
        } else {
            Err(EvalError::DegenerateCorpus {
                classes: self.degenerate_classes.clone(),
            })
        }
    }
}

/// Scores perturbation records with a metric and derives coefficients.
///
/// Records are scored in parallel; a failing sample is excluded, counted
/// by error kind and logged, and never aborts the run.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityEvaluator {
    aggregate: Aggregate,
}

impl QualityEvaluator {
    /// Creates an evaluator using `aggregate` for responses and ratios.
    #[must_use]
    pub const fn new(aggregate: Aggregate) -> Self {
        Self { aggregate }
    }

    /// Creates an evaluator with the aggregate of `config`.
    #[must_use]
    pub const fn from_config(config: &PerturbationConfig) -> Self {
        Self::new(config.aggregate)
    }

    /// Evaluates `metric` over `records`.
    #[must_use]
    pub fn evaluate(&self, metric: &dyn TreeMetric, records: &[PerturbationRecord]) -> QualityResult {
        let span = tracing::info_span!("evaluate", metric = metric.name(), records = records.len());
        let _guard = span.enter();

        let outcomes: Vec<Result<f64, DistanceError>> = records
            .par_iter()
            .map(|r| metric.score(&r.reference, &r.perturbed))
            .collect();
        self.summarize(metric, records, outcomes)
    }

    /// Evaluates `metric` over `records`, stopping early once `cancel` is
    /// set.
    ///
    /// The flag is checked before each sample is scored. Samples already
    /// being scored run to completion.
    ///
    /// # Errors
    ///
    /// Returns `EvalError::Cancelled` if any sample was skipped because of
    /// the flag.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::atomic::AtomicBool;
    /// use text_tree::{Outline, TextTree, TreeDistance, UnitCost};
    /// use text_tree_eval::{
    ///     EvalError, LexiconContent, PerturbationConfig, PerturbationGenerator, QualityEvaluator,
    ///     TtedMetric,
    /// };
    ///
    /// let corpus = vec![TextTree::from_outline(&Outline::new(
    ///     "Survey",
    ///     vec![Outline::leaf("Methods"), Outline::leaf("Results")],
    /// )).unwrap()];
    /// let mut generator = PerturbationGenerator::new(1, LexiconContent::academic());
    /// let records = generator.generate_corpus(&corpus, &PerturbationConfig::default()).records;
    ///
    /// let metric = TtedMetric::new("unit_tted", TreeDistance::new(UnitCost));
    /// let cancel = AtomicBool::new(true);
    /// let err = QualityEvaluator::default()
    ///     .evaluate_until(&metric, &records, &cancel)
    ///     .unwrap_err();
    /// assert_eq!(err, EvalError::Cancelled { scored: 0, total: records.len() });
    /// ```
    pub fn evaluate_until(
        &self,
        metric: &dyn TreeMetric,
        records: &[PerturbationRecord],
        cancel: &AtomicBool,
    ) -> Result<QualityResult, EvalError> {
        let span = tracing::info_span!("evaluate", metric = metric.name(), records = records.len());
        let _guard = span.enter();

        let outcomes: Vec<Option<Result<f64, DistanceError>>> = records
            .par_iter()
            .map(|r| {
                if cancel.load(Ordering::Relaxed) {
                    None
                } else {
                    Some(metric.score(&r.reference, &r.perturbed))
                }
            })
            .collect();

        let scored = outcomes.iter().filter(|o| o.is_some()).count();
        if scored < records.len() {
            tracing::warn!(scored, total = records.len(), "evaluation cancelled");
            return Err(EvalError::Cancelled {
                scored,
                total: records.len(),
            });
        }
        Ok(self.summarize(metric, records, outcomes.into_iter().flatten().collect()))
    }

    fn summarize(
        &self,
        metric: &dyn TreeMetric,
        records: &[PerturbationRecord],
        outcomes: Vec<Result<f64, DistanceError>>,
    ) -> QualityResult {
        let mut samples = Vec::with_capacity(records.len());
        let mut exclusions: BTreeMap<String, usize> = BTreeMap::new();
        let mut scored: BTreeMap<PerturbationClass, BTreeMap<usize, Vec<f64>>> = BTreeMap::new();
        let mut excluded: BTreeMap<PerturbationClass, usize> = BTreeMap::new();

        for (record, outcome) in records.iter().zip(outcomes) {
            let kind = match outcome {
                Ok(score) if score.is_finite() => {
                    scored
                        .entry(record.class)
                        .or_default()
                        .entry(record.magnitude)
                        .or_default()
                        .push(score);
                    samples.push(SampleScore {
                        reference_index: record.reference_index,
                        class: record.class,
                        magnitude: record.magnitude,
                        score: Some(score),
                        excluded: None,
                    });
                    continue;
                }
                Ok(score) => {
                    tracing::warn!(
                        class = %record.class,
                        reference_index = record.reference_index,
                        score,
                        "excluding sample with non-finite score"
                    );
                    NON_FINITE_SCORE
                }
                Err(e) => {
                    tracing::warn!(
                        class = %record.class,
                        reference_index = record.reference_index,
                        error = %e,
                        "excluding sample"
                    );
                    e.kind_label()
                }
            };
            *exclusions.entry(kind.to_string()).or_insert(0) += 1;
            *excluded.entry(record.class).or_insert(0) += 1;
            samples.push(SampleScore {
                reference_index: record.reference_index,
                class: record.class,
                magnitude: record.magnitude,
                score: None,
                excluded: Some(kind.to_string()),
            });
        }

        let mut classes = Vec::with_capacity(PerturbationClass::ALL.len());
        let mut responses: BTreeMap<PerturbationClass, BTreeMap<usize, f64>> = BTreeMap::new();
        let mut degenerate_classes = Vec::new();
        for class in PerturbationClass::ALL {
            let by_magnitude = scored.remove(&class).unwrap_or_default();
            let all: Vec<f64> = by_magnitude.values().flatten().copied().collect();
            if all.is_empty() {
                degenerate_classes.push(class);
            }
            let response: BTreeMap<usize, f64> = by_magnitude
                .iter()
                .map(|(&k, scores)| (k, self.aggregate.apply(scores)))
                .collect();
            classes.push(ClassStatistics {
                class,
                samples: all.len(),
                excluded: excluded.get(&class).copied().unwrap_or(0),
                mean: if all.is_empty() { f64::NAN } else { mean(&all) },
                median: if all.is_empty() { f64::NAN } else { median(&all) },
                stddev: if all.is_empty() { f64::NAN } else { stddev(&all) },
                by_magnitude: response.clone(),
            });
            responses.insert(class, response);
        }

        let matched_magnitudes: Vec<usize> = responses
            .get(&PerturbationClass::Paraphrase)
            .map(|r| {
                r.keys()
                    .copied()
                    .filter(|k| responses.values().all(|other| other.contains_key(k)))
                    .collect()
            })
            .unwrap_or_default();

        let ratio = |class| contrast_ratio(class, &responses, &matched_magnitudes, self.aggregate);
        let coefficients = QualityCoefficients {
            paraphrase_invariance: 1.0 - ratio(PerturbationClass::Paraphrase),
            structural_sensitivity: ratio(PerturbationClass::Structural),
            semantic_sensitivity: ratio(PerturbationClass::Semantic),
        };

        let excluded_total: usize = exclusions.values().sum();
        let exclusion_rate = if records.is_empty() {
            0.0
        } else {
            count_as_f64(excluded_total) / count_as_f64(records.len())
        };

        if !degenerate_classes.is_empty() {
            tracing::warn!(?degenerate_classes, "classes without valid samples");
        }
        tracing::info!(
            paraphrase_invariance = coefficients.paraphrase_invariance,
            structural_sensitivity = coefficients.structural_sensitivity,
            semantic_sensitivity = coefficients.semantic_sensitivity,
            excluded = excluded_total,
            "evaluation finished"
        );

        QualityResult {
            metric: metric.name().to_string(),
            aggregate: self.aggregate,
            coefficients,
            classes,
            matched_magnitudes,
            degenerate_classes,
            exclusions,
            exclusion_rate,
            generation_skipped: 0,
            samples,
        }
    }
}

/// `ratio(class)` over matched magnitudes; NaN when nothing matches or any
/// contrast response is zero.
fn contrast_ratio(
    class: PerturbationClass,
    responses: &BTreeMap<PerturbationClass, BTreeMap<usize, f64>>,
    matched: &[usize],
    aggregate: Aggregate,
) -> f64 {
    let response = |c: PerturbationClass, k: usize| {
        responses
            .get(&c)
            .and_then(|r| r.get(&k))
            .copied()
            .unwrap_or(f64::NAN)
    };
    let mut ratios = Vec::with_capacity(matched.len());
    for &k in matched {
        let [first, second] = class.others();
        let contrast = f64::midpoint(response(first, k), response(second, k));
        if contrast == 0.0 || !contrast.is_finite() {
            return f64::NAN;
        }
        ratios.push(response(class, k) / contrast);
    }
    aggregate.apply(&ratios)
}

/// Generates a perturbation corpus from `corpus` with `seed` and evaluates
/// `metric` on it.
///
/// # Errors
///
/// Returns `CorpusError::EmptyCorpus` for an empty corpus. Degenerate
/// classes are reported in the result, not as errors.
///
/// # Examples
///
/// ```
/// use text_tree::{Outline, TextTree, TreeDistance, UnitCost};
/// use text_tree_eval::{evaluate_quality, LexiconContent, PerturbationConfig, TtedMetric};
///
/// let corpus = vec![TextTree::from_outline(&Outline::new(
///     "Survey",
///     vec![
///         Outline::new("Introduction", vec![Outline::leaf("Motivation")]),
///         Outline::new("Methods", vec![Outline::leaf("Dataset")]),
///         Outline::leaf("Results"),
///     ],
/// )).unwrap()];
///
/// let metric = TtedMetric::new("unit_tted", TreeDistance::new(UnitCost));
/// let result = evaluate_quality(
///     &metric,
///     &corpus,
///     &PerturbationConfig::default(),
///     &LexiconContent::academic(),
///     42,
/// ).unwrap();
///
/// assert!(result.degenerate_classes.is_empty());
/// assert!(result.coefficients.all_defined());
/// ```
pub fn evaluate_quality<S: ContentSource + ?Sized>(
    metric: &dyn TreeMetric,
    corpus: &[TextTree],
    config: &PerturbationConfig,
    content: &S,
    seed: u64,
) -> Result<QualityResult, EvalError> {
    let mut results = compare_metrics(&[metric], corpus, config, content, seed)?;
    results.pop().ok_or(EvalError::Corpus(CorpusError::EmptyCorpus))
}

/// Evaluates several metrics over one shared perturbation corpus.
///
/// Every metric sees exactly the same records, so their coefficients are
/// directly comparable.
///
/// # Errors
///
/// Returns `CorpusError::EmptyCorpus` for an empty corpus.
pub fn compare_metrics<S: ContentSource + ?Sized>(
    metrics: &[&dyn TreeMetric],
    corpus: &[TextTree],
    config: &PerturbationConfig,
    content: &S,
    seed: u64,
) -> Result<Vec<QualityResult>, EvalError> {
    if corpus.is_empty() {
        return Err(CorpusError::EmptyCorpus.into());
    }
    let mut generator = PerturbationGenerator::new(seed, content);
    let generated = generator.generate_corpus(corpus, config);
    let evaluator = QualityEvaluator::from_config(config);
    Ok(metrics
        .iter()
        .map(|metric| {
            let mut result = evaluator.evaluate(*metric, &generated.records);
            result.generation_skipped = generated.skipped_total();
            result
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use text_tree::{CostError, Outline};

    /// Scores by class, read off the candidate's root text.
    struct Scripted;

    impl TreeMetric for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn score(&self, _reference: &TextTree, candidate: &TextTree) -> Result<f64, DistanceError> {
            let root = candidate.root().map_or("", |r| candidate.text(r));
            match root {
                "p" => Ok(0.1),
                "s" => Ok(0.6),
                "m" => Ok(0.4),
                "fail" => Err(CostError::EmbeddingUnavailable {
                    text: "fail".into(),
                    reason: "offline".into(),
                }
                .into()),
                _ => Ok(f64::NAN),
            }
        }
    }

    fn record(class: PerturbationClass, root: &str, magnitude: usize) -> PerturbationRecord {
        PerturbationRecord {
            reference: TextTree::leaf("ref").unwrap(),
            perturbed: TextTree::from_outline(&Outline::leaf(root)).unwrap(),
            class,
            magnitude,
            reference_index: 0,
        }
    }

    fn balanced() -> Vec<PerturbationRecord> {
        let mut records = Vec::new();
        for k in 1..=2 {
            records.push(record(PerturbationClass::Paraphrase, "p", k));
            records.push(record(PerturbationClass::Structural, "s", k));
            records.push(record(PerturbationClass::Semantic, "m", k));
        }
        records
    }

    #[test]
    fn coefficients_contrast_classes() {
        let result = QualityEvaluator::default().evaluate(&Scripted, &balanced());
        let c = result.coefficients;
        // 0.1 / mean(0.6, 0.4) = 0.2
        assert!((c.paraphrase_invariance - 0.8).abs() < 1e-12);
        // 0.6 / mean(0.1, 0.4) = 2.4
        assert!((c.structural_sensitivity - 2.4).abs() < 1e-12);
        // 0.4 / mean(0.1, 0.6) = 0.4 / 0.35
        assert!((c.semantic_sensitivity - 0.4 / 0.35).abs() < 1e-12);
        assert_eq!(result.matched_magnitudes, vec![1, 2]);
        assert!(result.ensure_complete().is_ok());
    }

    /// Raises the flag on its first call.
    struct CancelsOnFirstScore<'a>(&'a AtomicBool);

    impl TreeMetric for CancelsOnFirstScore<'_> {
        fn name(&self) -> &str {
            "cancels"
        }

        fn score(&self, reference: &TextTree, candidate: &TextTree) -> Result<f64, DistanceError> {
            self.0.store(true, Ordering::Relaxed);
            Scripted.score(reference, candidate)
        }
    }

    #[test]
    fn unset_flag_matches_plain_evaluation() {
        let never = AtomicBool::new(false);
        let evaluator = QualityEvaluator::default();
        let plain = evaluator.evaluate(&Scripted, &balanced());
        let guarded = evaluator.evaluate_until(&Scripted, &balanced(), &never).unwrap();
        assert_eq!(
            plain.coefficients.structural_sensitivity.to_bits(),
            guarded.coefficients.structural_sensitivity.to_bits()
        );
        assert_eq!(plain.samples.len(), guarded.samples.len());
    }

    #[test]
    fn set_flag_stops_before_scoring() {
        let cancelled = AtomicBool::new(true);
        let err = QualityEvaluator::default()
            .evaluate_until(&Scripted, &balanced(), &cancelled)
            .unwrap_err();
        assert_eq!(err, EvalError::Cancelled { scored: 0, total: 6 });
    }

    #[test]
    fn cancelling_mid_run_skips_the_rest() {
        let flag = AtomicBool::new(false);
        let records: Vec<_> = (0..2000).flat_map(|_| balanced()).collect();
        let err = QualityEvaluator::default()
            .evaluate_until(&CancelsOnFirstScore(&flag), &records, &flag)
            .unwrap_err();
        match err {
            EvalError::Cancelled { scored, total } => {
                assert!(scored >= 1);
                assert!(scored < total);
                assert_eq!(total, records.len());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn failures_are_excluded_and_counted() {
        let mut records = balanced();
        records.push(record(PerturbationClass::Structural, "fail", 1));
        records.push(record(PerturbationClass::Semantic, "nan", 2));
        let result = QualityEvaluator::default().evaluate(&Scripted, &records);

        assert_eq!(result.exclusions.get("embedding_unavailable"), Some(&1));
        assert_eq!(result.exclusions.get(NON_FINITE_SCORE), Some(&1));
        assert!((result.exclusion_rate - 0.25).abs() < 1e-12);
        assert_eq!(result.samples.len(), 8);
        assert!(result.samples[6].score.is_none());
        // Exclusions do not move the aggregates.
        assert!((result.coefficients.structural_sensitivity - 2.4).abs() < 1e-12);
        let structural = result.class(PerturbationClass::Structural).unwrap();
        assert_eq!((structural.samples, structural.excluded), (2, 1));
    }

    #[test]
    fn empty_class_is_degenerate_not_zero() {
        let records: Vec<_> = balanced()
            .into_iter()
            .filter(|r| r.class != PerturbationClass::Semantic)
            .collect();
        let result = QualityEvaluator::default().evaluate(&Scripted, &records);
        assert_eq!(result.degenerate_classes, vec![PerturbationClass::Semantic]);
        assert!(result.coefficients.paraphrase_invariance.is_nan());
        assert!(result.coefficients.structural_sensitivity.is_nan());
        assert!(result.class(PerturbationClass::Semantic).unwrap().mean.is_nan());
        assert!(matches!(
            result.ensure_complete(),
            Err(EvalError::DegenerateCorpus { .. })
        ));
    }

    #[test]
    fn only_matched_magnitudes_count() {
        let mut records = balanced();
        records.push(record(PerturbationClass::Structural, "m", 3));
        let result = QualityEvaluator::default().evaluate(&Scripted, &records);
        assert_eq!(result.matched_magnitudes, vec![1, 2]);
        assert!((result.coefficients.structural_sensitivity - 2.4).abs() < 1e-12);
    }

    #[test]
    fn zero_contrast_is_undefined() {
        struct Zero;
        impl TreeMetric for Zero {
            fn name(&self) -> &str {
                "zero"
            }
            fn score(&self, _: &TextTree, c: &TextTree) -> Result<f64, DistanceError> {
                Ok(if c.text(c.root().unwrap()) == "p" { 0.3 } else { 0.0 })
            }
        }

        let records = vec![
            record(PerturbationClass::Paraphrase, "p", 1),
            record(PerturbationClass::Structural, "zero", 1),
            record(PerturbationClass::Semantic, "zero", 1),
        ];
        let result = QualityEvaluator::default().evaluate(&Zero, &records);
        assert!(result.coefficients.paraphrase_invariance.is_nan());
        // Paraphrase responds, so the other two are defined (zero).
        assert!(result.coefficients.structural_sensitivity.abs() < f64::EPSILON);
    }

    #[test]
    fn coefficient_lookup() {
        let result = QualityEvaluator::default().evaluate(&Scripted, &balanced());
        let map = result.coefficient_map();
        assert_eq!(map.len(), 3);
        assert_eq!(result.coefficients.get("nope"), None);
        assert!((map["structural_sensitivity"] - 2.4).abs() < 1e-12);
    }

    #[test]
    fn empty_corpus_is_rejected() {
        let err = evaluate_quality(
            &Scripted,
            &[],
            &PerturbationConfig::default(),
            &crate::LexiconContent::academic(),
            1,
        )
        .unwrap_err();
        assert_eq!(err, EvalError::Corpus(CorpusError::EmptyCorpus));
    }
}
