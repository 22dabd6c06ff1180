//! JSON report generation for evaluation results.

use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::generator::PerturbationConfig;
use crate::quality::QualityResult;

/// Complete quality report over one or more metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    /// Report metadata.
    pub metadata: ReportMetadata,
    /// Generation and aggregation settings shared by all results.
    pub config: PerturbationConfig,
    /// Number of reference trees.
    pub references: usize,
    /// One result per metric, all over the same perturbation corpus.
    pub results: Vec<QualityResult>,
    /// Summary across results.
    pub summary: ReportSummary,
}

/// Report metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Report generation timestamp.
    pub generated_at: String,
    /// Version of text-tree-eval.
    pub eval_version: String,
    /// Seed of the perturbation generator.
    pub seed: u64,
    /// Where the reference trees came from.
    pub corpus_source: Option<String>,
    /// Git commit hash (if available).
    pub git_commit: Option<String>,
}

impl ReportMetadata {
    /// Metadata stamped with the current time.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            eval_version: env!("CARGO_PKG_VERSION").to_string(),
            seed,
            corpus_source: None,
            git_commit: None,
        }
    }
}

/// Summary across the metrics of a report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Metric with the highest paraphrase invariance, if any is defined.
    pub most_paraphrase_invariant: Option<String>,
    /// Metrics with at least one undefined coefficient.
    pub incomplete_metrics: Vec<String>,
    /// Largest exclusion rate over all metrics.
    pub max_exclusion_rate: f64,
}

impl QualityReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new(seed: u64, config: PerturbationConfig, references: usize) -> Self {
        Self {
            metadata: ReportMetadata::new(seed),
            config,
            references,
            results: Vec::new(),
            summary: ReportSummary::default(),
        }
    }

    /// Adds a metric result.
    #[must_use]
    pub fn with_result(mut self, result: QualityResult) -> Self {
        self.results.push(result);
        self
    }

    /// Adds several metric results.
    #[must_use]
    pub fn with_results(mut self, results: impl IntoIterator<Item = QualityResult>) -> Self {
        self.results.extend(results);
        self
    }

    /// Sets the corpus source description.
    #[must_use]
    pub fn with_corpus_source(mut self, source: impl Into<String>) -> Self {
        self.metadata.corpus_source = Some(source.into());
        self
    }

    /// Sets git commit info.
    #[must_use]
    pub fn with_git_commit(mut self, commit: impl Into<String>) -> Self {
        self.metadata.git_commit = Some(commit.into());
        self
    }

    /// Looks up the result of a metric by name.
    #[must_use]
    pub fn result(&self, metric: &str) -> Option<&QualityResult> {
        self.results.iter().find(|r| r.metric == metric)
    }

    /// Computes summary from results.
    #[must_use]
    pub fn compute_summary(mut self) -> Self {
        let most_paraphrase_invariant = self
            .results
            .iter()
            .filter(|r| !r.coefficients.paraphrase_invariance.is_nan())
            .max_by(|a, b| {
                a.coefficients
                    .paraphrase_invariance
                    .total_cmp(&b.coefficients.paraphrase_invariance)
            })
            .map(|r| r.metric.clone());
        let incomplete_metrics = self
            .results
            .iter()
            .filter(|r| !r.coefficients.all_defined())
            .map(|r| r.metric.clone())
            .collect();
        let max_exclusion_rate = self
            .results
            .iter()
            .map(|r| r.exclusion_rate)
            .fold(0.0, f64::max);

        self.summary = ReportSummary {
            most_paraphrase_invariant,
            incomplete_metrics,
            max_exclusion_rate,
        };
        self
    }

    /// Serializes to JSON.
    ///
    /// # Errors
    ///
    /// Returns `EvalError::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String, EvalError> {
        serde_json::to_string_pretty(self).map_err(|e| EvalError::Json {
            context: "report serialization".to_string(),
            message: e.to_string(),
        })
    }

    /// Serializes to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns `EvalError::Json` if serialization fails.
    pub fn to_json_compact(&self) -> Result<String, EvalError> {
        serde_json::to_string(self).map_err(|e| EvalError::Json {
            context: "report serialization".to_string(),
            message: e.to_string(),
        })
    }

    /// Parses a report written by [`QualityReport::to_json`].
    ///
    /// # Errors
    ///
    /// Returns `EvalError::Json` if the text is not a report.
    pub fn from_json(json: &str) -> Result<Self, EvalError> {
        serde_json::from_str(json).map_err(|e| EvalError::Json {
            context: "report deserialization".to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::QualityCoefficients;
    use crate::stats::Aggregate;
    use std::collections::BTreeMap;

    fn mock_result(metric: &str, invariance: f64) -> QualityResult {
        QualityResult {
            metric: metric.to_string(),
            aggregate: Aggregate::Mean,
            coefficients: QualityCoefficients {
                paraphrase_invariance: invariance,
                structural_sensitivity: 1.2,
                semantic_sensitivity: 1.1,
            },
            classes: Vec::new(),
            matched_magnitudes: vec![1, 2, 3],
            degenerate_classes: Vec::new(),
            exclusions: BTreeMap::new(),
            exclusion_rate: 0.0,
            generation_skipped: 0,
            samples: Vec::new(),
        }
    }

    #[test]
    fn report_creation() {
        let report = QualityReport::new(42, PerturbationConfig::default(), 3);
        assert!(report.results.is_empty());
        assert_eq!(report.metadata.seed, 42);
        assert_eq!(report.metadata.eval_version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn summary_picks_most_invariant_metric() {
        let report = QualityReport::new(1, PerturbationConfig::default(), 1)
            .with_result(mock_result("semantic_tted", 0.9))
            .with_result(mock_result("unit_tted", 0.1))
            .with_result(mock_result("broken", f64::NAN))
            .compute_summary();
        assert_eq!(
            report.summary.most_paraphrase_invariant.as_deref(),
            Some("semantic_tted")
        );
        assert_eq!(report.summary.incomplete_metrics, vec!["broken"]);
    }

    #[test]
    fn json_round_trip_keeps_undefined_coefficients() {
        let report = QualityReport::new(7, PerturbationConfig::default(), 2)
            .with_result(mock_result("broken", f64::NAN))
            .with_corpus_source("synthetic")
            .compute_summary();
        let json = report.to_json().unwrap();
        assert!(json.contains("\"paraphrase_invariance\": null"));

        let back = QualityReport::from_json(&json).unwrap();
        assert!(back.results[0].coefficients.paraphrase_invariance.is_nan());
        assert_eq!(back.metadata.corpus_source.as_deref(), Some("synthetic"));
        assert!(report.result("broken").is_some());
    }

    #[test]
    fn compact_json_is_single_line() {
        let report = QualityReport::new(7, PerturbationConfig::default(), 2)
            .with_results([mock_result("a", 0.5)]);
        assert!(!report.to_json_compact().unwrap().contains('\n'));
    }
}
