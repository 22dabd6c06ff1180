//! Quality-coefficient evaluation for text-tree distance metrics.
//!
//! A good metric for generated outlines should barely move when a tree is
//! paraphrased, yet respond clearly when its structure or meaning changes.
//! This crate measures exactly that:
//!
//! 1. **Perturbation**: a seeded [`PerturbationGenerator`] produces
//!    paraphrase, structural and semantic variants of reference trees at
//!    matched magnitudes, with text supplied by a [`ContentSource`].
//! 2. **Scoring**: [`QualityEvaluator`] scores every (reference, variant)
//!    pair with a [`TreeMetric`] in parallel, excluding and counting
//!    failed samples.
//! 3. **Coefficients**: responses per class are contrasted at matched
//!    magnitudes into `paraphrase_invariance`, `structural_sensitivity` and
//!    `semantic_sensitivity` (see [`quality`]).
//!
//! # Quick Start
//!
//! ```rust
//! use text_tree::{Outline, TextTree, TreeDistance, UnitCost};
//! use text_tree_embed::{HashingEmbedder, SemanticCostModel};
//! use text_tree_eval::{
//!     compare_metrics, LexiconContent, PerturbationConfig, QualityReport, TreeMetric,
//!     TtedMetric,
//! };
//!
//! let corpus = vec![TextTree::from_outline(&Outline::new(
//!     "Survey",
//!     vec![
//!         Outline::new("Introduction", vec![Outline::leaf("Motivation")]),
//!         Outline::new("Methods", vec![Outline::leaf("Dataset"), Outline::leaf("Model")]),
//!         Outline::leaf("Results"),
//!     ],
//! )).unwrap()];
//!
//! // The embedder knows the lexicon's synonyms.
//! let lexicon = LexiconContent::academic();
//! let aliases = lexicon.word_aliases();
//! let embedder = HashingEmbedder::default()
//!     .with_aliases(aliases.iter().map(|(a, c)| (a.as_str(), c.as_str())));
//!
//! let semantic = TtedMetric::new("semantic_tted", TreeDistance::new(SemanticCostModel::from_provider(embedder)));
//! let baseline = TtedMetric::new("unit_tted", TreeDistance::new(UnitCost));
//! let metrics: [&dyn TreeMetric; 2] = [&semantic, &baseline];
//!
//! let config = PerturbationConfig::default();
//! let results = compare_metrics(&metrics, &corpus, &config, &lexicon, 42).unwrap();
//!
//! let report = QualityReport::new(42, config, corpus.len())
//!     .with_results(results)
//!     .compute_summary();
//! assert_eq!(report.summary.most_paraphrase_invariant.as_deref(), Some("semantic_tted"));
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod corpus;
pub mod error;
pub mod generator;
pub mod metric;
pub mod perturbation;
pub mod quality;
pub mod report;
pub mod stats;

// Re-exports
pub use corpus::{load_corpus_directory, load_tree_file, parse_tree_json, LoadedCorpus};
pub use error::{CorpusError, EvalError, PerturbationError};
pub use generator::{PerturbationConfig, PerturbationCorpus, PerturbationGenerator, Perturbed};
pub use metric::{AvgTtedMetric, PairwiseRougeMetric, TreeMetric, TtedMetric};
pub use perturbation::{ContentSource, LexiconContent, PerturbationClass, PerturbationRecord};
pub use quality::{
    compare_metrics, evaluate_quality, ClassStatistics, QualityCoefficients, QualityEvaluator,
    QualityResult, SampleScore,
};
pub use report::{QualityReport, ReportMetadata, ReportSummary};
pub use stats::{mean, median, stddev, Aggregate};
