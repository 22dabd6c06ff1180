//! Run the quality-coefficient evaluation.
//!
//! Compares the semantic tree edit distance against the unit-cost and ROUGE
//! baselines over one shared perturbation corpus.
//!
//! # Configuration
//!
//! Environment variables (with defaults):
//! - `EVAL_SEED`: Random seed for reproducibility (default: 42)
//! - `EVAL_SAMPLES`: Variants per reference tree and class (default: 6)
//! - `EVAL_MAX_MAGNITUDE`: Largest number of edits per variant (default: 3)
//! - `EVAL_CORPUS_DIR`: Directory of JSON reference trees (default: built-in
//!   sample trees)
//! - `RUST_LOG`: Log filter (default: `info`)
//!
//! # Output
//!
//! - JSON results written to `results/quality_coefficients.json`
//! - Coefficient table printed to stdout
//!
//! # Usage
//!
//! ```bash
//! cargo run --package text-tree-eval --example run_quality
//!
//! # With custom configuration
//! EVAL_SAMPLES=20 EVAL_CORPUS_DIR=references/ cargo run --package text-tree-eval --example run_quality
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use text_tree::{Outline, TextTree, TreeDistance, UnitCost};
use text_tree_embed::{CachedEmbedder, EmbeddingCache, HashingEmbedder, SemanticCostModel};
use text_tree_eval::{
    compare_metrics, load_corpus_directory, AvgTtedMetric, LexiconContent, PairwiseRougeMetric,
    PerturbationConfig, QualityReport, QualityResult, TreeMetric, TtedMetric,
};
use tracing_subscriber::EnvFilter;

/// Directory to write results to.
const RESULTS_DIR: &str = "results";

/// Output file name.
const OUTPUT_FILE: &str = "quality_coefficients.json";

/// Default random seed.
const DEFAULT_SEED: u64 = 42;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    println!("=== Quality Coefficients ===\n");

    let (seed, config) = parse_config();
    println!("Configuration:");
    println!("  Seed:          {seed}");
    println!("  Samples/class: {}", config.samples_per_class);
    println!("  Max magnitude: {}", config.max_magnitude);
    println!();

    let (corpus, source) = match env::var("EVAL_CORPUS_DIR").ok().map(PathBuf::from) {
        Some(dir) => {
            let loaded = load_corpus_directory(&dir)?;
            for warning in &loaded.warnings {
                println!("  Warning: {warning}");
            }
            (loaded.trees, dir.display().to_string())
        }
        None => (sample_corpus()?, "built-in samples".to_string()),
    };
    println!("Loaded {} reference trees from {source}\n", corpus.len());

    // One cache for the whole session, shared by both semantic metrics.
    let lexicon = LexiconContent::academic();
    let aliases = lexicon.word_aliases();
    let embedder = HashingEmbedder::default()
        .with_aliases(aliases.iter().map(|(a, c)| (a.as_str(), c.as_str())));
    let cache = EmbeddingCache::shared();
    let semantic_cost =
        || SemanticCostModel::new(CachedEmbedder::new(embedder.clone(), cache.clone()));

    let semantic = TtedMetric::new("semantic_tted", TreeDistance::new(semantic_cost()));
    let semantic_avg = AvgTtedMetric::new("semantic_avg_tted", TreeDistance::new(semantic_cost()));
    let unit = TtedMetric::new("unit_tted", TreeDistance::new(UnitCost));
    let rouge = PairwiseRougeMetric;
    let metrics: [&dyn TreeMetric; 4] = [&semantic, &semantic_avg, &unit, &rouge];

    let results = compare_metrics(&metrics, &corpus, &config, &lexicon, seed)?;
    print_table(&results);

    let stats = cache.stats();
    println!(
        "\nEmbedding cache: {} entries, {:.1}% hit rate",
        stats.entries,
        stats.hit_rate() * 100.0
    );

    let report = QualityReport::new(seed, config, corpus.len())
        .with_corpus_source(source)
        .with_results(results)
        .compute_summary();

    let results_dir = Path::new(RESULTS_DIR);
    if !results_dir.exists() {
        fs::create_dir_all(results_dir)?;
    }
    let output_path = results_dir.join(OUTPUT_FILE);
    fs::write(&output_path, report.to_json()?)?;
    println!("\nResults written to: {}", output_path.display());

    if !report.summary.incomplete_metrics.is_empty() {
        println!("\n[WARN] Undefined coefficients for:");
        for metric in &report.summary.incomplete_metrics {
            println!("  - {metric}");
        }
    }

    Ok(())
}

/// Parses configuration from environment variables.
fn parse_config() -> (u64, PerturbationConfig) {
    let defaults = PerturbationConfig::default();

    let seed = env::var("EVAL_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);

    let samples = env::var("EVAL_SAMPLES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(defaults.samples_per_class);

    let max_magnitude = env::var("EVAL_MAX_MAGNITUDE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(defaults.max_magnitude);

    (
        seed,
        defaults
            .with_samples_per_class(samples)
            .with_max_magnitude(max_magnitude),
    )
}

/// Reference trees used when no corpus directory is given.
fn sample_corpus() -> Result<Vec<TextTree>, text_tree::MalformedTree> {
    let outlines = [
        Outline::new(
            "Graph neural networks survey",
            vec![
                Outline::new(
                    "Introduction",
                    vec![Outline::leaf("Motivation"), Outline::leaf("Background")],
                ),
                Outline::new(
                    "Methods",
                    vec![Outline::leaf("Message passing"), Outline::leaf("Training")],
                ),
                Outline::new("Results", vec![Outline::leaf("Dataset"), Outline::leaf("Limitations")]),
                Outline::leaf("Conclusion"),
            ],
        ),
        Outline::new(
            "Protein structure prediction",
            vec![
                Outline::new("Background", vec![Outline::leaf("Related work")]),
                Outline::new(
                    "Model",
                    vec![Outline::leaf("Architecture details"), Outline::leaf("Training")],
                ),
                Outline::new("Experiments", vec![Outline::leaf("Results")]),
                Outline::new("Discussion", vec![Outline::leaf("Future work")]),
            ],
        ),
        Outline::new(
            "Retrieval augmented generation",
            vec![
                Outline::leaf("Introduction"),
                Outline::new(
                    "Approach",
                    vec![Outline::leaf("Retriever"), Outline::leaf("Generator")],
                ),
                Outline::new("Evaluation", vec![Outline::leaf("Findings"), Outline::leaf("Analysis")]),
                Outline::leaf("Summary"),
            ],
        ),
    ];
    outlines.iter().map(TextTree::from_outline).collect()
}

/// Prints one row of coefficients per metric.
fn print_table(results: &[QualityResult]) {
    println!(
        "{:<20} {:>12} {:>12} {:>12} {:>10}",
        "metric", "para_inv", "struct_sens", "sem_sens", "excluded"
    );
    for result in results {
        let c = &result.coefficients;
        println!(
            "{:<20} {:>12.4} {:>12.4} {:>12.4} {:>9.1}%",
            result.metric,
            c.paraphrase_invariance,
            c.structural_sensitivity,
            c.semantic_sensitivity,
            result.exclusion_rate * 100.0
        );
    }
}
