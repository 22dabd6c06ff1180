//! Directory of JSON trees in, JSON report out.

use std::fs;

use tempfile::tempdir;
use text_tree::{TreeDistance, UnitCost};
use text_tree_eval::{
    evaluate_quality, load_corpus_directory, LexiconContent, PerturbationConfig, QualityReport,
    TtedMetric,
};

#[test]
fn loads_directory_and_writes_report() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("a_nested.json"),
        r#"{"Survey": {"Introduction": {"Motivation": {}}, "Methods": ["Dataset", "Model"], "Results": null}}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("b_outline.json"),
        r#"{"text": "Report", "children": [{"text": "Background"}, {"text": "Findings", "children": [{"text": "Limitations"}]}]}"#,
    )
    .unwrap();
    fs::write(dir.path().join("c_broken.json"), "{ not json").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let loaded = load_corpus_directory(dir.path()).unwrap();
    assert_eq!(loaded.files_loaded, 2);
    assert_eq!(loaded.names, vec!["a_nested", "b_outline"]);
    assert_eq!(loaded.warnings.len(), 1);
    assert!(loaded.warnings[0].contains("c_broken"));

    let lexicon = LexiconContent::academic();
    let metric = TtedMetric::new("unit_tted", TreeDistance::new(UnitCost));
    let config = PerturbationConfig::default().with_samples_per_class(3);
    let result = evaluate_quality(&metric, &loaded.trees, &config, &lexicon, 11).unwrap();
    assert!(result.ensure_complete().is_ok());

    let report = QualityReport::new(11, config, loaded.trees.len())
        .with_corpus_source(dir.path().display().to_string())
        .with_result(result)
        .compute_summary();
    let path = dir.path().join("report.json");
    fs::write(&path, report.to_json().unwrap()).unwrap();

    let back = QualityReport::from_json(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(back.references, 2);
    assert_eq!(back.metadata.seed, 11);
    assert_eq!(
        back.summary.most_paraphrase_invariant.as_deref(),
        Some("unit_tted")
    );
    let original = report.result("unit_tted").unwrap();
    let restored = back.result("unit_tted").unwrap();
    assert_eq!(original.samples.len(), restored.samples.len());
    assert!(
        (original.coefficients.structural_sensitivity
            - restored.coefficients.structural_sensitivity)
            .abs()
            < 1e-12
    );
}
