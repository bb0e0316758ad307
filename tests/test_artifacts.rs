//! Integration test: audit artifacts and CLI commands on disk

use kolosal_explain::cli::{cmd_explain, cmd_psi, ExplainArgs};
use kolosal_explain::data::load_csv;
use kolosal_explain::prelude::*;
use ndarray::Array2;
use std::fs;
use std::path::Path;

fn create_bundle() -> ExplanationBundle {
    let x = Array2::from_shape_fn((30, 2), |(i, j)| ((i * (j + 2)) % 7) as f64 * 0.25);
    let model = LinearModel::new(vec![1.5, -0.75], 0.1);
    let y = model.predict(&x).unwrap();
    let names = vec!["utilization".to_string(), "tenure".to_string()];

    let config = ExplainConfig::default()
        .with_task(TaskType::Regression)
        .with_model_name("limit-model");
    ExplainablePipeline::new(model, names, config)
        .unwrap()
        .explain_batch(&x, Some(&y), Some(&x), 4)
        .unwrap()
}

fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn training_csv() -> String {
    let mut csv = String::from("age,balance,default\n");
    for i in 0..40 {
        let age = 20 + (i % 30);
        let balance = (i * 37) % 100;
        let label = if balance > 50 { 1 } else { 0 };
        csv.push_str(&format!("{},{},{}\n", age, balance, label));
    }
    csv
}

#[test]
fn test_bundle_json_round_trip() {
    let bundle = create_bundle();
    let json = bundle.to_json_pretty().unwrap();
    let restored = ExplanationBundle::from_json(&json).unwrap();
    assert_eq!(restored, bundle);

    let value = bundle.to_value().unwrap();
    assert_eq!(value["model"]["type"], "LinearModel");
    assert_eq!(value["model"]["task"], "regression");
    assert_eq!(value["stability"]["bins"], 10);
    assert_eq!(value["local_explanations"]["sample_index"], 4);
}

#[test]
fn test_bundle_preserves_feature_order() {
    let bundle = create_bundle();
    let json = bundle.to_json_pretty().unwrap();
    let restored = ExplanationBundle::from_json(&json).unwrap();

    let before: Vec<&String> = bundle.local_explanations.what_if_contributions.keys().collect();
    let after: Vec<&String> = restored.local_explanations.what_if_contributions.keys().collect();
    assert_eq!(before, after);
}

#[test]
fn test_save_artifacts_creates_directories() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = create_bundle();

    let bundle_path = dir.path().join("runs/001/explainability_bundle.json");
    let card_path = dir.path().join("runs/001/model_card.md");
    bundle.save_json(&bundle_path).unwrap();
    bundle.save_model_card(&card_path).unwrap();

    let restored = ExplanationBundle::from_json(&fs::read_to_string(&bundle_path).unwrap()).unwrap();
    assert_eq!(restored.model.name, "limit-model");

    let card = fs::read_to_string(&card_path).unwrap();
    assert!(card.starts_with("# limit-model - Explainability Model Card"));
    assert!(card.contains("## Top Features (Global)"));
    assert!(card.contains("- utilization"));
}

#[test]
fn test_save_model_card_without_card_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut bundle = create_bundle();
    bundle.model_card_markdown = None;

    let err = bundle.save_model_card(dir.path().join("model_card.md")).unwrap_err();
    assert!(matches!(err, ExplainError::MissingArtifact(_)));
}

#[test]
fn test_explain_command_writes_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_file(dir.path(), "train.csv", &training_csv());
    let model = write_file(
        dir.path(),
        "model.json",
        r#"{"kind": "logistic", "weights": [0.01, 0.2], "intercept": -10.0}"#,
    );
    let templates = write_file(
        dir.path(),
        "templates.json",
        r#"{"balance": {"up": "High balance raises default risk.", "down": "Low balance lowers default risk."}}"#,
    );
    let output = dir.path().join("out");

    cmd_explain(ExplainArgs {
        data: data.clone(),
        model,
        target: Some("default".to_string()),
        score_data: Some(data),
        sample_index: 3,
        config: None,
        templates: Some(templates),
        task: None,
        top_k: Some(2),
        n_repeats: Some(2),
        seed: Some(11),
        name: Some("default-risk".to_string()),
        output: output.clone(),
    })
    .unwrap();

    let bundle = ExplanationBundle::from_json(
        &fs::read_to_string(output.join("explainability_bundle.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(bundle.model.name, "default-risk");
    assert_eq!(bundle.data_summary.n_rows, 40);
    assert_eq!(bundle.data_summary.n_cols, 2);
    assert_eq!(bundle.global_explanations.permutation_importance.len(), 2);
    assert!(bundle.stability.is_some());
    assert!(output.join("model_card.md").exists());
}

#[test]
fn test_explain_command_rejects_feature_count_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_file(dir.path(), "train.csv", &training_csv());
    let model = write_file(dir.path(), "model.json", r#"{"kind": "linear", "weights": [1.0]}"#);

    let result = cmd_explain(ExplainArgs {
        data,
        model,
        target: Some("default".to_string()),
        score_data: None,
        sample_index: 0,
        config: None,
        templates: None,
        task: Some("regression".to_string()),
        top_k: None,
        n_repeats: None,
        seed: None,
        name: None,
        output: dir.path().join("out"),
    });
    assert!(result.is_err());
}

#[test]
fn test_psi_command_writes_scores() {
    let dir = tempfile::tempdir().unwrap();
    let reference = write_file(dir.path(), "reference.csv", &training_csv());
    let comparison = write_file(dir.path(), "comparison.csv", &training_csv());
    let output = dir.path().join("reports/psi.json");

    cmd_psi(&reference, &comparison, 5, Some(output.as_path())).unwrap();

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(report["bins"], 5);
    assert_eq!(report["psi"].as_object().unwrap().len(), 3);
    assert!(report["psi"]["balance"].as_f64().unwrap().abs() < 1e-9);
}

#[test]
fn test_load_csv_splits_target() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "train.csv", &training_csv());

    let dataset = load_csv(&path, Some("default")).unwrap();
    assert_eq!(dataset.feature_names, vec!["age", "balance"]);
    assert_eq!(dataset.x.dim(), (40, 2));
    assert_eq!(dataset.target.unwrap().len(), 40);
}

#[test]
fn test_explain_command_with_missing_cells_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let mut csv = String::from("age,balance,default\n");
    for i in 0..20 {
        let balance = if i % 4 == 0 { String::new() } else { ((i * 13) % 60).to_string() };
        csv.push_str(&format!("{},{},{}\n", 25 + i, balance, i % 2));
    }
    let data = write_file(dir.path(), "train.csv", &csv);
    let model = write_file(
        dir.path(),
        "model.json",
        r#"{"kind": "logistic", "weights": [0.05, 0.1], "intercept": -4.0}"#,
    );
    let output = dir.path().join("out");

    // Row 0 has no balance, so its what-if contributions are NaN
    cmd_explain(ExplainArgs {
        data: data.clone(),
        model,
        target: Some("default".to_string()),
        score_data: Some(data),
        sample_index: 0,
        config: None,
        templates: None,
        task: None,
        top_k: None,
        n_repeats: Some(2),
        seed: Some(3),
        name: None,
        output: output.clone(),
    })
    .unwrap();

    let bundle = ExplanationBundle::from_json(
        &fs::read_to_string(output.join("explainability_bundle.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(bundle.data_summary.missing_by_feature["balance"], 5);
    assert_eq!(bundle.data_summary.missing_by_feature["age"], 0);
    assert!(bundle
        .local_explanations
        .what_if_contributions
        .values()
        .all(|v| v.is_nan()));
    assert_eq!(bundle.reason_codes.len(), 2);
}
