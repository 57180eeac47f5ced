//! End-to-end run of the offline stages on a synthetic dataset, followed by
//! the prediction service on the artefacts they leave behind.

use std::fs;
use std::path::Path;

use wineq::common::AppCfg;
use wineq::data::service::prepare_dataset;
use wineq::evaluation::domain::EvalRow;
use wineq::evaluation::repo_fs::FsEvalRepo;
use wineq::evaluation::service::{evaluate, evaluate_model, DEFAULT_MODEL_NAME};
use wineq::features::service::build_features;
use wineq::features::RAW_FEATURE_COLUMNS;
use wineq::inference::domain::sample_record;
use wineq::inference::Predictor;
use wineq::training::service::{optimize_with, train, LabelledSet};
use wineq::training::ParamGrid;
use wineq::Error;

const ROWS: usize = 120;

/// Semicolon separated raw file in which alcohol alone decides quality.
fn write_raw_dataset(path: &Path) {
    let mut text = RAW_FEATURE_COLUMNS
        .iter()
        .map(|c| format!("\"{c}\""))
        .collect::<Vec<_>>()
        .join(";");
    text.push_str(";\"quality\"\n");

    for i in 0..ROWS {
        let alcohol = 8.5 + (i % 9) as f64 * 0.5;
        let quality = if alcohol > 10.5 { 7 } else { 5 };
        let noise = |k: usize| ((i * k) % 17) as f64 * 0.1;
        let row = [
            7.0 + noise(3),
            0.5 + noise(5) / 10.0,
            noise(7) / 5.0,
            1.5 + noise(11),
            0.07 + noise(13) / 100.0,
            10.0 + noise(19) * 10.0,
            30.0 + noise(23) * 10.0,
            0.996 + noise(29) / 1000.0,
            3.2 + noise(31) / 2.0,
            0.5 + noise(37) / 5.0,
            alcohol,
        ];
        let fields: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        text.push_str(&fields.join(";"));
        text.push_str(&format!(";{quality}\n"));
    }

    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

#[test]
fn offline_stages_feed_the_predictor() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = AppCfg::with_root(dir.path());
    write_raw_dataset(&cfg.raw_data_path());

    let split = prepare_dataset(&cfg).unwrap();
    assert_eq!((split.train_rows, split.test_rows), (96, 24));

    let (train_set, test_set) = build_features(&cfg).unwrap();
    assert_eq!(train_set.x.shape(), (96, 9));
    assert_eq!(test_set.y.shape(), (24, 1));

    let model = train(&cfg).unwrap();
    assert_eq!(model.trees().len(), 250);

    evaluate(&cfg, None, DEFAULT_MODEL_NAME).unwrap();
    let report = evaluate(&cfg, None, DEFAULT_MODEL_NAME).unwrap();
    assert_eq!(report.rows().len(), 1);

    let stored = FsEvalRepo::new(cfg.results_report_path()).load().unwrap();
    let row = stored.get(DEFAULT_MODEL_NAME).unwrap();
    assert!(row.accuracy > 0.9, "accuracy {}", row.accuracy);
    assert!(row.auc_roc.is_some());

    let predictor = Predictor::load(&cfg.model_path()).unwrap();
    let mut raw = sample_record();
    raw.insert("alcohol".into(), 9.0);
    assert_eq!(predictor.predict(&raw).unwrap(), 0);
    raw.insert("alcohol".into(), 12.5);
    assert_eq!(predictor.predict(&raw).unwrap(), 1);
    let proba = predictor.predict_proba(&raw).unwrap().unwrap();
    assert!(proba > 0.5);
}

#[test]
fn tuned_model_is_reported_next_to_the_baseline() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = AppCfg::with_root(dir.path());
    write_raw_dataset(&cfg.raw_data_path());
    prepare_dataset(&cfg).unwrap();
    build_features(&cfg).unwrap();
    train(&cfg).unwrap();

    let grid = ParamGrid {
        max_depth: vec![Some(3), Some(10)],
        min_samples_split: vec![2, 5],
        n_estimators: vec![20],
    };
    let tuned = optimize_with(&cfg, &grid).unwrap();
    assert_eq!(tuned.search.candidates.len(), 4);

    evaluate(&cfg, None, DEFAULT_MODEL_NAME).unwrap();
    let optimized = cfg.optimized_model_path();
    let report = evaluate(&cfg, Some(optimized.as_path()), "RandomForestTuned").unwrap();
    assert_eq!(report.rows().len(), 2);
    assert_eq!(report.rows()[1].model, "RandomForestTuned");
}

#[test]
fn re_evaluating_a_name_keeps_the_latest_model() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = AppCfg::with_root(dir.path());
    write_raw_dataset(&cfg.raw_data_path());
    prepare_dataset(&cfg).unwrap();
    build_features(&cfg).unwrap();
    train(&cfg).unwrap();

    let grid = ParamGrid {
        max_depth: vec![Some(1)],
        min_samples_split: vec![2],
        n_estimators: vec![3],
    };
    let tuned = optimize_with(&cfg, &grid).unwrap();

    evaluate(&cfg, None, "Candidate").unwrap();
    let optimized = cfg.optimized_model_path();
    evaluate(&cfg, Some(optimized.as_path()), "Candidate").unwrap();

    let test = LabelledSet::load(&cfg.x_test_path(), &cfg.y_test_path()).unwrap();
    let metrics = evaluate_model(&tuned.model, test.x.view(), &test.y).unwrap();
    let expected = EvalRow::new("Candidate", &metrics);

    let stored = FsEvalRepo::new(cfg.results_report_path()).load().unwrap();
    assert_eq!(stored.rows().len(), 1);
    assert_eq!(stored.rows()[0], expected);
}

#[test]
fn predictor_without_artefact_reports_model_missing() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = AppCfg::with_root(dir.path());
    let err = Predictor::load(&cfg.model_path()).unwrap_err();
    assert!(matches!(err, Error::ModelMissing { .. }));
}
