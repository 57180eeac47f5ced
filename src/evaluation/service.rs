//! Evaluation stage: score a stored model on the held-out split and upsert
//! the result into the results report.

use std::path::Path;

use ndarray::ArrayView2;
use tracing::{info, warn};

use crate::common::config::AppCfg;
use crate::common::error::{Error, Result};
use crate::training::domain::{Classifier, ModelRepo};
use crate::training::repo_fs::FsModelRepo;
use crate::training::service::LabelledSet;

use super::domain::{EvalRow, ResultsReport};
use super::metrics::{roc_auc, ClassificationMetrics, ConfusionMatrix};
use super::repo_fs::FsEvalRepo;

/// Name under which the trainer's model is reported.
pub const DEFAULT_MODEL_NAME: &str = "RandomForest";

/// Compute the full metric set for `model` on `(x, y)`.
pub fn evaluate_model(
    model: &dyn Classifier,
    x: ArrayView2<'_, f64>,
    y: &[u8],
) -> Result<ClassificationMetrics> {
    let predicted = model.predict(x)?;
    let confusion = ConfusionMatrix::from_labels(y, &predicted)?;

    let auc_roc = match model.predict_proba(x)? {
        None => {
            warn!("model exposes no probabilities; skipping AUC-ROC");
            None
        }
        Some(scores) => {
            let auc = roc_auc(y, &scores);
            if auc.is_none() {
                warn!("only one class present in labels; skipping AUC-ROC");
            }
            auc
        }
    };

    Ok(ClassificationMetrics::from_confusion(confusion, auc_roc))
}

/// The data columns must equal the model's, in order and in number.
///
/// The reported column is the first expected one that is absent or out of
/// place, or the first surplus data column.
pub fn check_columns(expected: &[String], found: &[String]) -> Result<()> {
    let drift = |column: &String| Error::SchemaDrift {
        column: column.clone(),
    };
    if let Some(idx) = (0..expected.len()).find(|&i| found.get(i) != Some(&expected[i])) {
        return Err(drift(&expected[idx]));
    }
    match found.get(expected.len()) {
        Some(extra) => Err(drift(extra)),
        None => Ok(()),
    }
}

/// Evaluate the model at `model_path` (default: the trainer's output) on the
/// test split and record it under `name`.
pub fn evaluate(cfg: &AppCfg, model_path: Option<&Path>, name: &str) -> Result<ResultsReport> {
    let model_path = model_path.map_or_else(|| cfg.model_path(), Path::to_path_buf);
    info!(path = %model_path.display(), "loading model");
    let model = FsModelRepo::new(&model_path).get_model()?;

    info!("loading test data");
    let test = LabelledSet::load(&cfg.x_test_path(), &cfg.y_test_path())?;
    check_columns(model.feature_names(), &test.feature_names)?;

    let metrics = evaluate_model(&model, test.x.view(), &test.y)?;
    info!(
        model = name,
        accuracy = metrics.accuracy,
        f1 = metrics.f1,
        precision = metrics.precision,
        recall = metrics.recall,
        confusion = %metrics.confusion,
        auc_roc = ?metrics.auc_roc,
        "model evaluated"
    );

    let repo = FsEvalRepo::new(cfg.results_report_path());
    let mut report = repo.load()?;
    if report.upsert(EvalRow::new(name, &metrics)) {
        warn!(model = name, "model already exists in results; overwriting");
    }
    repo.save(&report)?;
    info!(path = %repo.path().display(), "results saved");

    for (position, row) in report.ranked().iter().enumerate() {
        info!(
            position = position + 1,
            model = %row.model,
            f1 = row.f1_score,
            accuracy = row.accuracy,
            "results"
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;

    /// Predicts `x[0] > 0`; optionally without probabilities.
    struct SignModel {
        names: Vec<String>,
        with_proba: bool,
    }

    impl Classifier for SignModel {
        fn feature_names(&self) -> &[String] {
            &self.names
        }

        fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Vec<u8>> {
            Ok(x.column(0).iter().map(|&v| u8::from(v > 0.0)).collect())
        }

        fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Option<Vec<f64>>> {
            if !self.with_proba {
                return Ok(None);
            }
            Ok(Some(x.column(0).iter().map(|&v| 1.0 / (1.0 + (-v).exp())).collect()))
        }
    }

    fn model(with_proba: bool) -> SignModel {
        SignModel {
            names: vec!["v".to_string()],
            with_proba,
        }
    }

    #[test]
    fn perfect_separation() {
        let x = Array2::from_shape_vec((4, 1), vec![-2.0, -1.0, 1.0, 2.0]).unwrap();
        let metrics = evaluate_model(&model(true), x.view(), &[0, 0, 1, 1]).unwrap();
        assert_abs_diff_eq!(metrics.accuracy, 1.0);
        assert_abs_diff_eq!(metrics.f1, 1.0);
        assert_eq!(metrics.confusion.to_string(), "[[2, 0], [0, 2]]");
        assert_abs_diff_eq!(metrics.auc_roc.unwrap(), 1.0);
    }

    #[test]
    fn auc_is_skipped_without_probabilities() {
        let x = Array2::from_shape_vec((4, 1), vec![-2.0, 1.0, 1.0, 2.0]).unwrap();
        let metrics = evaluate_model(&model(false), x.view(), &[0, 0, 1, 1]).unwrap();
        assert_eq!(metrics.auc_roc, None);
        assert_abs_diff_eq!(metrics.precision, 2.0 / 3.0);
        assert_abs_diff_eq!(metrics.recall, 1.0);
    }

    #[test]
    fn auc_is_skipped_for_a_single_class() {
        let x = Array2::from_shape_vec((3, 1), vec![1.0, 2.0, -1.0]).unwrap();
        let metrics = evaluate_model(&model(true), x.view(), &[1, 1, 1]).unwrap();
        assert_eq!(metrics.auc_roc, None);
        assert_abs_diff_eq!(metrics.recall, 2.0 / 3.0);
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn column_check_catches_width_and_order() {
        let expected = names(&["a", "b", "c"]);
        assert!(check_columns(&expected, &names(&["a", "b", "c"])).is_ok());

        let short = check_columns(&expected, &names(&["a", "b"])).unwrap_err();
        assert!(matches!(short, Error::SchemaDrift { ref column } if column == "c"));

        let long = check_columns(&expected, &names(&["a", "b", "c", "d"])).unwrap_err();
        assert!(matches!(long, Error::SchemaDrift { ref column } if column == "d"));

        let swapped = check_columns(&expected, &names(&["a", "c", "b"])).unwrap_err();
        assert!(matches!(swapped, Error::SchemaDrift { ref column } if column == "b"));
    }

    #[test]
    fn narrower_test_data_is_schema_drift() {
        use crate::data::domain::{Column, Frame};
        use crate::data::repo_fs::save_frame;
        use crate::features::domain::LABEL_COLUMN;
        use crate::training::domain::ForestParams;
        use crate::training::forest::RandomForest;

        let dir = tempfile::tempdir().unwrap();
        let cfg = AppCfg::with_root(dir.path());
        let x = Array2::from_shape_fn((10, 2), |(r, c)| (r + c) as f64);
        let y: Vec<u8> = (0..10).map(|r| u8::from(r >= 5)).collect();
        let params = ForestParams {
            n_estimators: 2,
            seed: Some(1),
            ..ForestParams::default()
        };
        let forest = RandomForest::fit(x.view(), &y, names(&["a", "b"]), params).unwrap();
        FsModelRepo::new(cfg.model_path()).put_model(&forest).unwrap();

        let x_test = Frame::new(vec![Column::new("a", vec![1.0, 7.0])]).unwrap();
        let y_test = Frame::new(vec![Column::new(LABEL_COLUMN, vec![0.0, 1.0])]).unwrap();
        save_frame(&x_test, &cfg.x_test_path()).unwrap();
        save_frame(&y_test, &cfg.y_test_path()).unwrap();

        let err = evaluate(&cfg, None, DEFAULT_MODEL_NAME).unwrap_err();
        assert!(matches!(err, Error::SchemaDrift { ref column } if column == "b"));
    }

    #[test]
    fn evaluate_without_model_is_model_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppCfg::with_root(dir.path());
        let err = evaluate(&cfg, None, DEFAULT_MODEL_NAME).unwrap_err();
        assert!(matches!(err, Error::ModelMissing { .. }));
    }
}
