//! Training and tuning stages.
//!
//! Both stages read the engineered training matrices, fit a forest on the
//! whole training set and persist it through [`FsModelRepo`].

use std::path::Path;

use ndarray::Array2;
use tracing::info;

use crate::common::config::AppCfg;
use crate::common::error::{Error, Result};
use crate::data::repo_fs::{self, DEFAULT_DELIMITER};
use crate::features::domain::LABEL_COLUMN;
use crate::features::utilities::labels_from;

use super::domain::{ForestParams, ModelRepo};
use super::forest::RandomForest;
use super::repo_fs::{save_search_report, FsModelRepo};
use super::search::{grid_search, stratified_k_fold, ParamGrid, SearchOutcome};

/// Feature matrix and labels read back from the final data files.
#[derive(Clone, Debug)]
pub struct LabelledSet {
    pub x: Array2<f64>,
    pub y: Vec<u8>,
    pub feature_names: Vec<String>,
}

impl LabelledSet {
    pub fn load(x_path: &Path, y_path: &Path) -> Result<Self> {
        let x = repo_fs::load_frame(x_path, DEFAULT_DELIMITER)?;
        let y = repo_fs::load_frame(y_path, DEFAULT_DELIMITER)?;
        if x.n_rows() != y.n_rows() {
            return Err(Error::shape(format!(
                "{} feature rows but {} labels",
                x.n_rows(),
                y.n_rows()
            )));
        }
        Ok(Self {
            x: x.to_matrix(),
            y: labels_from(&y, LABEL_COLUMN)?,
            feature_names: x.column_names().into_iter().map(String::from).collect(),
        })
    }
}

/// Fit the fixed-configuration forest and store it at the model path.
pub fn train(cfg: &AppCfg) -> Result<RandomForest> {
    info!("loading training data");
    let data = LabelledSet::load(&cfg.x_train_path(), &cfg.y_train_path())?;
    info!(shape = ?data.x.dim(), "training data loaded");

    let params = ForestParams::trainer(cfg.train_seed);
    info!(?params, "fitting random forest");
    let model = RandomForest::fit(data.x.view(), &data.y, data.feature_names, params)?;

    let repo = FsModelRepo::new(cfg.model_path());
    repo.put_model(&model)?;
    info!(path = %repo.path().display(), "model saved");
    Ok(model)
}

/// Result of the tuning stage.
#[derive(Clone, Debug)]
pub struct Tuned {
    pub model: RandomForest,
    pub search: SearchOutcome,
}

/// Grid search over the default grid.
pub fn optimize(cfg: &AppCfg) -> Result<Tuned> {
    optimize_with(cfg, &ParamGrid::default())
}

/// Cross-validate every candidate of `grid`, refit the best on all training
/// rows, then write the tuned model and the candidate report.
pub fn optimize_with(cfg: &AppCfg, grid: &ParamGrid) -> Result<Tuned> {
    if grid.is_empty() {
        return Err(Error::config("parameter grid is empty"));
    }
    let data = LabelledSet::load(&cfg.x_train_path(), &cfg.y_train_path())?;
    info!(shape = ?data.x.dim(), "training data loaded");

    let base = ForestParams {
        seed: Some(cfg.random_state),
        ..ForestParams::default()
    };
    let candidates = grid.candidates(base);
    let folds = stratified_k_fold(&data.y, cfg.cv_folds)?;
    info!(
        candidates = candidates.len(),
        folds = folds.len(),
        "starting grid search"
    );

    let search = grid_search(data.x.view(), &data.y, &data.feature_names, &candidates, &folds)?;
    let best = search.best();
    info!(
        params = ?best.params,
        mean_cv_f1 = best.mean_f1,
        std_cv_f1 = best.std_f1,
        "best parameters found"
    );

    let model = RandomForest::fit(data.x.view(), &data.y, data.feature_names, best.params)?;
    let repo = FsModelRepo::new(cfg.optimized_model_path());
    repo.put_model(&model)?;
    info!(path = %repo.path().display(), "tuned model saved");

    let report_path = cfg.optimization_report_path();
    save_search_report(&search, &report_path)?;
    info!(path = %report_path.display(), "optimization report saved");

    Ok(Tuned { model, search })
}
