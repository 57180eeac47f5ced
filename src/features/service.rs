//! Feature engineering stage: split files in, model-ready matrices out.

use tracing::info;

use crate::common::config::AppCfg;
use crate::common::error::Result;
use crate::data::domain::Frame;
use crate::data::repo_fs::{self, DEFAULT_DELIMITER};

use super::domain::TARGET_COLUMN;
use super::utilities::{binarize_target, engineer};

/// Final matrices for one partition.
#[derive(Clone, Debug)]
pub struct Prepared {
    pub x: Frame,
    pub y: Frame,
}

/// Separate the target, engineer features and binarize the label.
///
/// Transforms are stateless, so each partition is processed on its own.
pub fn prepare_partition(mut frame: Frame) -> Result<Prepared> {
    let target = frame.split_off(TARGET_COLUMN)?;
    let x = engineer(frame)?;
    let y = binarize_target(Frame::new(vec![target])?, TARGET_COLUMN)?;
    Ok(Prepared { x, y })
}

/// Run the feature stage end to end.
pub fn build_features(cfg: &AppCfg) -> Result<(Prepared, Prepared)> {
    info!("loading train and test data");
    let train = repo_fs::load_frame(&cfg.train_split_path(), DEFAULT_DELIMITER)?;
    let test = repo_fs::load_frame(&cfg.test_split_path(), DEFAULT_DELIMITER)?;
    info!(rows = train.n_rows(), cols = train.n_cols(), "train data loaded");
    info!(rows = test.n_rows(), cols = test.n_cols(), "test data loaded");

    let train = prepare_partition(train)?;
    let test = prepare_partition(test)?;
    info!(shape = ?train.x.shape(), "X_train prepared");
    info!(shape = ?test.x.shape(), "X_test prepared");
    info!("target remodelled from multiclass to binary");

    for (frame, path) in [
        (&train.x, cfg.x_train_path()),
        (&test.x, cfg.x_test_path()),
        (&train.y, cfg.y_train_path()),
        (&test.y, cfg.y_test_path()),
    ] {
        repo_fs::save_frame(frame, &path)?;
        info!(path = %path.display(), "saved final data");
    }

    info!("feature engineering completed");
    Ok((train, test))
}
