//! Dataset preparation: load the raw file, split it, persist both partitions.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::common::config::AppCfg;
use crate::common::error::{Error, Result};

use super::domain::Frame;
use super::repo_fs::{self, RAW_DELIMITER};

/// Row counts of a finished split.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SplitSummary {
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Shuffle-split row indices: `(train, test)`.
///
/// `ceil(test_size * n)` rows go to test. Both sides must be non-empty.
pub fn split_indices(n_rows: usize, test_size: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(Error::config(format!(
            "test_size must be in (0, 1), got {test_size}"
        )));
    }
    let n_test = (test_size * n_rows as f64).ceil() as usize;
    if n_test == 0 || n_test >= n_rows {
        return Err(Error::config(format!(
            "cannot split {n_rows} rows with test_size {test_size}"
        )));
    }

    let mut permutation: Vec<usize> = (0..n_rows).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    permutation.shuffle(&mut rng);

    let train = permutation.split_off(n_test);
    Ok((train, permutation))
}

/// Split a frame into `(train, test)` partitions.
pub fn train_test_split(frame: &Frame, test_size: f64, seed: u64) -> Result<(Frame, Frame)> {
    let (train_idx, test_idx) = split_indices(frame.n_rows(), test_size, seed)?;
    Ok((frame.take_rows(&train_idx)?, frame.take_rows(&test_idx)?))
}

/// Run the preparation stage end to end.
pub fn prepare_dataset(cfg: &AppCfg) -> Result<SplitSummary> {
    let raw_path = cfg.raw_data_path();
    info!(path = %raw_path.display(), "loading raw data");
    let frame = repo_fs::load_frame(&raw_path, RAW_DELIMITER)?;
    info!(rows = frame.n_rows(), cols = frame.n_cols(), "raw data loaded");

    info!(test_size = cfg.test_size, seed = cfg.random_state, "splitting data");
    let (train, test) = train_test_split(&frame, cfg.test_size, cfg.random_state)?;

    let train_path = cfg.train_split_path();
    let test_path = cfg.test_split_path();
    repo_fs::save_frame(&train, &train_path)?;
    info!(path = %train_path.display(), rows = train.n_rows(), "saved train split");
    repo_fs::save_frame(&test, &test_path)?;
    info!(path = %test_path.display(), rows = test.n_rows(), "saved test split");

    info!("dataset preparation complete");
    Ok(SplitSummary {
        train_rows: train.n_rows(),
        test_rows: test.n_rows(),
    })
}
