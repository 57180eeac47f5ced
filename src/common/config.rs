//! Runtime configuration loaded from the environment.
//!
//! Artefact locations are fixed relative to the project root; only the root,
//! logging and the listen address can be overridden.

use std::env;
use std::path::{Path, PathBuf};

pub const RAW_DATA_FILE: &str = "data/raw/winequality-red.csv";
pub const PROCESSED_DIR: &str = "data/processed";
pub const FINAL_DIR: &str = "data/final";
pub const MODEL_FILE: &str = "models/final_model.json";
pub const OPTIMIZED_MODEL_FILE: &str = "artifacts/models/model.json";
pub const OPTIMIZATION_REPORT_FILE: &str = "artifacts/results/optimization_results.csv";
pub const RESULTS_REPORT_FILE: &str = "artifacts/results/final_results.csv";

pub const TEST_SIZE: f64 = 0.2;
pub const RANDOM_STATE: u64 = 42;
pub const CV_FOLDS: usize = 5;

/// Output format of the log subscriber.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Snapshot of configuration values consumed by the pipeline and the server.
#[derive(Clone, Debug)]
pub struct AppCfg {
    pub root: PathBuf,
    pub log_filter: String,
    pub log_format: LogFormat,
    pub listen_addr: String,
    pub random_state: u64,
    /// Seed for the fixed-configuration trainer; `None` fits unseeded.
    pub train_seed: Option<u64>,
    pub test_size: f64,
    pub cv_folds: usize,
}

impl AppCfg {
    /// Create a configuration snapshot from the process environment.
    pub fn load() -> Self {
        fn env_or(key: &str, default: &str) -> String {
            env::var(key).unwrap_or_else(|_| default.to_string())
        }

        let log_format = match env_or("WINEQ_LOG_FORMAT", "text").as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Self {
            root: PathBuf::from(env_or("WINEQ_ROOT", ".")),
            log_filter: env_or("WINEQ_LOG", "info"),
            log_format,
            listen_addr: env_or("WINEQ_ADDR", "127.0.0.1:8080"),
            train_seed: env::var("WINEQ_TRAIN_SEED")
                .ok()
                .and_then(|v| v.trim().parse().ok()),
            ..Self::with_root(".")
        }
    }

    /// Defaults rooted at `root`; used by tests and embedders.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            log_filter: "info".to_string(),
            log_format: LogFormat::Text,
            listen_addr: "127.0.0.1:8080".to_string(),
            random_state: RANDOM_STATE,
            train_seed: None,
            test_size: TEST_SIZE,
            cv_folds: CV_FOLDS,
        }
    }

    fn path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.root.join(rel)
    }

    pub fn raw_data_path(&self) -> PathBuf {
        self.path(RAW_DATA_FILE)
    }

    pub fn train_split_path(&self) -> PathBuf {
        self.path(PROCESSED_DIR).join("train.csv")
    }

    pub fn test_split_path(&self) -> PathBuf {
        self.path(PROCESSED_DIR).join("test.csv")
    }

    pub fn x_train_path(&self) -> PathBuf {
        self.path(FINAL_DIR).join("X_train.csv")
    }

    pub fn x_test_path(&self) -> PathBuf {
        self.path(FINAL_DIR).join("X_test.csv")
    }

    pub fn y_train_path(&self) -> PathBuf {
        self.path(FINAL_DIR).join("y_train.csv")
    }

    pub fn y_test_path(&self) -> PathBuf {
        self.path(FINAL_DIR).join("y_test.csv")
    }

    pub fn model_path(&self) -> PathBuf {
        self.path(MODEL_FILE)
    }

    pub fn optimized_model_path(&self) -> PathBuf {
        self.path(OPTIMIZED_MODEL_FILE)
    }

    pub fn optimization_report_path(&self) -> PathBuf {
        self.path(OPTIMIZATION_REPORT_FILE)
    }

    pub fn results_report_path(&self) -> PathBuf {
        self.path(RESULTS_REPORT_FILE)
    }
}

impl Default for AppCfg {
    fn default() -> Self {
        Self::with_root(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_hang_off_root() {
        let cfg = AppCfg::with_root("/srv/wine");
        assert_eq!(
            cfg.raw_data_path(),
            PathBuf::from("/srv/wine/data/raw/winequality-red.csv")
        );
        assert_eq!(
            cfg.x_test_path(),
            PathBuf::from("/srv/wine/data/final/X_test.csv")
        );
        assert_eq!(
            cfg.model_path(),
            PathBuf::from("/srv/wine/models/final_model.json")
        );
        assert_eq!(cfg.train_seed, None);
    }
}
