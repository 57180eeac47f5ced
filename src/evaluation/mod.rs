//! Held-out evaluation of fitted models and the results report.

pub mod domain;
pub mod metrics;
pub mod repo_fs;
pub mod service;

pub use domain::{EvalRow, ResultsReport};
pub use metrics::{ClassificationMetrics, ConfusionMatrix};
