//! Model fitting, hyperparameter search and model persistence.

pub mod domain;
pub mod forest;
pub mod repo_fs;
pub mod search;
pub mod service;

pub use domain::{Classifier, ForestParams, MaxFeatures, ModelRepo};
pub use forest::RandomForest;
pub use repo_fs::FsModelRepo;
pub use search::ParamGrid;
