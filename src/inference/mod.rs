//! Single-record prediction shared by the web front end.

pub mod domain;
pub mod service;

pub use domain::{QualityClass, RawRecord, INPUT_FEATURES};
pub use service::Predictor;
