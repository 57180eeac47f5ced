//! Feature engineering: derived columns, label binarization and the schema
//! the trained model expects.

pub mod domain;
pub mod service;
pub mod utilities;

pub use domain::{ENGINEERED_FEATURE_COLUMNS, RAW_FEATURE_COLUMNS};
pub use utilities::{binarize_target, engineer, sum_and_drop};
