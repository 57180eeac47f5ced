//! Shared utilities that glue the pipeline stages together.
pub mod config;
pub mod error;
pub mod log;

pub use config::AppCfg;
pub use error::{Error, ErrorCode, Result};
