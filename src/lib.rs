//! Wine quality classification: offline pipeline stages and the prediction
//! web service built on their artefacts.

pub mod api;
pub mod common;
pub mod data;
pub mod evaluation;
pub mod features;
pub mod inference;
pub mod training;

pub use common::{AppCfg, Error, ErrorCode, Result};
