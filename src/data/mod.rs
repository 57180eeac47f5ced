//! Data domain: tabular frames, CSV persistence and the train/test split.

pub mod domain;
pub mod repo_fs;
pub mod service;

pub use domain::{Column, Frame};
