//! Web front end for the prediction service.

pub mod page;
pub mod web;

pub use web::{build_router, AppState};
