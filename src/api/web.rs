//! HTTP front end: one form page and one prediction endpoint.
//!
//! Every response is an HTML page with status 200; failures are reported
//! through the error banner.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Form, Router};
use tracing::{error, info, warn};

use crate::common::config::AppCfg;
use crate::common::error::{Error, Result};
use crate::inference::domain::{QualityClass, RawRecord, INPUT_FEATURES};
use crate::inference::service::Predictor;

use super::page::{self, PageView};

/// Shared, read-only state of the web process.
#[derive(Debug)]
pub struct AppState {
    /// `None` when the model could not be loaded; prediction is then disabled.
    pub predictor: Option<Predictor>,
}

impl AppState {
    /// Load the trained model, or start with prediction disabled.
    pub fn load(cfg: &AppCfg) -> Self {
        let path = cfg.model_path();
        match Predictor::load(&path) {
            Ok(predictor) => {
                info!("model predictor ready");
                Self {
                    predictor: Some(predictor),
                }
            }
            Err(err) => {
                error!(
                    path = %path.display(),
                    code = err.code() as u32,
                    error = %err,
                    "model predictor failed to initialize; prediction disabled"
                );
                Self { predictor: None }
            }
        }
    }

    fn model_error(&self) -> bool {
        self.predictor.is_none()
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .with_state(state)
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(page::render(&PageView {
        model_error: state.model_error(),
        ..PageView::default()
    }))
}

/// Parse the form fields in display order; the first bad one is returned.
fn parse_fields(fields: &[(String, String)]) -> Result<RawRecord> {
    let mut record = RawRecord::new();
    for (name, _) in INPUT_FEATURES {
        let raw = fields
            .iter()
            .find(|(n, _)| n == name)
            .map_or("", |(_, v)| v.trim());
        let value = raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| Error::InvalidInput {
                field: name.to_string(),
                reason: format!("'{raw}' is not a finite number"),
            })?;
        record.insert(name.to_string(), value);
    }
    Ok(record)
}

async fn predict(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Html<String> {
    let mut view = PageView {
        values: fields.clone(),
        model_error: state.model_error(),
        ..PageView::default()
    };

    let Some(predictor) = &state.predictor else {
        view.error = Some(page::SERVICE_DOWN.to_string());
        return Html(page::render(&view));
    };

    let record = match parse_fields(&fields) {
        Ok(record) => record,
        Err(Error::InvalidInput { field, reason }) => {
            warn!(field = %field, reason = %reason, "input conversion failed");
            view.error = Some(page::invalid_field_message(&field));
            return Html(page::render(&view));
        }
        Err(err) => {
            error!(code = err.code() as u32, error = %err, "input conversion failed");
            view.error = Some(page::unexpected_error_message(&err));
            return Html(page::render(&view));
        }
    };
    info!(?record, "received prediction request");

    match predictor.predict(&record) {
        Ok(label) => {
            info!(label, "prediction made");
            view.result = Some(QualityClass::from_label(label));
        }
        Err(err) => {
            error!(code = err.code() as u32, error = %err, "prediction failed");
            view.error = Some(page::unexpected_error_message(&err));
        }
    }
    Html(page::render(&view))
}
