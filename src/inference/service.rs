//! Online prediction over one raw record at a time.
//!
//! A [`Predictor`] is built once from the stored artefact and never mutated,
//! so it can be shared across request handlers without locking.

use std::path::Path;

use tracing::{debug, info};

use crate::common::error::{Error, Result};
use crate::data::domain::{Column, Frame};
use crate::features::domain::{
    ACIDITY_COLUMNS, ENGINEERED_FEATURE_COLUMNS, RAW_FEATURE_COLUMNS, SULFUR_COLUMNS,
    SULPHUR_BOUND, TOTAL_ACIDITY,
};
use crate::features::utilities::sum_and_drop;
use crate::training::domain::{Classifier, ModelRepo};
use crate::training::repo_fs::FsModelRepo;

use super::domain::RawRecord;

/// Loaded model plus the record-to-matrix transform used in training.
pub struct Predictor {
    model: Box<dyn Classifier>,
}

impl std::fmt::Debug for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor")
            .field("features", &self.model.feature_names())
            .finish()
    }
}

impl Predictor {
    /// Load the forest stored at `path`.
    ///
    /// Fails with `ModelMissing` if there is no artefact and with
    /// `SchemaDrift` if it was fit on a different column list.
    pub fn load(path: &Path) -> Result<Self> {
        let model = FsModelRepo::new(path).get_model()?;
        let predictor = Self::from_model(Box::new(model))?;
        info!(path = %path.display(), "model loaded");
        Ok(predictor)
    }

    /// Wrap an in-memory model after checking its input schema.
    pub fn from_model(model: Box<dyn Classifier>) -> Result<Self> {
        let names = model.feature_names();
        for (idx, expected) in ENGINEERED_FEATURE_COLUMNS.iter().enumerate() {
            if names.get(idx).map(String::as_str) != Some(*expected) {
                return Err(Error::SchemaDrift {
                    column: expected.to_string(),
                });
            }
        }
        if let Some(extra) = names.get(ENGINEERED_FEATURE_COLUMNS.len()) {
            return Err(Error::SchemaDrift {
                column: extra.clone(),
            });
        }
        Ok(Self { model })
    }

    /// Class label (0 or 1) for one raw record.
    pub fn predict(&self, raw: &RawRecord) -> Result<u8> {
        let frame = self.engineer_record(raw)?;
        let label = self
            .model
            .predict(frame.to_matrix().view())?
            .first()
            .copied()
            .ok_or_else(|| Error::shape("model returned no prediction"))?;
        debug!(label, "prediction made");
        Ok(label)
    }

    /// Positive-class probability for one raw record.
    pub fn predict_proba(&self, raw: &RawRecord) -> Result<Option<f64>> {
        let frame = self.engineer_record(raw)?;
        Ok(self
            .model
            .predict_proba(frame.to_matrix().view())?
            .and_then(|p| p.first().copied()))
    }

    /// One-row frame in model input order.
    ///
    /// Unknown keys are ignored. A missing raw field is a missing-column
    /// error; a derived column that cannot be selected is schema drift.
    fn engineer_record(&self, raw: &RawRecord) -> Result<Frame> {
        let mut columns = Vec::with_capacity(raw.len());
        for name in RAW_FEATURE_COLUMNS {
            let value = raw.get(name).ok_or_else(|| Error::missing_column(name))?;
            columns.push(Column::new(name, vec![*value]));
        }

        let frame = Frame::new(columns)?;
        let frame = sum_and_drop(frame, &ACIDITY_COLUMNS, TOTAL_ACIDITY)?;
        let frame = sum_and_drop(frame, &SULFUR_COLUMNS, SULPHUR_BOUND)?;
        frame
            .select(&ENGINEERED_FEATURE_COLUMNS)
            .map_err(|err| match err {
                Error::MissingColumn { column } => Error::SchemaDrift { column },
                other => other,
            })
    }
}
