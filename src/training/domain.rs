//! Domain types for model training and persistence.

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::common::error::Result;

/// How many features each split considers.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`, at least one.
    #[default]
    Sqrt,
    All,
}

impl MaxFeatures {
    pub fn resolve(self, n_features: usize) -> usize {
        match self {
            MaxFeatures::Sqrt => ((n_features as f64).sqrt() as usize).max(1),
            MaxFeatures::All => n_features,
        }
    }
}

/// Random-forest hyperparameters.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    /// `None` grows until leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    /// `None` draws a fresh seed from the OS.
    pub seed: Option<u64>,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: None,
        }
    }
}

impl ForestParams {
    /// Fixed configuration used by the trainer stage. Unlike the search,
    /// the trainer is unseeded unless a seed is configured.
    pub fn trainer(seed: Option<u64>) -> Self {
        Self {
            n_estimators: 250,
            max_depth: Some(15),
            min_samples_split: 5,
            seed,
            ..Self::default()
        }
    }
}

/// Anything that can score engineered feature rows.
pub trait Classifier: Send + Sync {
    /// Column names the model was fit on, in order.
    fn feature_names(&self) -> &[String];

    /// Hard class predictions (0 or 1), one per row.
    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Vec<u8>>;

    /// Positive-class probability per row, when the model provides one.
    fn predict_proba(&self, _x: ArrayView2<'_, f64>) -> Result<Option<Vec<f64>>> {
        Ok(None)
    }
}

/// Persistence contract for fitted models.
pub trait ModelRepo {
    type Model;

    fn put_model(&self, model: &Self::Model) -> Result<()>;
    fn get_model(&self) -> Result<Self::Model>;
}
