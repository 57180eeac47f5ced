//! Rows of the results report and the upsert rule that maintains it.

use serde::{Deserialize, Serialize};

use super::metrics::ClassificationMetrics;

/// One model's line in `final_results.csv`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvalRow {
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "Accuracy")]
    pub accuracy: f64,
    #[serde(rename = "F1_Score")]
    pub f1_score: f64,
    #[serde(rename = "Precision")]
    pub precision: f64,
    #[serde(rename = "Recall")]
    pub recall: f64,
    /// `[[tn, fp], [fn, tp]]`
    #[serde(rename = "Confusion_Matrix")]
    pub confusion_matrix: String,
    /// Empty cell when no score was available.
    #[serde(rename = "AUC_ROC")]
    pub auc_roc: Option<f64>,
}

impl EvalRow {
    pub fn new(model: impl Into<String>, metrics: &ClassificationMetrics) -> Self {
        Self {
            model: model.into(),
            accuracy: metrics.accuracy,
            f1_score: metrics.f1,
            precision: metrics.precision,
            recall: metrics.recall,
            confusion_matrix: metrics.confusion.to_string(),
            auc_roc: metrics.auc_roc,
        }
    }
}

/// Accumulated evaluation results, at most one row per model name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultsReport {
    rows: Vec<EvalRow>,
}

impl ResultsReport {
    /// Build from stored rows; later duplicates replace earlier ones.
    pub fn from_rows(rows: Vec<EvalRow>) -> Self {
        let mut report = Self::default();
        for row in rows {
            report.upsert(row);
        }
        report
    }

    pub fn rows(&self) -> &[EvalRow] {
        &self.rows
    }

    pub fn get(&self, model: &str) -> Option<&EvalRow> {
        self.rows.iter().find(|r| r.model == model)
    }

    /// Insert or replace the row for `row.model`. Returns `true` on replace.
    ///
    /// The row always ends up last; a previous row of the same name is removed.
    pub fn upsert(&mut self, row: EvalRow) -> bool {
        let before = self.rows.len();
        self.rows.retain(|r| r.model != row.model);
        let replaced = self.rows.len() != before;
        self.rows.push(row);
        replaced
    }

    /// Rows ordered by F1, best first.
    pub fn ranked(&self) -> Vec<&EvalRow> {
        let mut rows: Vec<&EvalRow> = self.rows.iter().collect();
        rows.sort_by(|a, b| b.f1_score.total_cmp(&a.f1_score));
        rows
    }
}
