//! Binary classification metrics.
//!
//! Positive class is `1`. Ratios with an empty denominator are reported as
//! zero rather than NaN.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::error::{Error, Result};

/// Counts of a binary confusion matrix.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tn: usize,
    pub fp: usize,
    pub fn_: usize,
    pub tp: usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl ConfusionMatrix {
    /// Tally paired labels; both slices must have the same length.
    pub fn from_labels(y_true: &[u8], y_pred: &[u8]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(Error::shape(format!(
                "{} true labels but {} predictions",
                y_true.len(),
                y_pred.len()
            )));
        }
        let mut cm = Self::default();
        for (&actual, &predicted) in y_true.iter().zip(y_pred) {
            cm.record(actual == 1, predicted == 1);
        }
        Ok(cm)
    }

    pub fn record(&mut self, actual: bool, predicted: bool) {
        match (actual, predicted) {
            (true, true) => self.tp += 1,
            (false, false) => self.tn += 1,
            (false, true) => self.fp += 1,
            (true, false) => self.fn_ += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    /// Harmonic mean of precision and recall; `2tp / (2tp + fp + fn)`.
    pub fn f1(&self) -> f64 {
        ratio(2 * self.tp, 2 * self.tp + self.fp + self.fn_)
    }
}

/// Row-major `[[tn, fp], [fn, tp]]`.
impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[[{}, {}], [{}, {}]]", self.tn, self.fp, self.fn_, self.tp)
    }
}

/// Everything the evaluator reports for one model.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub confusion: ConfusionMatrix,
    /// Absent when the model has no scores or only one class is present.
    pub auc_roc: Option<f64>,
}

impl ClassificationMetrics {
    pub fn from_confusion(confusion: ConfusionMatrix, auc_roc: Option<f64>) -> Self {
        Self {
            accuracy: confusion.accuracy(),
            precision: confusion.precision(),
            recall: confusion.recall(),
            f1: confusion.f1(),
            confusion,
            auc_roc,
        }
    }
}

/// Area under the ROC curve via the Mann-Whitney rank sum; tied scores
/// share their average rank.
///
/// `None` when `y_true` lacks either class or the lengths differ.
pub fn roc_auc(y_true: &[u8], scores: &[f64]) -> Option<f64> {
    let n = y_true.len();
    if n != scores.len() {
        return None;
    }
    let n_pos = y_true.iter().filter(|&&l| l == 1).count();
    let n_neg = n - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut rank_sum_pos = 0.0;
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && scores[order[j]] == scores[order[i]] {
            j += 1;
        }
        // ranks are 1-based: positions i..j hold ranks i+1..=j
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        let pos_in_run = order[i..j].iter().filter(|&&idx| y_true[idx] == 1).count();
        rank_sum_pos += avg_rank * pos_in_run as f64;
        i = j;
    }

    let (p, q) = (n_pos as f64, n_neg as f64);
    Some((rank_sum_pos - p * (p + 1.0) / 2.0) / (p * q))
}
