//! Exhaustive hyperparameter search with stratified k-fold cross-validation.
//!
//! Candidates are scored in parallel; results are gathered back in grid
//! order, so selection never depends on which candidate finished first.

use ndarray::{ArrayView2, Axis};
use rayon::prelude::*;
use tracing::debug;

use crate::common::error::{Error, Result};
use crate::evaluation::metrics::ConfusionMatrix;

use super::domain::{Classifier, ForestParams};
use super::forest::RandomForest;

/// Values tried for each searched hyperparameter.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamGrid {
    pub max_depth: Vec<Option<usize>>,
    pub min_samples_split: Vec<usize>,
    pub n_estimators: Vec<usize>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            max_depth: vec![Some(5), Some(10), Some(15), Some(20)],
            min_samples_split: vec![2, 3, 5, 8],
            n_estimators: vec![50, 100, 200, 250, 300],
        }
    }
}

impl ParamGrid {
    /// Cartesian product over `base`: `max_depth` varies slowest,
    /// `n_estimators` fastest.
    pub fn candidates(&self, base: ForestParams) -> Vec<ForestParams> {
        let mut out = Vec::with_capacity(self.len());
        for &max_depth in &self.max_depth {
            for &min_samples_split in &self.min_samples_split {
                for &n_estimators in &self.n_estimators {
                    out.push(ForestParams {
                        max_depth,
                        min_samples_split,
                        n_estimators,
                        ..base
                    });
                }
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.max_depth.len() * self.min_samples_split.len() * self.n_estimators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Row indices of one cross-validation split.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Unshuffled stratified folds over binary labels.
///
/// Per-fold class counts are balanced by dealing the class-sorted label
/// vector round-robin; each class's rows then fill their folds in order.
pub fn stratified_k_fold(y: &[u8], k: usize) -> Result<Vec<Fold>> {
    let n = y.len();
    if k < 2 {
        return Err(Error::config(format!("need at least 2 folds, got {k}")));
    }
    if k > n {
        return Err(Error::config(format!("cannot make {k} folds from {n} rows")));
    }

    let n_neg = y.iter().filter(|&&l| l == 0).count();
    let mut allocation = vec![[0usize; 2]; k];
    for pos in 0..n {
        let class = usize::from(pos >= n_neg);
        allocation[pos % k][class] += 1;
    }

    let mut test_fold = vec![0usize; n];
    for class in 0..2u8 {
        let mut fold_ids =
            (0..k).flat_map(|f| std::iter::repeat(f).take(allocation[f][usize::from(class)]));
        for (row, _) in y.iter().enumerate().filter(|(_, l)| **l == class) {
            // allocation sums to the class count, so this never runs dry
            test_fold[row] = fold_ids.next().unwrap_or(k - 1);
        }
    }

    Ok((0..k)
        .map(|f| {
            let (test, train): (Vec<usize>, Vec<usize>) =
                (0..n).partition(|&row| test_fold[row] == f);
            Fold { train, test }
        })
        .collect())
}

/// Cross-validated F1 of one candidate.
#[derive(Clone, Debug)]
pub struct CandidateScore {
    pub params: ForestParams,
    pub fold_scores: Vec<f64>,
    pub mean_f1: f64,
    pub std_f1: f64,
}

#[derive(Clone, Debug)]
pub struct SearchOutcome {
    /// In grid order.
    pub candidates: Vec<CandidateScore>,
    pub best: usize,
}

impl SearchOutcome {
    pub fn best(&self) -> &CandidateScore {
        &self.candidates[self.best]
    }

    /// 1-based rank by mean F1; ties share the lowest rank.
    pub fn ranks(&self) -> Vec<usize> {
        self.candidates
            .iter()
            .map(|c| 1 + self.candidates.iter().filter(|o| o.mean_f1 > c.mean_f1).count())
            .collect()
    }
}

/// Index of the highest mean F1; the first one wins ties.
pub fn select_best(scores: &[CandidateScore]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, score) in scores.iter().enumerate() {
        if best.map_or(true, |b| score.mean_f1 > scores[b].mean_f1) {
            best = Some(idx);
        }
    }
    best
}

fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

fn score_candidate(
    x: ArrayView2<'_, f64>,
    y: &[u8],
    feature_names: &[String],
    params: ForestParams,
    folds: &[Fold],
) -> Result<CandidateScore> {
    let fold_scores = folds
        .iter()
        .map(|fold| {
            let x_train = x.select(Axis(0), &fold.train);
            let y_train: Vec<u8> = fold.train.iter().map(|&i| y[i]).collect();
            let x_test = x.select(Axis(0), &fold.test);
            let y_test: Vec<u8> = fold.test.iter().map(|&i| y[i]).collect();

            let model =
                RandomForest::fit(x_train.view(), &y_train, feature_names.to_vec(), params)?;
            let predicted = model.predict(x_test.view())?;
            Ok(ConfusionMatrix::from_labels(&y_test, &predicted)?.f1())
        })
        .collect::<Result<Vec<f64>>>()?;

    let (mean_f1, std_f1) = mean_std(&fold_scores);
    debug!(?params, mean_f1, "candidate scored");
    Ok(CandidateScore {
        params,
        fold_scores,
        mean_f1,
        std_f1,
    })
}

/// Score every candidate on every fold and pick the best.
pub fn grid_search(
    x: ArrayView2<'_, f64>,
    y: &[u8],
    feature_names: &[String],
    candidates: &[ForestParams],
    folds: &[Fold],
) -> Result<SearchOutcome> {
    if folds.is_empty() {
        return Err(Error::config("grid search needs at least one fold"));
    }
    let candidates = candidates
        .par_iter()
        .map(|&params| score_candidate(x, y, feature_names, params, folds))
        .collect::<Result<Vec<_>>>()?;

    let best = select_best(&candidates).ok_or_else(|| Error::config("empty parameter grid"))?;
    Ok(SearchOutcome { candidates, best })
}
