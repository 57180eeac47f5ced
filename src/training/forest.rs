//! CART decision trees and a bagged random forest over binary labels.
//!
//! Trees split on Gini impurity, sample a random feature subset at each node
//! and store the positive-class fraction at their leaves. The forest averages
//! leaf fractions and predicts class 1 when the average exceeds one half.

use ndarray::{ArrayView1, ArrayView2};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::error::{Error, Result};

use super::domain::{Classifier, ForestParams};

/// Index into a tree's node arena.
pub type NodeId = u32;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// Rows with `x[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: NodeId,
        right: NodeId,
    },
    Leaf {
        proba: f64,
    },
}

/// A fitted tree; node 0 is the root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

struct GrowContext<'a> {
    x: ArrayView2<'a, f64>,
    y: &'a [u8],
    max_depth: Option<usize>,
    min_samples_split: usize,
    max_features: usize,
}

#[derive(Copy, Clone, Debug)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

fn gini(n: usize, n_pos: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p = n_pos as f64 / n as f64;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

/// Size-weighted child impurity of a split at `n_left`.
fn split_impurity(n_left: usize, pos_left: usize, n: usize, pos_total: usize) -> f64 {
    let n_right = n - n_left;
    let pos_right = pos_total - pos_left;
    (n_left as f64 * gini(n_left, pos_left) + n_right as f64 * gini(n_right, pos_right)) / n as f64
}

/// Move rows for which `goes_left` holds to the front; returns their count.
fn partition(samples: &mut [usize], goes_left: impl Fn(usize) -> bool) -> usize {
    let mut mid = 0;
    for k in 0..samples.len() {
        if goes_left(samples[k]) {
            samples.swap(mid, k);
            mid += 1;
        }
    }
    mid
}

fn best_split(
    ctx: &GrowContext<'_>,
    samples: &[usize],
    rng: &mut ChaCha8Rng,
) -> Option<SplitCandidate> {
    let n = samples.len();
    let pos_total = samples.iter().filter(|&&i| ctx.y[i] == 1).count();

    let mut features: Vec<usize> = (0..ctx.x.ncols()).collect();
    features.shuffle(rng);

    let mut best: Option<SplitCandidate> = None;
    let mut pairs: Vec<(f64, u8)> = Vec::with_capacity(n);
    let mut visited = 0;

    for feature in features {
        if visited >= ctx.max_features {
            break;
        }
        pairs.clear();
        pairs.extend(samples.iter().map(|&i| (ctx.x[[i, feature]], ctx.y[i])));
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        // Constant features in this node do not count towards max_features.
        if pairs[0].0 >= pairs[n - 1].0 {
            continue;
        }
        visited += 1;

        let mut pos_left = 0;
        for k in 1..n {
            pos_left += usize::from(pairs[k - 1].1);
            let (lo, hi) = (pairs[k - 1].0, pairs[k].0);
            if hi <= lo {
                continue;
            }
            let impurity = split_impurity(k, pos_left, n, pos_total);
            if best.map_or(true, |b| impurity < b.impurity) {
                let mut threshold = lo + (hi - lo) / 2.0;
                if threshold >= hi || !threshold.is_finite() {
                    threshold = lo;
                }
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    impurity,
                });
            }
        }
    }

    best
}

impl DecisionTree {
    fn fit(ctx: &GrowContext<'_>, mut samples: Vec<usize>, rng: &mut ChaCha8Rng) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(ctx, &mut samples, 0, rng);
        tree
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        (self.nodes.len() - 1) as NodeId
    }

    fn grow(
        &mut self,
        ctx: &GrowContext<'_>,
        samples: &mut [usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> NodeId {
        let n = samples.len();
        let n_pos = samples.iter().filter(|&&i| ctx.y[i] == 1).count();
        let proba = n_pos as f64 / n as f64;

        let depth_reached = ctx.max_depth.is_some_and(|d| depth >= d);
        if depth_reached || n < ctx.min_samples_split || n_pos == 0 || n_pos == n {
            return self.push(Node::Leaf { proba });
        }

        let Some(split) = best_split(ctx, samples, rng) else {
            return self.push(Node::Leaf { proba });
        };

        let mid = partition(samples, |i| ctx.x[[i, split.feature]] <= split.threshold);
        let id = self.push(Node::Leaf { proba });
        let (left_samples, right_samples) = samples.split_at_mut(mid);
        let left = self.grow(ctx, left_samples, depth + 1, rng);
        let right = self.grow(ctx, right_samples, depth + 1, rng);
        self.nodes[id as usize] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        id
    }

    /// Leaf positive-class fraction reached by `row`.
    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut node = 0usize;
        loop {
            match self.nodes[node] {
                Node::Leaf { proba } => return proba,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[feature] <= threshold {
                        left as usize
                    } else {
                        right as usize
                    };
                }
            }
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Longest root-to-leaf path, in edges.
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: usize) -> usize {
            match nodes[id] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => {
                    1 + walk(nodes, left as usize).max(walk(nodes, right as usize))
                }
            }
        }
        walk(&self.nodes, 0)
    }
}

/// Bagged ensemble of [`DecisionTree`]s.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    feature_names: Vec<String>,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit on rows of `x` with 0/1 labels `y`.
    ///
    /// Per-tree seeds are drawn up front, so a seeded fit is reproducible no
    /// matter how rayon schedules the trees.
    pub fn fit<'a>(
        x: ArrayView2<'a, f64>,
        y: &'a [u8],
        feature_names: Vec<String>,
        params: ForestParams,
    ) -> Result<Self> {
        let (n_rows, n_features) = x.dim();
        if n_rows == 0 {
            return Err(Error::shape("cannot fit on an empty matrix"));
        }
        if y.len() != n_rows {
            return Err(Error::shape(format!(
                "{} labels for {} rows",
                y.len(),
                n_rows
            )));
        }
        if feature_names.len() != n_features {
            return Err(Error::shape(format!(
                "{} feature names for {} columns",
                feature_names.len(),
                n_features
            )));
        }
        if let Some(bad) = y.iter().find(|&&l| l > 1) {
            return Err(Error::config(format!("labels must be 0 or 1, found {bad}")));
        }
        if params.n_estimators == 0 {
            return Err(Error::config("n_estimators must be at least 1"));
        }
        if params.min_samples_split < 2 {
            return Err(Error::config("min_samples_split must be at least 2"));
        }

        let ctx = GrowContext {
            x,
            y,
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            max_features: params.max_features.resolve(n_features),
        };

        let seed = params.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let tree_seeds: Vec<u64> = (0..params.n_estimators).map(|_| rng.random()).collect();

        let trees: Vec<DecisionTree> = tree_seeds
            .into_par_iter()
            .map(|tree_seed| {
                let mut rng = ChaCha8Rng::seed_from_u64(tree_seed);
                let samples: Vec<usize> = if params.bootstrap {
                    (0..n_rows).map(|_| rng.random_range(0..n_rows)).collect()
                } else {
                    (0..n_rows).collect()
                };
                DecisionTree::fit(&ctx, samples, &mut rng)
            })
            .collect();

        debug!(
            n_trees = trees.len(),
            max_tree_depth = trees.iter().map(DecisionTree::depth).max().unwrap_or(0),
            "forest fitted"
        );

        Ok(Self {
            params,
            feature_names,
            trees,
        })
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    fn check_width(&self, x: &ArrayView2<'_, f64>) -> Result<()> {
        if x.ncols() != self.feature_names.len() {
            return Err(Error::shape(format!(
                "model expects {} features, got {}",
                self.feature_names.len(),
                x.ncols()
            )));
        }
        Ok(())
    }

    fn proba_rows(&self, x: ArrayView2<'_, f64>) -> Result<Vec<f64>> {
        self.check_width(&x)?;
        let n_trees = self.trees.len() as f64;
        Ok(x.rows()
            .into_iter()
            .map(|row| self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>() / n_trees)
            .collect())
    }
}

impl Classifier for RandomForest {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Vec<u8>> {
        Ok(self
            .proba_rows(x)?
            .into_iter()
            .map(|p| u8::from(p > 0.5))
            .collect())
    }

    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Option<Vec<f64>>> {
        self.proba_rows(x).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::domain::MaxFeatures;
    use ndarray::Array2;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{i}")).collect()
    }

    /// One informative feature (`x0 >= 20`) and one noise feature.
    fn step_data() -> (Array2<f64>, Vec<u8>) {
        let n = 40;
        let x = Array2::from_shape_fn((n, 2), |(r, c)| {
            if c == 0 {
                r as f64
            } else {
                ((r * 7) % 5) as f64
            }
        });
        let y = (0..n).map(|r| u8::from(r >= 20)).collect();
        (x, y)
    }

    #[test]
    fn single_tree_finds_the_midpoint() {
        let (x, y) = step_data();
        let params = ForestParams {
            n_estimators: 1,
            bootstrap: false,
            max_features: MaxFeatures::All,
            seed: Some(3),
            ..ForestParams::default()
        };
        let forest = RandomForest::fit(x.view(), &y, names(2), params).unwrap();
        let tree = &forest.trees()[0];
        assert_eq!(tree.depth(), 1);
        assert!(matches!(
            tree.nodes[0],
            Node::Split { feature: 0, threshold, .. } if threshold == 19.5
        ));
        assert_eq!(forest.predict(x.view()).unwrap(), y);
    }

    #[test]
    fn bagged_forest_learns_step() {
        let (x, y) = step_data();
        let params = ForestParams {
            n_estimators: 50,
            seed: Some(42),
            ..ForestParams::default()
        };
        let forest = RandomForest::fit(x.view(), &y, names(2), params).unwrap();
        let preds = forest.predict(x.view()).unwrap();
        let correct = preds.iter().zip(&y).filter(|(p, l)| p == l).count();
        assert!(correct >= 36, "only {correct}/40 correct");

        let proba = forest.predict_proba(x.view()).unwrap().unwrap();
        assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn seeded_fit_is_reproducible() {
        let (x, y) = step_data();
        let params = ForestParams {
            n_estimators: 8,
            seed: Some(11),
            ..ForestParams::default()
        };
        let a = RandomForest::fit(x.view(), &y, names(2), params).unwrap();
        let b = RandomForest::fit(x.view(), &y, names(2), params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn depth_limit_is_respected() {
        let (x, y) = step_data();
        let noisy: Vec<u8> = y.iter().enumerate().map(|(i, &l)| l ^ u8::from(i % 3 == 0)).collect();
        let params = ForestParams {
            n_estimators: 5,
            max_depth: Some(2),
            seed: Some(5),
            ..ForestParams::default()
        };
        let forest = RandomForest::fit(x.view(), &noisy, names(2), params).unwrap();
        assert!(forest.trees().iter().all(|t| t.depth() <= 2));
    }

    #[test]
    fn rejects_bad_inputs() {
        let (x, y) = step_data();
        let fit = |y: &[u8], names: Vec<String>, params: ForestParams| {
            RandomForest::fit(x.view(), y, names, params)
        };
        assert!(fit(&y[..10], names(2), ForestParams::default()).is_err());
        assert!(fit(&y, names(3), ForestParams::default()).is_err());
        let zero_trees = ForestParams {
            n_estimators: 0,
            ..ForestParams::default()
        };
        assert!(matches!(fit(&y, names(2), zero_trees), Err(Error::Config(_))));
        let mut bad_labels = y.clone();
        bad_labels[0] = 2;
        assert!(fit(&bad_labels, names(2), ForestParams::default()).is_err());
    }

    #[test]
    fn predict_checks_width() {
        let (x, y) = step_data();
        let params = ForestParams {
            n_estimators: 2,
            seed: Some(1),
            ..ForestParams::default()
        };
        let forest = RandomForest::fit(x.view(), &y, names(2), params).unwrap();
        let narrow = Array2::<f64>::zeros((3, 1));
        assert!(matches!(forest.predict(narrow.view()), Err(Error::Shape(_))));
    }
}
