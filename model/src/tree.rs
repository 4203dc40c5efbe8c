use ndarray::{ArrayView1, ArrayView2};
use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use crate::error::{ModelErr, Result};

/// Two feature values closer than this are treated as equal when looking
/// for split points.
const FEATURE_THRESHOLD: f64 = 1e-7;

/// Growth limits of a single regression tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    /// Maximum depth of the tree; `None` grows until the leaves are pure.
    pub max_depth: Option<usize>,
    /// Minimum number of samples a node needs to be considered for a split.
    pub min_samples_split: usize,
    /// Minimum number of samples each child of a split must keep.
    pub min_samples_leaf: usize,
    /// Number of randomly drawn candidate features per split; `None` uses all.
    pub max_features: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A CART regression tree using the squared-error criterion.
///
/// Nodes live in a flat arena, the root being the first one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

struct Split {
    feature: usize,
    threshold: f64,
    proxy: f64,
}

struct Builder<'a, 'dx, 'dy, R: Rng> {
    x: ArrayView2<'dx, f64>,
    y: ArrayView1<'dy, f64>,
    params: &'a TreeParams,
    rng: &'a mut R,
    features: Vec<usize>,
    scratch: Vec<(f64, f64)>,
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Grows a tree over the rows of `x` listed in `samples`.
    ///
    /// `samples` may contain repeated rows (bootstrap draws) and is reordered
    /// in place while the tree is grown.
    ///
    /// # Args
    /// * `x` - Feature matrix, one row per sample.
    /// * `y` - Targets, aligned with the rows of `x`.
    /// * `samples` - Row indices to train on, must be non-empty.
    /// * `params` - Growth limits.
    /// * `rng` - Source of randomness for feature sub-sampling.
    pub fn fit<'dx, 'dy, R: Rng>(
        x: ArrayView2<'dx, f64>,
        y: ArrayView1<'dy, f64>,
        samples: &mut [usize],
        params: &TreeParams,
        rng: &mut R,
    ) -> Self {
        let mut builder = Builder {
            x,
            y,
            params,
            rng,
            features: (0..x.ncols()).collect(),
            scratch: Vec::with_capacity(samples.len()),
            nodes: Vec::new(),
        };

        builder.grow(samples, 0);
        Self {
            nodes: builder.nodes,
        }
    }

    /// Walks the tree for a single row and returns the reached leaf value.
    pub fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[feature] <= threshold { left } else { right };
                }
            }
        }
    }

    /// Checks that `predict_row` terminates on any row of `n_features`
    /// values: splits name an existing feature and point at children stored
    /// after them, leaves hold finite values.
    ///
    /// # Errors
    /// Returns `ModelErr::CorruptTree` on the first violation found.
    pub fn check(&self, n_features: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(ModelErr::CorruptTree("tree has no nodes"));
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            match *node {
                Node::Leaf { value } if !value.is_finite() => {
                    return Err(ModelErr::CorruptTree("leaf value is not finite"));
                }
                Node::Leaf { .. } => {}
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= n_features {
                        return Err(ModelErr::CorruptTree("split on an unknown feature"));
                    }
                    if threshold.is_nan() {
                        return Err(ModelErr::CorruptTree("split threshold is NaN"));
                    }
                    let in_range = |child: usize| child > idx && child < self.nodes.len();
                    if !in_range(left) || !in_range(right) {
                        return Err(ModelErr::CorruptTree("child index out of range"));
                    }
                }
            }
        }

        Ok(())
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Depth of the deepest leaf, a lone root leaf having depth 0.
    pub fn depth(&self) -> usize {
        self.depth_from(0)
    }

    fn depth_from(&self, idx: usize) -> usize {
        match self.nodes[idx] {
            Node::Leaf { .. } => 0,
            Node::Split { left, right, .. } => {
                1 + self.depth_from(left).max(self.depth_from(right))
            }
        }
    }
}

impl<R: Rng> Builder<'_, '_, '_, R> {
    fn grow(&mut self, samples: &mut [usize], depth: usize) -> usize {
        let idx = self.nodes.len();
        let n = samples.len() as f64;
        let sum: f64 = samples.iter().map(|&i| self.y[i]).sum();
        let mean = sum / n;
        let impurity = samples
            .iter()
            .map(|&i| (self.y[i] - mean).powi(2))
            .sum::<f64>()
            / n;

        self.nodes.push(Node::Leaf { value: mean });

        let &TreeParams {
            max_depth,
            min_samples_split,
            min_samples_leaf,
            ..
        } = self.params;

        let is_leaf = samples.len() < min_samples_split
            || samples.len() < 2 * min_samples_leaf
            || max_depth.is_some_and(|d| depth >= d)
            || impurity <= f64::EPSILON;

        if is_leaf {
            return idx;
        }

        let Some(split) = self.best_split(samples, sum) else {
            return idx;
        };

        let mid = partition(samples, |i| self.x[[i, split.feature]] <= split.threshold);
        let (left_samples, right_samples) = samples.split_at_mut(mid);

        let left = self.grow(left_samples, depth + 1);
        let right = self.grow(right_samples, depth + 1);

        self.nodes[idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };

        idx
    }

    /// Searches the candidate features for the split with the largest
    /// reduction in squared error.
    ///
    /// Maximising `sum_l^2 / n_l + sum_r^2 / n_r` is equivalent to minimising
    /// the weighted child impurity, and avoids recomputing it per candidate.
    fn best_split(&mut self, samples: &[usize], sum: f64) -> Option<Split> {
        let n = samples.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let n_features = self.features.len();
        let k = self
            .params
            .max_features
            .map_or(n_features, |k| k.clamp(1, n_features));

        if k < n_features {
            self.features.shuffle(&mut *self.rng);
        }

        let mut best: Option<Split> = None;

        for fi in 0..k {
            let feature = self.features[fi];

            self.scratch.clear();
            self.scratch
                .extend(samples.iter().map(|&i| (self.x[[i, feature]], self.y[i])));
            self.scratch.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_sum = 0.0;
            for i in 0..n - 1 {
                left_sum += self.scratch[i].1;

                let n_left = i + 1;
                let n_right = n - n_left;
                if n_left < min_leaf {
                    continue;
                }
                if n_right < min_leaf {
                    break;
                }

                let (lo, hi) = (self.scratch[i].0, self.scratch[i + 1].0);
                if lo + FEATURE_THRESHOLD >= hi {
                    continue;
                }

                let right_sum = sum - left_sum;
                let proxy =
                    left_sum * left_sum / n_left as f64 + right_sum * right_sum / n_right as f64;

                if best.as_ref().is_none_or(|b| proxy > b.proxy) {
                    let mut threshold = lo / 2.0 + hi / 2.0;
                    if threshold == hi || !threshold.is_finite() {
                        threshold = lo;
                    }

                    best = Some(Split {
                        feature,
                        threshold,
                        proxy,
                    });
                }
            }
        }

        best
    }
}

/// Moves every element matching `pred` to the front, returning how many did.
fn partition<F: Fn(usize) -> bool>(samples: &mut [usize], pred: F) -> usize {
    let mut lo = 0;
    for j in 0..samples.len() {
        if pred(samples[j]) {
            samples.swap(lo, j);
            lo += 1;
        }
    }
    lo
}

#[cfg(test)]
mod tests {
    use ndarray::{Array1, Array2, array};
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn fit_all(x: &Array2<f64>, y: &Array1<f64>, params: &TreeParams) -> RegressionTree {
        let mut samples: Vec<usize> = (0..x.nrows()).collect();
        let mut rng = StdRng::seed_from_u64(0);
        RegressionTree::fit(x.view(), y.view(), &mut samples, params, &mut rng)
    }

    #[test]
    fn step_function_is_learned_exactly() {
        let x = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];
        let y = array![5.0, 5.0, 5.0, 20.0, 20.0, 20.0];
        let tree = fit_all(&x, &y, &TreeParams::default());

        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict_row(array![0.0].view()), 5.0);
        assert_eq!(tree.predict_row(array![6.5].view()), 5.0);
        assert_eq!(tree.predict_row(array![6.6].view()), 20.0);
    }

    #[test]
    fn picks_the_informative_feature() {
        // Column 0 is noise, column 1 decides the target.
        let x = array![[3.0, 0.0], [1.0, 0.0], [2.0, 1.0], [0.0, 1.0]];
        let y = array![1.0, 1.0, 9.0, 9.0];
        let tree = fit_all(&x, &y, &TreeParams::default());

        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.predict_row(array![100.0, 0.0].view()), 1.0);
        assert_eq!(tree.predict_row(array![100.0, 1.0].view()), 9.0);
    }

    #[test]
    fn constant_target_stays_a_single_leaf() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![4.0, 4.0, 4.0];
        let tree = fit_all(&x, &y, &TreeParams::default());

        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict_row(array![2.0].view()), 4.0);
    }

    #[test]
    fn identical_rows_cannot_be_split() {
        let x = array![[1.0], [1.0]];
        let y = array![0.0, 2.0];
        let tree = fit_all(&x, &y, &TreeParams::default());

        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict_row(array![1.0].view()), 1.0);
    }

    #[test]
    fn max_depth_limits_growth() {
        let x = Array2::from_shape_fn((16, 1), |(i, _)| i as f64);
        let y = Array1::from_shape_fn(16, |i| (i * i) as f64);
        let params = TreeParams {
            max_depth: Some(2),
            ..TreeParams::default()
        };
        let tree = fit_all(&x, &y, &params);

        assert_eq!(tree.depth(), 2);
        assert!(tree.leaf_count() <= 4);
    }

    #[test]
    fn min_samples_leaf_is_respected() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![0.0, 10.0, 10.0, 10.0];
        let params = TreeParams {
            min_samples_leaf: 2,
            ..TreeParams::default()
        };
        let tree = fit_all(&x, &y, &params);

        // The pure split 1 | 2,3,4 is forbidden, so 1,2 | 3,4 is taken.
        assert_eq!(tree.predict_row(array![1.0].view()), 5.0);
        assert_eq!(tree.predict_row(array![4.0].view()), 10.0);
    }

    #[test]
    fn fitted_trees_pass_the_structure_check() {
        let x = Array2::from_shape_fn((16, 2), |(i, j)| (i * (j + 1)) as f64);
        let y = Array1::from_shape_fn(16, |i| (i % 5) as f64);
        let tree = fit_all(&x, &y, &TreeParams::default());

        assert!(tree.node_count() > 1);
        assert!(tree.check(2).is_ok());
    }

    #[test]
    fn structure_check_rejects_corrupt_nodes() {
        let split = |feature, left, right| Node::Split {
            feature,
            threshold: 0.5,
            left,
            right,
        };
        let leaf = Node::Leaf { value: 1.0 };
        let cases = [
            vec![],
            vec![split(0, 0, 0)],
            vec![split(0, 1, 5), leaf.clone()],
            vec![split(3, 1, 2), leaf.clone(), leaf.clone()],
            vec![Node::Leaf { value: f64::NAN }],
        ];

        for nodes in cases {
            let tree = RegressionTree { nodes };
            assert!(matches!(tree.check(2), Err(ModelErr::CorruptTree(_))));
        }
    }

    #[test]
    fn partition_moves_matches_to_front() {
        let mut v = vec![5, 1, 4, 2, 3];
        let mid = partition(&mut v, |i| i <= 2);

        assert_eq!(mid, 2);
        assert!(v[..mid].iter().all(|&i| i <= 2));
        assert!(v[mid..].iter().all(|&i| i > 2));
    }
}
