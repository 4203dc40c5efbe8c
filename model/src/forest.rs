use log::{debug, info};
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ModelErr, Result},
    tree::{RegressionTree, TreeParams},
};

/// Hyper-parameters of a random forest.
#[derive(Debug, Clone, PartialEq)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub tree: TreeParams,
    /// Fit each tree on a bootstrap draw of the rows instead of all of them.
    pub bootstrap: bool,
    pub seed: u64,
    /// Size of the training thread pool, `0` meaning one thread per core.
    pub n_jobs: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            tree: TreeParams::default(),
            bootstrap: true,
            seed: 42,
            n_jobs: 0,
        }
    }
}

/// An averaging ensemble of regression trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl RandomForestRegressor {
    /// Fits `params.n_estimators` trees on `x` and `y`.
    ///
    /// Per-tree seeds are drawn up front from a generator seeded with
    /// `params.seed`, so the fitted forest does not depend on `n_jobs`.
    ///
    /// # Errors
    /// Returns `ModelErr` if the inputs are empty or misaligned, or the
    /// thread pool cannot be created.
    pub fn fit(x: ArrayView2<f64>, y: ArrayView1<f64>, params: &ForestParams) -> Result<Self> {
        let (n_samples, n_features) = x.dim();

        if n_samples != y.len() {
            return Err(ModelErr::ShapeMismatch {
                what: "targets",
                got: y.len(),
                expected: n_samples,
            });
        }
        if n_samples == 0 || n_features == 0 {
            return Err(ModelErr::InvalidInput("cannot fit on an empty matrix"));
        }
        if params.n_estimators == 0 {
            return Err(ModelErr::InvalidInput("n_estimators must be > 0"));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(ModelErr::InvalidInput("training data contains non-finite values"));
        }

        let mut seeder = StdRng::seed_from_u64(params.seed);
        let seeds: Vec<u64> = (0..params.n_estimators).map(|_| seeder.random()).collect();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(params.n_jobs)
            .build()?;

        info!(
            "fitting {} trees on {n_samples} samples using {} threads",
            params.n_estimators,
            pool.current_num_threads()
        );

        let trees = pool.install(|| {
            seeds
                .par_iter()
                .enumerate()
                .map(|(i, &seed)| {
                    let mut rng = StdRng::seed_from_u64(seed);
                    let mut samples: Vec<usize> = if params.bootstrap {
                        (0..n_samples)
                            .map(|_| rng.random_range(0..n_samples))
                            .collect()
                    } else {
                        (0..n_samples).collect()
                    };

                    let tree = RegressionTree::fit(x, y, &mut samples, &params.tree, &mut rng);
                    debug!(
                        "tree {i} done: nodes={} depth={}",
                        tree.node_count(),
                        tree.depth()
                    );
                    tree
                })
                .collect()
        });

        Ok(Self { n_features, trees })
    }

    /// Predicts a single sample.
    ///
    /// # Errors
    /// Returns `ModelErr::ShapeMismatch` if `row` doesn't have one value per
    /// trained feature, `ModelErr::InvalidInput` if any value isn't finite.
    pub fn predict_one(&self, row: &[f64]) -> Result<f64> {
        self.check_width(row.len())?;
        if self.trees.is_empty() {
            return Err(ModelErr::NotFitted);
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(ModelErr::InvalidInput("input contains non-finite values"));
        }

        Ok(self.mean(ArrayView1::from(row)))
    }

    /// Predicts every row of `x`, rows being evaluated in parallel.
    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        self.check_width(x.ncols())?;
        if self.trees.is_empty() {
            return Err(ModelErr::NotFitted);
        }

        let preds: Vec<f64> = x
            .axis_iter(Axis(0))
            .into_par_iter()
            .map(|row| self.mean(row))
            .collect();

        Ok(Array1::from(preds))
    }

    /// Checks the structure of every tree against the forest's width.
    pub fn check(&self) -> Result<()> {
        self.trees.iter().try_for_each(|t| t.check(self.n_features))
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn check_width(&self, got: usize) -> Result<()> {
        if got != self.n_features {
            return Err(ModelErr::ShapeMismatch {
                what: "features",
                got,
                expected: self.n_features,
            });
        }
        Ok(())
    }

    fn mean(&self, row: ArrayView1<f64>) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
        total / self.trees.len() as f64
    }
}
