use std::{
    env,
    path::{Path, PathBuf},
};

use model::ForestParams;

use crate::error::{Result, TrainErr};

pub const DEFAULT_DATASET_PATH: &str = "data/california_housing.csv";
pub const DEFAULT_MODEL_PATH: &str = "model/house_price_model.bin";
pub const DEFAULT_TEST_SIZE: f64 = 0.2;
pub const DEFAULT_SEED: u64 = 42;

/// Inputs and hyper-parameters of one training run.
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    dataset_path: PathBuf,
    model_path: PathBuf,
    test_size: f64,
    split_seed: u64,
    forest: ForestParams,
}

impl TrainerConfig {
    /// Creates a configuration with the default split and forest settings.
    ///
    /// # Args
    /// * `dataset_path` - CSV file holding the housing dataset.
    /// * `model_path` - Where the fitted artifact is written.
    pub fn new<D: Into<PathBuf>, M: Into<PathBuf>>(dataset_path: D, model_path: M) -> Self {
        Self {
            dataset_path: dataset_path.into(),
            model_path: model_path.into(),
            test_size: DEFAULT_TEST_SIZE,
            split_seed: DEFAULT_SEED,
            forest: ForestParams {
                seed: DEFAULT_SEED,
                ..ForestParams::default()
            },
        }
    }

    /// Reads `DATASET_PATH`, `MODEL_PATH` and `N_JOBS`, falling back to the
    /// defaults for unset variables.
    ///
    /// # Errors
    /// Returns `TrainErr::InvalidConfig` if `N_JOBS` isn't a number.
    pub fn from_env() -> Result<Self> {
        let dataset = env::var("DATASET_PATH").unwrap_or_else(|_| DEFAULT_DATASET_PATH.into());
        let model = env::var("MODEL_PATH").unwrap_or_else(|_| DEFAULT_MODEL_PATH.into());
        let mut config = Self::new(dataset, model);

        if let Ok(value) = env::var("N_JOBS") {
            config.forest.n_jobs = value
                .trim()
                .parse()
                .map_err(|_| TrainErr::InvalidConfig { var: "N_JOBS", value })?;
        }

        Ok(config)
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_forest(mut self, forest: ForestParams) -> Self {
        self.forest = forest;
        self
    }

    pub fn dataset_path(&self) -> &Path {
        &self.dataset_path
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn test_size(&self) -> f64 {
        self.test_size
    }

    pub fn split_seed(&self) -> u64 {
        self.split_seed
    }

    pub fn forest(&self) -> &ForestParams {
        &self.forest
    }
}
