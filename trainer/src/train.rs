use std::path::PathBuf;

use log::info;
use model::{
    ModelArtifact, RandomForestRegressor,
    metrics::{mean_squared_error, r2_score},
};

use crate::{config::TrainerConfig, dataset::Dataset, error::Result, split::train_test_split};

/// Held-out evaluation of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    pub train_samples: usize,
    pub test_samples: usize,
    pub mse: f64,
    pub r2: f64,
    pub model_path: PathBuf,
}

/// Fits a forest on the training partition of `dataset`, scores it on the
/// held-out partition and writes the artifact to the configured path.
pub fn fit_and_save(dataset: &Dataset, config: &TrainerConfig) -> Result<TrainReport> {
    info!("splitting {} samples", dataset.len());
    let (train, test) = train_test_split(dataset, config.test_size(), config.split_seed())?;

    info!("training random forest regressor");
    let forest = RandomForestRegressor::fit(train.x(), train.y(), config.forest())?;

    let y_pred = forest.predict(test.x())?;
    let mse = mean_squared_error(test.y(), y_pred.view())?;
    let r2 = r2_score(test.y(), y_pred.view())?;
    info!("model trained, MSE: {mse:.4}, R2: {r2:.4}");

    ModelArtifact::new(forest)?.save(config.model_path())?;

    Ok(TrainReport {
        train_samples: train.len(),
        test_samples: test.len(),
        mse,
        r2,
        model_path: config.model_path().to_path_buf(),
    })
}

/// Runs the whole batch job: load, split, fit, evaluate, persist.
///
/// # Errors
/// Any dataset or filesystem failure aborts the run.
pub fn run(config: &TrainerConfig) -> Result<TrainReport> {
    let dataset = Dataset::load_csv(config.dataset_path())?;
    fit_and_save(&dataset, config)
}
