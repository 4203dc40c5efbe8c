//! Offline training job for the house price model.

pub mod config;
pub mod dataset;
pub mod error;
pub mod split;
pub mod train;

pub use config::TrainerConfig;
pub use dataset::Dataset;
pub use error::{Result, TrainErr};
pub use split::train_test_split;
pub use train::{TrainReport, fit_and_save, run};
