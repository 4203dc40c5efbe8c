//! Random forest regression over the California housing feature layout.
//!
//! The crate owns the contract shared by training and serving: the ordered
//! column list in [`features`], the estimator itself and the persisted
//! [`ModelArtifact`].

pub mod artifact;
pub mod error;
pub mod features;
pub mod forest;
pub mod metrics;
pub mod tree;

pub use artifact::ModelArtifact;
pub use error::{ModelErr, Result};
pub use features::{FEATURE_NAMES, FeatureVector, NUM_FEATURES, PRICE_SCALE};
pub use forest::{ForestParams, RandomForestRegressor};
pub use tree::{RegressionTree, TreeParams};
