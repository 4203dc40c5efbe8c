use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ModelErr, Result},
    features::{FEATURE_NAMES, FeatureVector},
    forest::RandomForestRegressor,
};

/// Revision of the on-disk layout, bumped on incompatible changes.
pub const ARTIFACT_FORMAT: u32 = 1;

/// A fitted forest together with the column contract it was trained on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    format: u32,
    feature_names: Vec<String>,
    forest: RandomForestRegressor,
}

impl ModelArtifact {
    /// Wraps a forest trained on the `FEATURE_NAMES` columns.
    ///
    /// # Errors
    /// Returns `ModelErr::ShapeMismatch` if the forest wasn't trained on
    /// exactly that many columns.
    pub fn new(forest: RandomForestRegressor) -> Result<Self> {
        if forest.n_features() != FEATURE_NAMES.len() {
            return Err(ModelErr::ShapeMismatch {
                what: "forest features",
                got: forest.n_features(),
                expected: FEATURE_NAMES.len(),
            });
        }

        Ok(Self {
            format: ARTIFACT_FORMAT,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            forest,
        })
    }

    /// Runs single-sample inference, returning the raw model output.
    pub fn predict(&self, features: &FeatureVector) -> Result<f64> {
        self.forest.predict_one(&features.to_array())
    }

    #[inline]
    pub fn forest(&self) -> &RandomForestRegressor {
        &self.forest
    }

    #[inline]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Serializes the artifact to `path`, creating missing parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;

        info!(
            "saved model with {} trees to {}",
            self.forest.n_trees(),
            path.display()
        );
        Ok(())
    }

    /// Reads an artifact back, checking its format and column contract.
    ///
    /// # Errors
    /// Returns `ModelErr::UnsupportedFormat` or `ModelErr::FeatureMismatch`
    /// when the file was not produced for this build's feature layout, and
    /// `ModelErr::CorruptTree` when a tree can't be walked safely.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let artifact: Self = bincode::deserialize_from(reader)?;
        artifact.validate()?;
        Ok(artifact)
    }

    fn validate(&self) -> Result<()> {
        if self.format != ARTIFACT_FORMAT {
            return Err(ModelErr::UnsupportedFormat {
                got: self.format,
                expected: ARTIFACT_FORMAT,
            });
        }

        if !self.feature_names.iter().eq(FEATURE_NAMES.iter()) {
            return Err(ModelErr::FeatureMismatch {
                got: self.feature_names.clone(),
            });
        }

        if self.forest.n_features() != FEATURE_NAMES.len() || self.forest.n_trees() == 0 {
            return Err(ModelErr::InvalidInput("artifact holds no usable forest"));
        }

        self.forest.check()
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Array1, Array2};

    use super::*;
    use crate::forest::ForestParams;

    fn tiny_forest(n_features: usize) -> RandomForestRegressor {
        let x = Array2::from_shape_fn((12, n_features), |(i, j)| (i + j) as f64);
        let y = Array1::from_shape_fn(12, |i| i as f64 * 0.5);
        let params = ForestParams {
            n_estimators: 3,
            n_jobs: 1,
            ..ForestParams::default()
        };
        RandomForestRegressor::fit(x.view(), y.view(), &params).unwrap()
    }

    #[test]
    fn save_creates_directories_and_load_restores() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("model.bin");

        let artifact = ModelArtifact::new(tiny_forest(FEATURE_NAMES.len())).unwrap();
        artifact.save(&path).unwrap();

        let loaded = ModelArtifact::load(&path).unwrap();
        assert_eq!(loaded, artifact);
        assert_eq!(loaded.feature_names(), FEATURE_NAMES);
    }

    #[test]
    fn rejects_forest_of_wrong_width() {
        assert!(matches!(
            ModelArtifact::new(tiny_forest(3)),
            Err(ModelErr::ShapeMismatch { got: 3, .. })
        ));
    }

    #[test]
    fn load_rejects_reordered_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");

        let mut artifact = ModelArtifact::new(tiny_forest(FEATURE_NAMES.len())).unwrap();
        artifact.feature_names.swap(2, 3);
        artifact.save(&path).unwrap();

        assert!(matches!(
            ModelArtifact::load(&path),
            Err(ModelErr::FeatureMismatch { .. })
        ));
    }

    #[test]
    fn load_rejects_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");

        let mut artifact = ModelArtifact::new(tiny_forest(FEATURE_NAMES.len())).unwrap();
        artifact.format = ARTIFACT_FORMAT + 1;
        artifact.save(&path).unwrap();

        assert!(matches!(
            ModelArtifact::load(&path),
            Err(ModelErr::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn load_rejects_trees_that_cannot_be_walked() {
        // Same wire layout as `ModelArtifact`, with a split pointing back at
        // itself.
        #[derive(Serialize)]
        enum RawNode {
            Split {
                feature: usize,
                threshold: f64,
                left: usize,
                right: usize,
            },
            #[allow(dead_code)]
            Leaf { value: f64 },
        }
        #[derive(Serialize)]
        struct RawTree {
            nodes: Vec<RawNode>,
        }
        #[derive(Serialize)]
        struct RawForest {
            n_features: usize,
            trees: Vec<RawTree>,
        }
        #[derive(Serialize)]
        struct RawArtifact {
            format: u32,
            feature_names: Vec<String>,
            forest: RawForest,
        }

        let raw = RawArtifact {
            format: ARTIFACT_FORMAT,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            forest: RawForest {
                n_features: FEATURE_NAMES.len(),
                trees: vec![RawTree {
                    nodes: vec![RawNode::Split {
                        feature: 0,
                        threshold: 1.0,
                        left: 0,
                        right: 0,
                    }],
                }],
            },
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        fs::write(&path, bincode::serialize(&raw).unwrap()).unwrap();

        assert!(matches!(
            ModelArtifact::load(&path),
            Err(ModelErr::CorruptTree(_))
        ));
    }

    #[test]
    fn load_of_garbage_is_a_codec_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        fs::write(&path, b"not a model").unwrap();

        assert!(matches!(ModelArtifact::load(&path), Err(ModelErr::Codec(_))));
    }

    #[test]
    fn load_of_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ModelArtifact::load(dir.path().join("absent.bin")),
            Err(ModelErr::Io(_))
        ));
    }
}
