use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The result type used across the model crate.
pub type Result<T> = std::result::Result<T, ModelErr>;

/// Errors produced while fitting, querying or persisting a model.
#[derive(Debug)]
pub enum ModelErr {
    /// A shape invariant was violated (e.g. mismatched lengths).
    ShapeMismatch {
        /// Human-readable context for the mismatch (e.g. "features", "targets").
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// An input is invalid for semantic or domain reasons.
    InvalidInput(&'static str),
    /// Prediction was requested from a forest with no fitted trees.
    NotFitted,
    ThreadPool(rayon::ThreadPoolBuildError),
    Io(io::Error),
    Codec(bincode::Error),
    /// The artifact on disk was written by an incompatible format revision.
    UnsupportedFormat { got: u32, expected: u32 },
    /// The artifact was trained on a different set or ordering of columns.
    FeatureMismatch { got: Vec<String> },
    /// A decoded tree doesn't describe a walkable structure.
    CorruptTree(&'static str),
}

impl Display for ModelErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelErr::ShapeMismatch {
                what,
                got,
                expected,
            } => write!(f, "shape mismatch for {what}: got {got}, expected {expected}"),
            ModelErr::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            ModelErr::NotFitted => write!(f, "the forest has not been fitted"),
            ModelErr::ThreadPool(e) => write!(f, "failed to build thread pool: {e}"),
            ModelErr::Io(e) => write!(f, "io error: {e}"),
            ModelErr::Codec(e) => write!(f, "artifact codec error: {e}"),
            ModelErr::UnsupportedFormat { got, expected } => write!(
                f,
                "unsupported artifact format {got}, expected {expected}"
            ),
            ModelErr::FeatureMismatch { got } => write!(
                f,
                "artifact was trained on columns {got:?}, expected {:?}",
                crate::features::FEATURE_NAMES
            ),
            ModelErr::CorruptTree(msg) => write!(f, "corrupt tree: {msg}"),
        }
    }
}

impl Error for ModelErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ModelErr::ThreadPool(e) => Some(e),
            ModelErr::Io(e) => Some(e),
            ModelErr::Codec(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ModelErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<bincode::Error> for ModelErr {
    fn from(value: bincode::Error) -> Self {
        Self::Codec(value)
    }
}

impl From<rayon::ThreadPoolBuildError> for ModelErr {
    fn from(value: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(value)
    }
}
