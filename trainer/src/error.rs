use std::{error::Error, fmt, io};

use model::ModelErr;

/// The trainer's result type.
pub type Result<T> = std::result::Result<T, TrainErr>;

/// Failures of the offline training job. Every one of them aborts the run.
#[derive(Debug)]
pub enum TrainErr {
    Io(io::Error),
    Csv(csv::Error),
    Shape(ndarray::ShapeError),
    Model(ModelErr),
    /// The CSV header matches none of the known dataset layouts.
    UnknownLayout {
        headers: Vec<String>,
    },
    EmptyDataset,
    InvalidTestSize(f64),
    /// The split would leave one of the partitions empty.
    TooFewSamples {
        samples: usize,
        test_size: f64,
    },
    /// An environment variable holds a value that can't be parsed.
    InvalidConfig {
        var: &'static str,
        value: String,
    },
}

impl fmt::Display for TrainErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainErr::Io(e) => write!(f, "io error: {e}"),
            TrainErr::Csv(e) => write!(f, "csv error: {e}"),
            TrainErr::Shape(e) => write!(f, "shape error: {e}"),
            TrainErr::Model(e) => write!(f, "model error: {e}"),
            TrainErr::UnknownLayout { headers } => {
                write!(f, "unrecognised dataset header: {}", headers.join(","))
            }
            TrainErr::EmptyDataset => write!(f, "the dataset has no usable rows"),
            TrainErr::InvalidTestSize(size) => {
                write!(f, "test size must be within (0, 1), got {size}")
            }
            TrainErr::TooFewSamples { samples, test_size } => write!(
                f,
                "cannot split {samples} samples with test size {test_size}"
            ),
            TrainErr::InvalidConfig { var, value } => {
                write!(f, "invalid value for {var}: {value:?}")
            }
        }
    }
}

impl Error for TrainErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TrainErr::Io(e) => Some(e),
            TrainErr::Csv(e) => Some(e),
            TrainErr::Shape(e) => Some(e),
            TrainErr::Model(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TrainErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for TrainErr {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<ndarray::ShapeError> for TrainErr {
    fn from(value: ndarray::ShapeError) -> Self {
        Self::Shape(value)
    }
}

impl From<ModelErr> for TrainErr {
    fn from(value: ModelErr) -> Self {
        Self::Model(value)
    }
}
