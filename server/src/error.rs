use std::{error::Error, fmt, io};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use model::ModelErr;
use serde::Serialize;

use crate::request::FeatureErr;

/// The server's startup result type.
pub type Result<T> = std::result::Result<T, ServerErr>;

/// Failures that prevent the service from starting at all.
#[derive(Debug)]
pub enum ServerErr {
    Io(io::Error),
    /// An environment variable holds a value that can't be parsed.
    InvalidConfig {
        var: &'static str,
        value: String,
    },
}

impl fmt::Display for ServerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerErr::Io(e) => write!(f, "io error: {e}"),
            ServerErr::InvalidConfig { var, value } => {
                write!(f, "invalid value for {var}: {value:?}")
            }
        }
    }
}

impl Error for ServerErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ServerErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ServerErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Per-request failures of the predict endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictErr {
    /// The model failed to load at startup.
    ModelUnavailable,
    /// The body is absent, empty or not a JSON object.
    MalformedRequest,
    /// A field is missing or not numeric, or inference rejected the input.
    InvalidFeature(String),
}

impl PredictErr {
    pub fn status(&self) -> StatusCode {
        match self {
            PredictErr::ModelUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            PredictErr::MalformedRequest | PredictErr::InvalidFeature(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl fmt::Display for PredictErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictErr::ModelUnavailable => write!(f, "Model not loaded"),
            PredictErr::MalformedRequest => write!(f, "Invalid or missing JSON body"),
            PredictErr::InvalidFeature(detail) => write!(f, "Prediction failed: {detail}"),
        }
    }
}

impl Error for PredictErr {}

impl From<FeatureErr> for PredictErr {
    fn from(value: FeatureErr) -> Self {
        Self::InvalidFeature(value.to_string())
    }
}

/// Inference failures are blamed on the input, never on the server.
impl From<ModelErr> for PredictErr {
    fn from(value: ModelErr) -> Self {
        Self::InvalidFeature(value.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for PredictErr {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_and_messages() {
        assert_eq!(
            PredictErr::ModelUnavailable.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(PredictErr::MalformedRequest.status(), StatusCode::BAD_REQUEST);

        let err = PredictErr::from(FeatureErr::Missing("latitude"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "Prediction failed: missing required field 'latitude'"
        );
    }

    #[test]
    fn model_errors_are_client_errors() {
        let err = PredictErr::from(ModelErr::InvalidInput("input contains non-finite values"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
