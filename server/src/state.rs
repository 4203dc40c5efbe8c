use std::path::Path;

use log::{error, info};
use model::{ModelArtifact, features::scale_price};

use crate::{error::PredictErr, request::PredictRequest};

/// Whether the model made it into memory at startup.
///
/// There is no transition out of `Unloaded`: a failed load leaves the
/// service answering every prediction with `ModelUnavailable`.
#[derive(Debug)]
pub enum ModelState {
    Unloaded,
    Ready(ModelArtifact),
}

/// Process-wide, read-only state shared by every request handler.
#[derive(Debug)]
pub struct AppState {
    model: ModelState,
}

impl AppState {
    /// Loads the artifact at `path` once.
    ///
    /// A load failure is logged here and never retried.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match ModelArtifact::load(path) {
            Ok(artifact) => {
                info!(
                    "model loaded from {} ({} trees)",
                    path.display(),
                    artifact.forest().n_trees()
                );
                Self::ready(artifact)
            }
            Err(e) => {
                error!("error loading model from {}: {e}", path.display());
                Self::unloaded()
            }
        }
    }

    pub fn ready(artifact: ModelArtifact) -> Self {
        Self {
            model: ModelState::Ready(artifact),
        }
    }

    pub fn unloaded() -> Self {
        Self {
            model: ModelState::Unloaded,
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self.model, ModelState::Ready(_))
    }

    /// Runs one prediction from a raw request body to a dollar estimate.
    ///
    /// # Errors
    /// `ModelUnavailable` when no model is loaded, `MalformedRequest` for an
    /// unusable body and `InvalidFeature` for bad fields or a failed
    /// inference.
    pub fn predict(&self, body: &[u8]) -> Result<f64, PredictErr> {
        let ModelState::Ready(artifact) = &self.model else {
            return Err(PredictErr::ModelUnavailable);
        };

        let request = PredictRequest::from_body(body)?;
        let raw = artifact.predict(&request.to_features())?;

        Ok(scale_price(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unloaded_state_rejects_before_parsing() {
        let state = AppState::unloaded();

        assert!(!state.is_ready());
        assert_eq!(state.predict(b""), Err(PredictErr::ModelUnavailable));
    }

    #[test]
    fn missing_file_leaves_state_unloaded() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::load(dir.path().join("nope.bin"));

        assert!(!state.is_ready());
    }
}
