use std::{path::Path, sync::Arc};

use axum::{
    Json, Router,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    routing::{get, post},
};
use log::debug;
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
};

use crate::{error::PredictErr, state::AppState};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PredictResponse {
    pub predicted_price: f64,
}

/// Builds the service's router.
///
/// # Args
/// * `state` - The shared model state, injected into every handler.
/// * `frontend_dir` - Build output of the client application; `index.html`
///   is served at `/` and its `assets/` folder under `/assets`.
pub fn router(state: Arc<AppState>, frontend_dir: &Path) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route_service("/", ServeFile::new(frontend_dir.join("index.html")))
        .nest_service("/assets", ServeDir::new(frontend_dir.join("assets")))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        model_loaded: state.is_ready(),
    })
}

async fn predict(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PredictResponse>, PredictErr> {
    // Oversized or unreadable bodies keep the JSON error shape.
    let body = body.map_err(|e| {
        debug!("predict body rejected: {e}");
        PredictErr::MalformedRequest
    })?;

    let predicted_price = state
        .predict(&body)
        .inspect_err(|e| debug!("predict rejected: {e}"))?;
    debug!("predicted price {predicted_price:.2}");

    Ok(Json(PredictResponse { predicted_price }))
}
