//! HTTP service answering house price predictions.

pub mod config;
pub mod error;
pub mod request;
pub mod routes;
pub mod state;

use std::sync::Arc;

use log::info;
use tokio::{net::TcpListener, signal};

pub use config::ServerConfig;
pub use error::{PredictErr, Result, ServerErr};
pub use routes::router;
pub use state::AppState;

/// Loads the model once, then serves requests until ctrl-c.
///
/// A missing or unreadable model doesn't stop the service; it keeps running
/// and reports `model_loaded: false`.
///
/// # Errors
/// Returns `ServerErr::Io` if the listener can't be bound or the server
/// fails while running.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let state = Arc::new(AppState::load(config.model_path()));
    let app = router(state, config.frontend_dir());

    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("listening at {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if signal::ctrl_c().await.is_ok() {
                info!("received ctrl-c, shutting down");
            }
        })
        .await?;

    Ok(())
}
