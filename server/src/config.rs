use std::{
    env,
    path::{Path, PathBuf},
};

use crate::error::{Result, ServerErr};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 7860;
pub const DEFAULT_MODEL_PATH: &str = "model/house_price_model.bin";
pub const DEFAULT_FRONTEND_DIR: &str = "frontend/dist";

/// Where the service listens and what it loads at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    host: String,
    port: u16,
    model_path: PathBuf,
    frontend_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            model_path: DEFAULT_MODEL_PATH.into(),
            frontend_dir: DEFAULT_FRONTEND_DIR.into(),
        }
    }
}

impl ServerConfig {
    /// Reads `HOST`, `PORT`, `MODEL_PATH` and `FRONTEND_DIR`, keeping the
    /// defaults for unset variables.
    ///
    /// # Errors
    /// Returns `ServerErr::InvalidConfig` if `PORT` isn't a valid port.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(host) = env::var("HOST") {
            config.host = host;
        }
        if let Ok(value) = env::var("PORT") {
            config.port = value
                .trim()
                .parse()
                .map_err(|_| ServerErr::InvalidConfig { var: "PORT", value })?;
        }
        if let Ok(path) = env::var("MODEL_PATH") {
            config.model_path = path.into();
        }
        if let Ok(dir) = env::var("FRONTEND_DIR") {
            config.frontend_dir = dir.into();
        }

        Ok(config)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_model_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn with_frontend_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.frontend_dir = dir.into();
        self
    }

    /// The `host:port` pair to bind.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn frontend_dir(&self) -> &Path {
        &self.frontend_dir
    }
}
