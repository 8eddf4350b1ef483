use std::sync::{Arc, OnceLock};

use crate::config::Config;
use crate::errors::AppError;
use crate::prediction::service::PredictionService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Set exactly once after the model artifact loads; empty means "not loaded".
    predictor: Arc<OnceLock<Arc<PredictionService>>>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            predictor: Arc::new(OnceLock::new()),
            config,
        }
    }

    /// Installs the prediction service. Fails if one is already installed.
    pub fn install(&self, service: PredictionService) -> anyhow::Result<()> {
        self.predictor
            .set(Arc::new(service))
            .map_err(|_| anyhow::anyhow!("prediction service already installed"))
    }

    pub fn predictor(&self) -> Result<Arc<PredictionService>, AppError> {
        self.predictor.get().cloned().ok_or(AppError::ModelUnavailable)
    }
}
