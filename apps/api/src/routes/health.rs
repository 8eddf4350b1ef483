use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::classifier::ModelInfo;
use crate::state::AppState;

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_status: &'static str,
    pub api_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelInfo>,
}

/// GET /
/// Liveness only; does not depend on the model.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Career Compass ML API is running!",
        "status": "healthy"
    }))
}

/// GET /health
/// Reports whether the model is loaded, plus its metadata when it is.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let model = state
        .predictor()
        .ok()
        .map(|p| p.classifier().info().clone());

    Json(HealthResponse {
        status: "healthy",
        model_status: if model.is_some() { "loaded" } else { "not loaded" },
        api_version: API_VERSION,
        model,
    })
}
