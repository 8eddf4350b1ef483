//! Axum route handlers for the Prediction API.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::prediction::models::{BatchResponse, PredictionRequest, PredictionResult};
use crate::prediction::validation::{validate_batch, validate_single};
use crate::state::AppState;

/// POST /predict
///
/// Predicts a job role from skills, education and experience.
/// Any failure in the point prediction is returned as a 500.
pub async fn handle_predict(
    State(state): State<AppState>,
    AppJson(request): AppJson<PredictionRequest>,
) -> Result<Json<PredictionResult>, AppError> {
    validate_single(&request)?;

    let predictor = state.predictor()?;
    let result = predictor.predict_one(&request)?;

    Ok(Json(result))
}

/// POST /predict-batch
///
/// Per-element failures are embedded in `results`; only whole-batch
/// problems (invalid input, model not loaded) fail the request.
pub async fn handle_predict_batch(
    State(state): State<AppState>,
    AppJson(requests): AppJson<Vec<PredictionRequest>>,
) -> Result<Json<BatchResponse>, AppError> {
    validate_batch(&requests, state.config.max_batch_size)?;

    let predictor = state.predictor()?;

    // Inference is CPU-bound; keep it off the async workers.
    let response = tokio::task::spawn_blocking(move || predictor.predict_batch(&requests))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("batch worker failed: {e}")))?;

    Ok(Json(response))
}
