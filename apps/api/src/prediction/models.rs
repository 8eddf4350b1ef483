use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Error type tag carried by failed batch elements.
pub const PREDICTION_ERROR_TYPE: &str = "prediction_error";

/// Skills as sent by clients: a JSON array or a comma-separated string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillsInput {
    List(Vec<String>),
    Csv(String),
}

/// Body of `POST /predict`, and each element of `POST /predict-batch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub skills: SkillsInput,
    pub education: String,
    /// Years of experience; integers and floats are both accepted.
    pub job_experience: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_job_role: String,
    pub confidence: f64,
    pub probabilities: BTreeMap<String, f64>,
    pub success: bool,
    pub message: String,
}

/// A batch element that failed inside the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResult {
    pub success: bool,
    pub message: String,
    pub error_type: String,
}

impl ErrorResult {
    pub fn prediction_error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error_type: PREDICTION_ERROR_TYPE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchItem {
    Success(PredictionResult),
    Failure(ErrorResult),
}

impl BatchItem {
    pub fn is_success(&self) -> bool {
        matches!(self, BatchItem::Success(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResponse {
    pub results: Vec<BatchItem>,
    pub total_processed: usize,
}
