//! Prediction Service — single and batch inference over the loaded classifier.
//!
//! The service is built once at startup around a `ClassifierHandle` and is
//! read-only afterwards, so it can be shared across requests without locks.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::classifier::{ClassifierHandle, ModelError};
use crate::prediction::features::{prepare, FeatureRecord};
use crate::prediction::models::{
    BatchItem, BatchResponse, ErrorResult, PredictionRequest, PredictionResult,
};

/// Confidence reported when probabilities cannot be obtained.
pub const DEGRADED_CONFIDENCE: f64 = 0.5;

const SUCCESS_MESSAGE: &str = "Prediction completed successfully";

/// Outcome of the probability step. Degradation is a normal result, not an error.
#[derive(Debug)]
pub enum ProbabilityOutcome {
    Full {
        confidence: f64,
        probabilities: BTreeMap<String, f64>,
    },
    Degraded {
        reason: ModelError,
    },
}

impl ProbabilityOutcome {
    fn into_parts(self) -> (f64, BTreeMap<String, f64>) {
        match self {
            ProbabilityOutcome::Full {
                confidence,
                probabilities,
            } => (confidence, probabilities),
            ProbabilityOutcome::Degraded { reason } => {
                warn!("Could not get probabilities: {reason}");
                (DEGRADED_CONFIDENCE, BTreeMap::new())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct PredictionService {
    classifier: ClassifierHandle,
}

impl PredictionService {
    pub fn new(classifier: ClassifierHandle) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &ClassifierHandle {
        &self.classifier
    }

    /// Predicts a job role for one request.
    ///
    /// Fails only if the point prediction fails; probability problems
    /// degrade the confidence instead.
    pub fn predict_one(&self, request: &PredictionRequest) -> Result<PredictionResult, ModelError> {
        let record = prepare(&request.skills, &request.education, request.job_experience);
        let predicted_job_role = self.classifier.model().predict(&record)?;
        let (confidence, probabilities) = self.probabilities(&record).into_parts();

        debug!(
            role = %predicted_job_role,
            confidence,
            skills_count = record.skills_count,
            "Prediction completed"
        );

        Ok(PredictionResult {
            predicted_job_role,
            confidence,
            probabilities,
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
        })
    }

    /// Runs every request in order; a failing element never aborts its siblings.
    pub fn predict_batch(&self, requests: &[PredictionRequest]) -> BatchResponse {
        let results = requests
            .iter()
            .enumerate()
            .map(|(i, request)| match self.predict_one(request) {
                Ok(result) => BatchItem::Success(result),
                Err(e) => {
                    warn!(index = i, "Batch element failed: {e}");
                    BatchItem::Failure(ErrorResult::prediction_error(format!(
                        "Failed to process request: {e}"
                    )))
                }
            })
            .collect::<Vec<_>>();

        debug!(
            succeeded = results.iter().filter(|r| r.is_success()).count(),
            total = requests.len(),
            "Batch completed"
        );

        BatchResponse {
            results,
            total_processed: requests.len(),
        }
    }

    /// Probability distribution for `record`, or the reason it is unavailable.
    pub fn probabilities(&self, record: &FeatureRecord) -> ProbabilityOutcome {
        let capabilities = self.classifier.capabilities();
        if !capabilities.probabilities {
            return ProbabilityOutcome::Degraded {
                reason: ModelError::Unsupported("probability output"),
            };
        }

        let model = self.classifier.model();
        let proba = match model.predict_proba(record) {
            Ok(proba) => proba,
            Err(reason) => return ProbabilityOutcome::Degraded { reason },
        };

        if let Some(p) = proba.iter().find(|p| !(0.0..=1.0).contains(*p)) {
            return ProbabilityOutcome::Degraded {
                reason: ModelError::Inference(format!("probability {p} outside [0, 1]")),
            };
        }

        // Empty vector yields 0.0.
        let confidence = proba.iter().copied().fold(0.0, f64::max);

        let classes = if capabilities.class_labels {
            model.classes()
        } else {
            None
        };

        let probabilities: BTreeMap<String, f64> = match classes {
            Some(classes) if classes.len() == proba.len() => classes
                .iter()
                .cloned()
                .zip(proba.iter().copied())
                .collect(),
            Some(classes) => {
                return ProbabilityOutcome::Degraded {
                    reason: ModelError::Inference(format!(
                        "{} class labels for {} probabilities",
                        classes.len(),
                        proba.len()
                    )),
                }
            }
            None => BTreeMap::new(),
        };

        ProbabilityOutcome::Full {
            confidence,
            probabilities,
        }
    }
}
