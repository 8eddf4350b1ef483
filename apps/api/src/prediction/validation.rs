use crate::errors::AppError;
use crate::prediction::features::normalize_skills;
use crate::prediction::models::PredictionRequest;

/// Checks a single request before it reaches the feature preparer.
///
/// Missing or mistyped fields never get this far: the JSON extractor
/// rejects them.
pub fn validate_request(request: &PredictionRequest) -> Result<(), String> {
    if !request.job_experience.is_finite() {
        return Err("job_experience must be a finite number".to_string());
    }
    if request.job_experience < 0.0 {
        return Err(format!(
            "job_experience must be greater than or equal to 0, got {}",
            request.job_experience
        ));
    }
    if normalize_skills(&request.skills).is_empty() {
        return Err("skills must contain at least one non-empty entry".to_string());
    }
    Ok(())
}

pub fn validate_single(request: &PredictionRequest) -> Result<(), AppError> {
    validate_request(request).map_err(AppError::Validation)
}

/// Rejects the whole batch if it is too large or any element is invalid.
pub fn validate_batch(requests: &[PredictionRequest], max_batch_size: usize) -> Result<(), AppError> {
    if requests.len() > max_batch_size {
        return Err(AppError::Validation(format!(
            "batch of {} requests exceeds the limit of {max_batch_size}",
            requests.len()
        )));
    }

    for (i, request) in requests.iter().enumerate() {
        validate_request(request).map_err(|msg| AppError::Validation(format!("[{i}]: {msg}")))?;
    }
    Ok(())
}
