//! Feature Preparer — turns loose client input into the record the model consumes.
//!
//! The feature set is deliberately coarse: the number of skills, not which
//! skills. How each field is encoded numerically is owned by the model
//! artifact's feature schema, so only this record shape is fixed here.

use crate::prediction::models::SkillsInput;

/// Single-row model input, built fresh per request.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub skills_count: usize,
    pub education: String,
    pub job_experience: f64,
}

/// Splits and trims skills, dropping empty or whitespace-only tokens.
pub fn normalize_skills(skills: &SkillsInput) -> Vec<String> {
    let tokens: Vec<&str> = match skills {
        SkillsInput::List(items) => items.iter().map(String::as_str).collect(),
        SkillsInput::Csv(raw) => raw.split(',').collect(),
    };

    tokens
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn normalize_education(education: &str) -> String {
    education.trim().to_lowercase()
}

/// Builds the model input. Never fails; range checks belong to request validation.
pub fn prepare(skills: &SkillsInput, education: &str, job_experience: f64) -> FeatureRecord {
    FeatureRecord {
        skills_count: normalize_skills(skills).len(),
        education: normalize_education(education),
        job_experience,
    }
}
