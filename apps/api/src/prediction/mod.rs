// Job role prediction: request contract, feature preparation, inference orchestration.
// All model access goes through `PredictionService`; handlers never touch the classifier.

pub mod features;
pub mod handlers;
pub mod models;
pub mod service;
pub mod validation;
