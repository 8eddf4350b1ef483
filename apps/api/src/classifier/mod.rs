//! Classifier — the opaque pre-trained model behind the prediction service.
//!
//! Any backend implements `Classifier`. Optional capabilities (probability
//! output, class labels) are declared through `Capabilities` and read once
//! when the handle is built, never re-probed per request.
//!
//! `PredictionService` holds a `ClassifierHandle`, constructed at startup.

pub mod forest;
pub mod loader;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::prediction::features::FeatureRecord;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Failed to read model artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("Invalid feature '{name}': {reason}")]
    InvalidFeature { name: String, reason: String },

    #[error("Classifier does not support {0}")]
    Unsupported(&'static str),

    #[error("Inference error: {0}")]
    Inference(String),
}

/// Optional capabilities a classifier backend may offer on top of `predict`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub probabilities: bool,
    pub class_labels: bool,
}

/// The minimal contract of a pre-trained classifier.
///
/// Implementations must be safe for concurrent read-only inference.
pub trait Classifier: Send + Sync {
    /// Short backend name for logs and `/health`.
    fn kind(&self) -> &str;

    fn capabilities(&self) -> Capabilities;

    /// Point prediction for a single record, rendered as a display label.
    fn predict(&self, record: &FeatureRecord) -> Result<String, ModelError>;

    /// Per-class probability vector, ordered like `classes()` when labels exist.
    fn predict_proba(&self, _record: &FeatureRecord) -> Result<Vec<f64>, ModelError> {
        Err(ModelError::Unsupported("probability output"))
    }

    fn classes(&self) -> Option<&[String]> {
        None
    }
}

/// Public metadata about the loaded model, exposed on `/health`.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub kind: String,
    pub source: String,
    pub class_count: Option<usize>,
    pub capabilities: Capabilities,
    pub loaded_at: DateTime<Utc>,
}

/// Shared, immutable handle to a loaded classifier.
///
/// Capabilities are captured once at construction.
#[derive(Clone)]
pub struct ClassifierHandle {
    model: Arc<dyn Classifier>,
    capabilities: Capabilities,
    info: Arc<ModelInfo>,
}

impl ClassifierHandle {
    pub fn new(model: Arc<dyn Classifier>, source: impl Into<String>) -> Self {
        let capabilities = model.capabilities();
        let info = ModelInfo {
            kind: model.kind().to_string(),
            source: source.into(),
            class_count: model.classes().map(<[String]>::len),
            capabilities,
            loaded_at: Utc::now(),
        };
        Self {
            model,
            capabilities,
            info: Arc::new(info),
        }
    }

    pub fn model(&self) -> &dyn Classifier {
        self.model.as_ref()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn info(&self) -> &ModelInfo {
        &self.info
    }
}

impl fmt::Debug for ClassifierHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierHandle")
            .field("kind", &self.info.kind)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}
