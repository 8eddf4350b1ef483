use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use crate::classifier::forest::{ForestArtifact, RandomForest};
use crate::classifier::{ClassifierHandle, ModelError};

/// Reads, validates and compiles the model artifact at `path`.
///
/// Called once at startup. Any error here is fatal for the process.
pub fn load_model(path: &Path) -> Result<ClassifierHandle, ModelError> {
    info!("Loading model artifact from {}", path.display());

    let forest = match read_forest(path) {
        Ok(forest) => forest,
        Err(e) => {
            error!("Error loading model: {e}");
            return Err(e);
        }
    };

    info!(
        classes = forest.classes_len(),
        trees = forest.tree_count(),
        "Model loaded successfully"
    );

    Ok(ClassifierHandle::new(
        Arc::new(forest),
        path.display().to_string(),
    ))
}

fn read_forest(path: &Path) -> Result<RandomForest, ModelError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let artifact: ForestArtifact = serde_json::from_str(&raw)?;
    RandomForest::from_artifact(artifact)
}
