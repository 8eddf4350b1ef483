//! Random forest backend — evaluates a JSON export of a trained forest.
//!
//! Semantics follow a scikit-learn `RandomForestClassifier`:
//! - split nodes route `x[feature] <= threshold` to `left`, otherwise `right`
//! - leaves hold per-class weights, normalized to a distribution
//! - `predict_proba` averages leaf distributions across trees
//! - `predict` picks the class with the highest mean probability
//!
//! The artifact also carries its own feature schema, so feature ordering and
//! categorical vocabularies travel with the model rather than the service.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use crate::classifier::{Capabilities, Classifier, ModelError};
use crate::prediction::features::FeatureRecord;

/// Encoded value for a categorical input outside the training vocabulary.
pub const UNKNOWN_CATEGORY: f64 = -1.0;

// ────────────────────────────────────────────────────────────────────────────
// Artifact format
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FeatureSpec {
    Numeric { name: String },
    Categorical { name: String, categories: Vec<String> },
}

impl FeatureSpec {
    fn name(&self) -> &str {
        match self {
            FeatureSpec::Numeric { name } | FeatureSpec::Categorical { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForestArtifact {
    pub classes: Vec<String>,
    pub features: Vec<FeatureSpec>,
    pub trees: Vec<Tree>,
}

// ────────────────────────────────────────────────────────────────────────────
// Compiled forest
// ────────────────────────────────────────────────────────────────────────────

/// Encodes one FeatureRecord field into the model's numeric input.
#[derive(Debug)]
enum Encoder {
    SkillsCount,
    JobExperience,
    Education(HashMap<String, f64>),
}

#[derive(Debug)]
pub struct RandomForest {
    classes: Vec<String>,
    feature_names: Vec<String>,
    encoders: Vec<Encoder>,
    trees: Vec<Tree>,
}

impl RandomForest {
    /// Validates an artifact and prepares it for inference.
    pub fn from_artifact(artifact: ForestArtifact) -> Result<Self, ModelError> {
        let ForestArtifact {
            classes,
            features,
            trees,
        } = artifact;

        if classes.is_empty() {
            return Err(invalid("class list is empty"));
        }
        let mut seen = HashSet::new();
        for class in &classes {
            if !seen.insert(class.as_str()) {
                return Err(invalid(format!("duplicate class label '{class}'")));
            }
        }
        if features.is_empty() {
            return Err(invalid("feature schema is empty"));
        }
        if trees.is_empty() {
            return Err(invalid("forest has no trees"));
        }

        let encoders = features
            .iter()
            .map(build_encoder)
            .collect::<Result<Vec<_>, _>>()?;

        for (t, tree) in trees.iter().enumerate() {
            validate_tree(t, tree, features.len(), classes.len())?;
        }

        Ok(Self {
            classes,
            feature_names: features.iter().map(|f| f.name().to_string()).collect(),
            encoders,
            trees,
        })
    }

    pub fn classes_len(&self) -> usize {
        self.classes.len()
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    fn encode(&self, record: &FeatureRecord) -> Result<Vec<f64>, ModelError> {
        self.encoders
            .iter()
            .zip(&self.feature_names)
            .map(|(encoder, name)| {
                let value = match encoder {
                    Encoder::SkillsCount => record.skills_count as f64,
                    Encoder::JobExperience => record.job_experience,
                    Encoder::Education(vocab) => vocab
                        .get(&record.education)
                        .copied()
                        .unwrap_or(UNKNOWN_CATEGORY),
                };
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(ModelError::InvalidFeature {
                        name: name.clone(),
                        reason: format!("non-finite value {value}"),
                    })
                }
            })
            .collect()
    }

    /// Mean of the normalized leaf distributions reached in every tree.
    fn distribution(&self, record: &FeatureRecord) -> Result<Vec<f64>, ModelError> {
        let x = self.encode(record)?;
        let mut sums = vec![0.0_f64; self.classes.len()];

        for tree in &self.trees {
            let leaf = walk(tree, &x)?;
            let total: f64 = leaf.iter().sum();
            for (sum, weight) in sums.iter_mut().zip(leaf) {
                *sum += weight / total;
            }
        }

        let n = self.trees.len() as f64;
        Ok(sums.into_iter().map(|s| s / n).collect())
    }
}

impl Classifier for RandomForest {
    fn kind(&self) -> &str {
        "random_forest"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            probabilities: true,
            class_labels: true,
        }
    }

    fn predict(&self, record: &FeatureRecord) -> Result<String, ModelError> {
        let proba = self.distribution(record)?;
        // First index wins ties, matching numpy argmax.
        let best = proba
            .iter()
            .enumerate()
            .fold(0, |best, (i, p)| if *p > proba[best] { i } else { best });
        Ok(self.classes[best].clone())
    }

    fn predict_proba(&self, record: &FeatureRecord) -> Result<Vec<f64>, ModelError> {
        self.distribution(record)
    }

    fn classes(&self) -> Option<&[String]> {
        Some(&self.classes)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn invalid(msg: impl Into<String>) -> ModelError {
    ModelError::InvalidArtifact(msg.into())
}

fn build_encoder(spec: &FeatureSpec) -> Result<Encoder, ModelError> {
    match spec {
        FeatureSpec::Numeric { name } => match name.as_str() {
            "skills_count" => Ok(Encoder::SkillsCount),
            "job_experience" => Ok(Encoder::JobExperience),
            other => Err(invalid(format!("unknown numeric feature '{other}'"))),
        },
        FeatureSpec::Categorical { name, categories } => match name.as_str() {
            "education" => {
                // Vocabulary is matched against the preparer's normalized form.
                let vocab = categories
                    .iter()
                    .enumerate()
                    .map(|(i, c)| (c.trim().to_lowercase(), i as f64))
                    .collect();
                Ok(Encoder::Education(vocab))
            }
            other => Err(invalid(format!("unknown categorical feature '{other}'"))),
        },
    }
}

/// Children must sit strictly after their parent, which rules out cycles.
fn validate_tree(
    index: usize,
    tree: &Tree,
    feature_count: usize,
    class_count: usize,
) -> Result<(), ModelError> {
    if tree.nodes.is_empty() {
        return Err(invalid(format!("tree {index} has no nodes")));
    }

    for (i, node) in tree.nodes.iter().enumerate() {
        match node {
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if *feature >= feature_count {
                    return Err(invalid(format!(
                        "tree {index} node {i}: feature index {feature} out of range"
                    )));
                }
                if !threshold.is_finite() {
                    return Err(invalid(format!(
                        "tree {index} node {i}: threshold is not finite"
                    )));
                }
                for child in [*left, *right] {
                    if child <= i || child >= tree.nodes.len() {
                        return Err(invalid(format!(
                            "tree {index} node {i}: child index {child} out of range"
                        )));
                    }
                }
            }
            Node::Leaf { value } => {
                if value.len() != class_count {
                    return Err(invalid(format!(
                        "tree {index} node {i}: leaf has {} weights, expected {class_count}",
                        value.len()
                    )));
                }
                if value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(invalid(format!(
                        "tree {index} node {i}: leaf weights must be finite and non-negative"
                    )));
                }
                if value.iter().sum::<f64>() <= 0.0 {
                    return Err(invalid(format!(
                        "tree {index} node {i}: leaf weights sum to zero"
                    )));
                }
            }
        }
    }
    Ok(())
}

fn walk<'a>(tree: &'a Tree, x: &[f64]) -> Result<&'a [f64], ModelError> {
    let mut i = 0;
    // Validated trees terminate within nodes.len() steps.
    for _ in 0..tree.nodes.len() {
        match &tree.nodes[i] {
            Node::Leaf { value } => return Ok(value.as_slice()),
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                i = if x[*feature] <= *threshold { *left } else { *right };
            }
        }
    }
    Err(ModelError::Inference(
        "tree traversal did not reach a leaf".to_string(),
    ))
}
