use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::features::FEATURE_COUNT;
use crate::core::error::{PlannerError, Result};


/// A trained regressor mapping sprint features to a completion rate.
///
/// Input order is `[sprint_duration, tasks_per_day, avg_task_size, total_tasks]`.
/// The output is nominally in [0, 1] but nothing clamps it.
pub trait CompletionModel: Send + Sync {
    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> f64;

    fn kind(&self) -> &'static str;
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Leaf {
        leaf: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    /// Walks to a leaf. A split on a feature index outside the vector takes the right branch.
    pub(crate) fn evaluate(&self, features: &[f64; FEATURE_COUNT]) -> f64 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { leaf } => return *leaf,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let go_left = features.get(*feature).is_some_and(|x| x <= threshold);
                    node = if go_left { left.as_ref() } else { right.as_ref() };
                }
            }
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            TreeNode::Leaf { leaf } if !leaf.is_finite() => {
                Err(PlannerError::Model(format!("non-finite leaf value {leaf}")))
            }
            TreeNode::Leaf { .. } => Ok(()),
            TreeNode::Split { feature, .. } if *feature >= FEATURE_COUNT => Err(PlannerError::Model(
                format!("split on feature {feature}, only {FEATURE_COUNT} features exist"),
            )),
            TreeNode::Split { left, right, .. } => {
                left.validate()?;
                right.validate()
            }
        }
    }
}


/// On-disk model artifact, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    RandomForest { trees: Vec<TreeNode> },
    Linear { intercept: f64, coefficients: Vec<f64> },
}

impl ModelArtifact {

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn into_model(self) -> Result<Arc<dyn CompletionModel>> {
        match self {
            ModelArtifact::RandomForest { trees } => Ok(Arc::new(ForestModel::new(trees)?)),
            ModelArtifact::Linear {
                intercept,
                coefficients,
            } => Ok(Arc::new(LinearModel::new(intercept, &coefficients)?)),
        }
    }
}


/// Mean of independently trained regression trees.
#[derive(Debug, Clone)]
pub struct ForestModel {
    trees: Vec<TreeNode>,
}

impl ForestModel {
    pub fn new(trees: Vec<TreeNode>) -> Result<Self> {
        if trees.is_empty() {
            return Err(PlannerError::Model("random forest has no trees".to_string()));
        }
        for tree in &trees {
            tree.validate()?;
        }
        Ok(Self { trees })
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl CompletionModel for ForestModel {
    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.evaluate(features)).sum();
        sum / self.trees.len() as f64
    }

    fn kind(&self) -> &'static str {
        "random_forest"
    }
}


#[derive(Debug, Clone)]
pub struct LinearModel {
    intercept: f64,
    coefficients: [f64; FEATURE_COUNT],
}

impl LinearModel {
    pub fn new(intercept: f64, coefficients: &[f64]) -> Result<Self> {
        let coefficients: [f64; FEATURE_COUNT] = coefficients.try_into().map_err(|_| {
            PlannerError::Model(format!(
                "linear model needs {FEATURE_COUNT} coefficients, got {}",
                coefficients.len()
            ))
        })?;
        Ok(Self {
            intercept,
            coefficients,
        })
    }
}

impl CompletionModel for LinearModel {
    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }

    fn kind(&self) -> &'static str {
        "linear"
    }
}


pub fn load_model(path: impl AsRef<Path>) -> Result<Arc<dyn CompletionModel>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)?;
    let model = ModelArtifact::from_json(&raw)?.into_model()?;
    info!("Loaded {} model from {}", model.kind(), path.display());
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FOREST: &str = r#"{
        "kind": "random_forest",
        "trees": [
            {"feature": 1, "threshold": 1.5,
             "left": {"leaf": 0.9},
             "right": {"feature": 2, "threshold": 8.0, "left": {"leaf": 0.7}, "right": {"leaf": 0.5}}},
            {"leaf": 0.8}
        ]
    }"#;

    #[test]
    fn test_forest_averages_trees() {
        let model = ModelArtifact::from_json(FOREST).unwrap().into_model().unwrap();
        assert_eq!(model.kind(), "random_forest");

        assert!((model.predict(&[10.0, 1.0, 4.0, 10.0]) - 0.85).abs() < 1e-9);
        assert!((model.predict(&[10.0, 2.0, 4.0, 20.0]) - 0.75).abs() < 1e-9);
        assert!((model.predict(&[10.0, 2.0, 9.0, 20.0]) - 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_split_threshold_goes_left_on_equal() {
        let tree = TreeNode::Split {
            feature: 0,
            threshold: 5.0,
            left: Box::new(TreeNode::Leaf { leaf: 1.0 }),
            right: Box::new(TreeNode::Leaf { leaf: 0.0 }),
        };
        assert_eq!(tree.evaluate(&[5.0, 0.0, 0.0, 0.0]), 1.0);
        assert_eq!(tree.evaluate(&[5.1, 0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_split_on_unknown_feature_goes_right() {
        let tree = TreeNode::Split {
            feature: 7,
            threshold: 100.0,
            left: Box::new(TreeNode::Leaf { leaf: 1.0 }),
            right: Box::new(TreeNode::Leaf { leaf: 0.0 }),
        };
        assert_eq!(tree.evaluate(&[0.0; FEATURE_COUNT]), 0.0);
    }

    #[test]
    fn test_linear_model() {
        let model = ModelArtifact::from_json(
            r#"{"kind": "linear", "intercept": 1.0, "coefficients": [0.0, -0.1, -0.02, 0.0]}"#,
        )
        .unwrap()
        .into_model()
        .unwrap();
        assert!((model.predict(&[10.0, 2.0, 5.0, 20.0]) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_bad_artifacts() {
        let empty = ModelArtifact::from_json(r#"{"kind": "random_forest", "trees": []}"#).unwrap();
        assert!(matches!(empty.into_model(), Err(PlannerError::Model(_))));

        let bad_feature = ModelArtifact::from_json(
            r#"{"kind": "random_forest", "trees": [{"feature": 7, "threshold": 1.0, "left": {"leaf": 1.0}, "right": {"leaf": 0.0}}]}"#,
        )
        .unwrap();
        assert!(matches!(bad_feature.into_model(), Err(PlannerError::Model(_))));

        let short = ModelArtifact::from_json(r#"{"kind": "linear", "intercept": 0.0, "coefficients": [1.0]}"#)
            .unwrap();
        assert!(matches!(short.into_model(), Err(PlannerError::Model(_))));

        assert!(matches!(
            ModelArtifact::from_json(r#"{"kind": "svm"}"#),
            Err(PlannerError::Serialization(_))
        ));
    }

    #[test]
    fn test_load_model_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FOREST.as_bytes()).unwrap();

        let model = load_model(file.path()).unwrap();
        assert_eq!(model.kind(), "random_forest");

        assert!(matches!(load_model("missing/model.json"), Err(PlannerError::Io(_))));
    }
}
