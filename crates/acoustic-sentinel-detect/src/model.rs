//! Predictive models.
//!
//! [`DecisionForest`] is the production model: an ensemble of binary
//! decision trees stored as flat node arrays in a JSON artifact, with a
//! default artifact compiled into the crate. The [`stub`] module provides
//! deterministic test doubles.

use std::path::Path;

use acoustic_sentinel_core::{DetectionLabel, FeatureVector, ModelError, PredictiveModel};
use serde::{Deserialize, Serialize};

/// Forest artifact shipped with the crate.
pub const DEFAULT_FOREST_JSON: &str = include_str!("../models/default_forest.json");

/// One node of a flattened decision tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Go to `left` when `features[feature] <= threshold`, else `right`.
    Split {
        /// Index into [`FeatureVector::to_array`].
        feature: usize,
        /// Split threshold.
        threshold: f32,
        /// Node index for the `<=` branch.
        left: usize,
        /// Node index for the `>` branch.
        right: usize,
    },
    /// Terminal node.
    Leaf {
        /// 0 = normal, 1 = anomaly.
        class: u8,
    },
}

/// A binary decision tree. Node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Flattened nodes; children always have a larger index than their parent.
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Walk the tree from the root to a leaf.
    ///
    /// Assumes the tree has been validated.
    #[must_use]
    pub fn predict(&self, features: &[f32; FeatureVector::LEN]) -> DetectionLabel {
        let mut idx = 0;
        while let Some(node) = self.nodes.get(idx) {
            match *node {
                TreeNode::Leaf { class } => return DetectionLabel::from(class != 0),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.get(feature).copied().unwrap_or(0.0);
                    idx = if value <= threshold { left } else { right };
                }
            }
        }
        DetectionLabel::Normal
    }

    fn validate(&self, tree_idx: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::InvalidStructure(format!(
                "tree {tree_idx} has no nodes"
            )));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Leaf { class } if class > 1 => {
                    return Err(ModelError::InvalidStructure(format!(
                        "tree {tree_idx} node {idx}: class {class} is not 0 or 1"
                    )));
                }
                TreeNode::Leaf { .. } => {}
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= FeatureVector::LEN {
                        return Err(ModelError::InvalidStructure(format!(
                            "tree {tree_idx} node {idx}: feature {feature} out of range"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(ModelError::InvalidStructure(format!(
                            "tree {tree_idx} node {idx}: non-finite threshold"
                        )));
                    }
                    for child in [left, right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(ModelError::InvalidStructure(format!(
                                "tree {tree_idx} node {idx}: child {child} must be in ({idx}, {})",
                                self.nodes.len()
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Majority-vote ensemble of decision trees.
///
/// Features are ordered `[low_delta, high_delta, dominant_hz]`. A label is
/// `Anomaly` only when strictly more than half of the trees vote for it, so
/// ties resolve to `Normal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionForest {
    /// Artifact name.
    #[serde(default)]
    pub name: String,
    /// Feature names, informational.
    #[serde(default)]
    pub features: Vec<String>,
    /// Ensemble members.
    pub trees: Vec<DecisionTree>,
}

impl DecisionForest {
    /// Build a forest from trees, validating the structure.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidStructure`] if the forest is unusable.
    pub fn new(trees: Vec<DecisionTree>) -> Result<Self, ModelError> {
        let forest = Self {
            name: String::new(),
            features: Vec::new(),
            trees,
        };
        forest.validate()?;
        Ok(forest)
    }

    /// The forest compiled into the crate.
    ///
    /// # Errors
    ///
    /// Fails only if the embedded artifact is corrupt.
    pub fn embedded() -> Result<Self, ModelError> {
        Self::from_json_str(DEFAULT_FOREST_JSON)
    }

    /// Parse and validate a JSON artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Malformed`] for bad JSON and
    /// [`ModelError::InvalidStructure`] for an unusable forest.
    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        let forest: Self = serde_json::from_str(json)?;
        forest.validate()?;
        Ok(forest)
    }

    /// Load and validate a JSON artifact from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::FileRead`] if the file cannot be read, otherwise
    /// see [`DecisionForest::from_json_str`].
    pub fn from_json_file(path: &Path) -> Result<Self, ModelError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ModelError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Check the forest can be evaluated.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidStructure`] describing the first problem.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::InvalidStructure(
                "forest has no trees".to_string(),
            ));
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(idx)?;
        }
        Ok(())
    }

    /// Number of trees.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// Whether the forest has no trees.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Number of trees voting `Anomaly`.
    #[must_use]
    pub fn anomaly_votes(&self, features: &FeatureVector) -> usize {
        let x = features.to_array();
        self.trees
            .iter()
            .filter(|tree| tree.predict(&x).is_anomaly())
            .count()
    }
}

impl PredictiveModel for DecisionForest {
    fn predict(&self, features: &FeatureVector) -> DetectionLabel {
        DetectionLabel::from(self.anomaly_votes(features) * 2 > self.trees.len())
    }
}

/// Deterministic test doubles.
pub mod stub {
    use std::cell::Cell;

    use super::{DetectionLabel, FeatureVector, PredictiveModel};

    /// Returns the same label for every input.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ConstantModel(pub DetectionLabel);

    impl ConstantModel {
        /// Model that never reports an anomaly.
        #[must_use]
        pub fn normal() -> Self {
            Self(DetectionLabel::Normal)
        }

        /// Model that always reports an anomaly.
        #[must_use]
        pub fn anomaly() -> Self {
            Self(DetectionLabel::Anomaly)
        }
    }

    impl PredictiveModel for ConstantModel {
        fn predict(&self, _features: &FeatureVector) -> DetectionLabel {
            self.0
        }
    }

    /// Replays a fixed label sequence, cycling when exhausted.
    ///
    /// An empty script always predicts `Normal`.
    #[derive(Debug, Clone, Default)]
    pub struct ScriptedModel {
        labels: Vec<DetectionLabel>,
        cursor: Cell<usize>,
    }

    impl ScriptedModel {
        /// Script from labels.
        #[must_use]
        pub fn new(labels: Vec<DetectionLabel>) -> Self {
            Self {
                labels,
                cursor: Cell::new(0),
            }
        }

        /// Script from `0`/`1` flags.
        #[must_use]
        pub fn from_bits(bits: &[u8]) -> Self {
            Self::new(bits.iter().map(|&b| DetectionLabel::from(b != 0)).collect())
        }

        /// Number of predictions served.
        #[must_use]
        pub fn calls(&self) -> usize {
            self.cursor.get()
        }
    }

    impl PredictiveModel for ScriptedModel {
        fn predict(&self, _features: &FeatureVector) -> DetectionLabel {
            let n = self.cursor.get();
            self.cursor.set(n + 1);
            if self.labels.is_empty() {
                return DetectionLabel::Normal;
            }
            self.labels[n % self.labels.len()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::stub::{ConstantModel, ScriptedModel};
    use super::*;

    fn fv(low: f32, high: f32, dominant_hz: f32) -> FeatureVector {
        FeatureVector {
            low,
            high,
            dominant_hz,
        }
    }

    fn stump(feature: usize, threshold: f32) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { class: 0 },
                TreeNode::Leaf { class: 1 },
            ],
        }
    }

    #[test]
    fn embedded_forest_loads() {
        let forest = DecisionForest::embedded().unwrap();
        assert_eq!(forest.len(), 3);
        assert_eq!(forest.features.len(), FeatureVector::LEN);
    }

    #[test]
    fn loads_forest_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forest.json");
        std::fs::write(&path, DEFAULT_FOREST_JSON).unwrap();
        let forest = DecisionForest::from_json_file(&path).unwrap();
        assert_eq!(forest, DecisionForest::embedded().unwrap());

        let err = DecisionForest::from_json_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ModelError::FileRead { .. }));
    }

    #[test]
    fn embedded_forest_quiet_is_normal() {
        let forest = DecisionForest::embedded().unwrap();
        assert_eq!(forest.predict(&fv(0.0, 0.0, 0.0)), DetectionLabel::Normal);
        assert_eq!(forest.predict(&fv(0.05, 0.3, 4000.0)), DetectionLabel::Normal);
    }

    #[test]
    fn embedded_forest_low_tone_is_anomaly() {
        let forest = DecisionForest::embedded().unwrap();
        assert_eq!(forest.predict(&fv(0.5, 0.2, 250.0)), DetectionLabel::Anomaly);
    }

    #[test]
    fn stump_threshold_is_inclusive_left() {
        let tree = stump(0, 1.0);
        assert_eq!(tree.predict(&[1.0, 0.0, 0.0]), DetectionLabel::Normal);
        assert_eq!(tree.predict(&[1.01, 0.0, 0.0]), DetectionLabel::Anomaly);
    }

    #[test]
    fn vote_tie_resolves_normal() {
        let forest = DecisionForest::new(vec![stump(0, 1.0), stump(1, 1.0)]).unwrap();
        let x = fv(2.0, 0.0, 0.0);
        assert_eq!(forest.anomaly_votes(&x), 1);
        assert_eq!(forest.predict(&x), DetectionLabel::Normal);
        assert_eq!(forest.predict(&fv(2.0, 2.0, 0.0)), DetectionLabel::Anomaly);
    }

    #[test]
    fn rejects_empty_forest() {
        assert!(matches!(
            DecisionForest::new(Vec::new()),
            Err(ModelError::InvalidStructure(_))
        ));
    }

    #[test]
    fn rejects_backward_child() {
        let tree = DecisionTree {
            nodes: vec![
                TreeNode::Leaf { class: 0 },
                TreeNode::Split {
                    feature: 0,
                    threshold: 0.0,
                    left: 0,
                    right: 0,
                },
            ],
        };
        assert!(DecisionForest::new(vec![tree]).is_err());
    }

    #[test]
    fn rejects_feature_out_of_range() {
        assert!(DecisionForest::new(vec![stump(3, 0.5)]).is_err());
    }

    #[test]
    fn rejects_bad_class() {
        let tree = DecisionTree {
            nodes: vec![TreeNode::Leaf { class: 2 }],
        };
        assert!(DecisionForest::new(vec![tree]).is_err());
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            DecisionForest::from_json_str("{\"trees\": 5}"),
            Err(ModelError::Malformed(_))
        ));
    }

    #[test]
    fn constant_stubs() {
        let x = fv(9.0, 9.0, 9.0);
        assert_eq!(ConstantModel::normal().predict(&x), DetectionLabel::Normal);
        assert_eq!(ConstantModel::anomaly().predict(&x), DetectionLabel::Anomaly);
    }

    #[test]
    fn scripted_stub_cycles() {
        let model = ScriptedModel::from_bits(&[1, 0]);
        let x = FeatureVector::default();
        let labels: Vec<_> = (0..3).map(|_| model.predict(&x)).collect();
        assert_eq!(
            labels,
            vec![
                DetectionLabel::Anomaly,
                DetectionLabel::Normal,
                DetectionLabel::Anomaly
            ]
        );
        assert_eq!(model.calls(), 3);
    }
}
