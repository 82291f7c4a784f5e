//! Trained mood classifier and its label encoder.
//!
//! The model is trained offline and shipped as a JSON document:
//!
//! ```json
//! {
//!   "labels": ["aggressivo", "altro", "energetico", "felice", "triste"],
//!   "classifier": {
//!     "n_features": 10,
//!     "trees": [
//!       { "nodes": [
//!         { "feature": 0, "threshold": 0.5, "left": 1, "right": 2 },
//!         { "value": [0.0, 0.0, 0.0, 0.0, 12.0] },
//!         { "value": [0.0, 1.0, 0.0, 9.0, 0.0] }
//!       ] }
//!     ]
//!   }
//! }
//! ```
//!
//! `labels` must be sorted and unique: class id `i` means `labels[i]`.
//! Split nodes send a sample left when `x[feature] <= threshold`, and child
//! indices always point forward, so every walk ends at a leaf. Leaf values are
//! per-class weights; the ensemble averages the normalized leaf distributions
//! and predicts the first class with the highest mean.

use crate::encoder::LabelEncoder;
use crate::error::{RecommendError, RecommendResult};
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Anything that maps a feature vector to a class id.
pub trait MoodClassifier: fmt::Debug + Send + Sync {
    /// Expected feature vector width
    fn n_features(&self) -> usize;

    /// Number of classes the classifier can emit
    fn n_classes(&self) -> usize;

    /// # Errors
    ///
    /// [`RecommendError::FeatureVectorLength`] when `features` has the wrong width.
    fn predict(&self, features: &[f64]) -> RecommendResult<usize>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn validate(&self, n_features: usize, n_classes: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split { feature, threshold, left, right } => {
                    if *feature >= n_features {
                        return Err(format!("node {index} splits on feature {feature} of {n_features}"));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {index} has a non-finite threshold"));
                    }
                    for child in [*left, *right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(format!("node {index} has invalid child {child}"));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(format!(
                            "leaf {index} has {} class weights, expected {n_classes}",
                            value.len()
                        ));
                    }
                    if value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                        return Err(format!("leaf {index} has a negative or non-finite weight"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Leaf reached by `features`. Only called on validated trees with a
    /// correctly sized vector.
    fn leaf(&self, features: &[f64]) -> &[f64] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Split { feature, threshold, left, right } => {
                    index = if features[*feature] <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { value } => return value,
            }
        }
    }
}

/// Ensemble of decision trees voting by averaged class probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestClassifier {
    n_features: usize,
    trees: Vec<DecisionTree>,
    #[serde(skip)]
    n_classes: usize,
}

impl ForestClassifier {
    /// Forest over `n_features` inputs emitting `n_classes` classes,
    /// validated as [`ForestClassifier::validated`] does for loaded models.
    pub fn new(n_features: usize, trees: Vec<DecisionTree>, n_classes: usize) -> Result<Self> {
        Self { n_features, trees, n_classes: 0 }.validated(n_classes)
    }

    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Check every tree against the feature width and class count.
    pub fn validated(mut self, n_classes: usize) -> Result<Self> {
        if self.trees.is_empty() {
            anyhow::bail!("forest has no trees");
        }
        if n_classes == 0 {
            anyhow::bail!("forest needs at least one class");
        }
        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, n_classes)
                .map_err(|reason| anyhow::anyhow!("tree {index}: {reason}"))?;
        }
        self.n_classes = n_classes;
        Ok(self)
    }
}

impl MoodClassifier for ForestClassifier {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict(&self, features: &[f64]) -> RecommendResult<usize> {
        if features.len() != self.n_features {
            return Err(RecommendError::FeatureVectorLength {
                expected: self.n_features,
                actual: features.len(),
            });
        }

        let mut votes = vec![0.0; self.n_classes];
        for tree in &self.trees {
            let leaf = tree.leaf(features);
            let total: f64 = leaf.iter().sum();
            if total > 0.0 {
                for (vote, weight) in votes.iter_mut().zip(leaf) {
                    *vote += weight / total;
                }
            }
        }

        // First maximum wins ties.
        let mut best = 0;
        for (class, vote) in votes.iter().enumerate() {
            if *vote > votes[best] {
                best = class;
            }
        }
        Ok(best)
    }
}

/// On-disk layout of a mood model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub labels: Vec<String>,
    pub classifier: ForestClassifier,
}

/// A classifier paired with the encoder that names its classes.
#[derive(Debug)]
pub struct MoodModel {
    classifier: Box<dyn MoodClassifier>,
    labels: LabelEncoder,
}

impl MoodModel {
    /// Pair a classifier with its label vocabulary.
    ///
    /// The classifier must emit exactly as many classes as there are labels.
    pub fn new(classifier: Box<dyn MoodClassifier>, labels: LabelEncoder) -> Result<Self> {
        if classifier.n_classes() != labels.len() {
            anyhow::bail!(
                "classifier emits {} classes but the label encoder knows {}",
                classifier.n_classes(),
                labels.len()
            );
        }
        Ok(Self { classifier, labels })
    }

    pub fn from_file(file: ModelFile) -> Result<Self> {
        let mut sorted = file.labels.clone();
        sorted.sort();
        sorted.dedup();
        if sorted != file.labels {
            anyhow::bail!("model labels must be sorted and unique, got {:?}", file.labels);
        }

        let labels = LabelEncoder::fit("mood", &file.labels);
        let forest = file.classifier.validated(labels.len())?;
        debug!(
            "Mood model: {} trees, {} features, labels {:?}",
            forest.trees.len(),
            forest.n_features,
            labels.classes()
        );
        Self::new(Box::new(forest), labels)
    }

    /// Load a JSON model file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open mood model at {}", path.display()))?;
        let parsed: ModelFile = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Mood model at {} is not valid JSON", path.display()))?;
        let model = Self::from_file(parsed)
            .with_context(|| format!("Mood model at {} failed validation", path.display()))?;
        info!("Loaded mood model with {} labels from {}", model.labels.len(), path.display());
        Ok(model)
    }

    #[must_use]
    pub fn classifier(&self) -> &dyn MoodClassifier {
        self.classifier.as_ref()
    }

    #[must_use]
    pub fn labels(&self) -> &LabelEncoder {
        &self.labels
    }

    /// Label string for a class id.
    pub fn decode(&self, class_id: usize) -> RecommendResult<&str> {
        self.labels
            .decode(class_id)
            .ok_or(RecommendError::UnknownClass(class_id))
    }
}
