//! Random forest classifier exported as flat node arrays per tree.
//!
//! Node 0 is the root of every tree. A split sends a row to `left` when
//! `x[feature] <= threshold`. Leaves hold per-class weights (counts or
//! fractions); a tree's vote is its leaf weights normalised to sum to one and
//! the forest probability is the mean vote.

use serde::{Deserialize, Serialize};

use super::{check_classes, check_feature_names, check_width, positive_index, Classifier, Label};
use crate::error::PredictionError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub feature_names: Vec<String>,
    pub classes: Vec<Label>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positive_class: Option<Label>,
    pub trees: Vec<Tree>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split { feature: usize, threshold: f64, left: usize, right: usize },
    Leaf { value: Vec<f64> },
}

impl Tree {
    /// Children always point forward, so the walk ends within `nodes.len()` steps.
    fn leaf(&self, x: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Split { feature, threshold, left, right } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { value } => return value,
            }
        }
    }

    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".into());
        }
        let len = self.nodes.len();
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split { feature, threshold, left, right } => {
                    if *feature >= n_features {
                        return Err(format!("node {i} splits on feature {feature} of {n_features}"));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {i} threshold is not finite"));
                    }
                    for child in [left, right] {
                        if *child <= i || *child >= len {
                            return Err(format!("node {i} child {child} out of range"));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(format!("leaf {i} has {} weights for {n_classes} classes", value.len()));
                    }
                    if value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                        return Err(format!("leaf {i} has a negative or non-finite weight"));
                    }
                    if value.iter().sum::<f64>() <= 0.0 {
                        return Err(format!("leaf {i} has zero total weight"));
                    }
                }
            }
        }
        Ok(())
    }
}

impl RandomForest {
    pub(crate) fn validate(&self) -> Result<(), String> {
        check_feature_names(&self.feature_names)?;
        check_classes(&self.classes, self.positive_class)?;
        if self.trees.is_empty() {
            return Err("forest has no trees".into());
        }
        for (t, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_names.len(), self.classes.len()).map_err(|e| format!("tree {t}: {e}"))?;
        }
        Ok(())
    }
}

impl Classifier for RandomForest {
    fn classes(&self) -> &[Label] {
        &self.classes
    }

    fn positive_index(&self) -> usize {
        positive_index(&self.classes, self.positive_class)
    }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, PredictionError> {
        check_width(self.feature_names.len(), x)?;
        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let leaf = tree.leaf(x);
            let total: f64 = leaf.iter().sum();
            for (p, w) in proba.iter_mut().zip(leaf) {
                *p += w / total;
            }
        }
        let n = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n);
        Ok(proba)
    }
}
