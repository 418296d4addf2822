//! Gradient-boosted regression trees for binary classification.
//!
//! Each round fits a depth-limited tree to the second-order expansion of the
//! logistic loss; leaf weights are `-G / (H + lambda)` scaled by the learning
//! rate. Splits test `x < threshold` and send the rest right.

use serde::{Deserialize, Serialize};

use super::PredictionError;
use crate::config::ModelConfig;

const PROBABILITY_EPSILON: f64 = 1e-6;
const MIN_HESSIAN: f64 = 1e-16;
const MIN_SPLIT_GAIN: f64 = 1e-12;

pub trait BinaryClassifier {
    fn fit(&mut self, features: &[Vec<f64>], labels: &[bool]) -> Result<(), PredictionError>;

    /// Probability of the positive class.
    fn predict_proba(&self, features: &[f64]) -> f64;

    fn predict(&self, features: &[f64]) -> bool {
        self.predict_proba(features) >= 0.5
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostingParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    /// L2 regularisation on leaf weights.
    pub lambda: f64,
    pub min_child_weight: f64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 3,
            learning_rate: 0.1,
            lambda: 1.0,
            min_child_weight: 1.0,
        }
    }
}

impl From<&ModelConfig> for BoostingParams {
    fn from(config: &ModelConfig) -> Self {
        Self {
            n_estimators: config.n_estimators,
            max_depth: config.max_depth,
            learning_rate: config.learning_rate,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Nodes stored in an arena; index 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    pub fn evaluate(&self, features: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { value }) => return *value,
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = features.get(*feature).copied().unwrap_or(0.0);
                    index = if x < *threshold { *left } else { *right };
                }
                None => return 0.0,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedClassifier {
    params: BoostingParams,
    /// Log-odds of the training prior.
    base_margin: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoostedClassifier {
    pub fn new(params: BoostingParams) -> Self {
        Self {
            params,
            base_margin: 0.0,
            trees: Vec::new(),
        }
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    fn margin(&self, features: &[f64]) -> f64 {
        self.base_margin
            + self
                .trees
                .iter()
                .map(|tree| tree.evaluate(features))
                .sum::<f64>()
    }
}

impl BinaryClassifier for GradientBoostedClassifier {
    fn fit(&mut self, features: &[Vec<f64>], labels: &[bool]) -> Result<(), PredictionError> {
        if features.is_empty() {
            return Err(PredictionError::Training("no training rows".to_string()));
        }
        if features.len() != labels.len() {
            return Err(PredictionError::Training(format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }

        let targets: Vec<f64> = labels.iter().map(|&y| if y { 1.0 } else { 0.0 }).collect();
        let prior = (targets.iter().sum::<f64>() / targets.len() as f64)
            .clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON);

        self.base_margin = (prior / (1.0 - prior)).ln();
        self.trees.clear();

        let mut margins = vec![self.base_margin; features.len()];
        let all_rows: Vec<usize> = (0..features.len()).collect();

        for _ in 0..self.params.n_estimators {
            let (gradients, hessians): (Vec<f64>, Vec<f64>) = margins
                .iter()
                .zip(&targets)
                .map(|(&margin, &y)| {
                    let p = sigmoid(margin);
                    (p - y, (p * (1.0 - p)).max(MIN_HESSIAN))
                })
                .unzip();

            let mut builder = TreeBuilder {
                features,
                gradients: &gradients,
                hessians: &hessians,
                params: &self.params,
                nodes: Vec::new(),
            };
            builder.grow(all_rows.clone(), 0);
            let tree = RegressionTree {
                nodes: builder.nodes,
            };

            for (margin, row) in margins.iter_mut().zip(features) {
                *margin += tree.evaluate(row);
            }
            self.trees.push(tree);
        }

        Ok(())
    }

    fn predict_proba(&self, features: &[f64]) -> f64 {
        sigmoid(self.margin(features))
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

struct TreeBuilder<'a> {
    features: &'a [Vec<f64>],
    gradients: &'a [f64],
    hessians: &'a [f64],
    params: &'a BoostingParams,
    nodes: Vec<TreeNode>,
}

impl TreeBuilder<'_> {
    fn grow(&mut self, rows: Vec<usize>, depth: usize) -> usize {
        let g: f64 = rows.iter().map(|&i| self.gradients[i]).sum();
        let h: f64 = rows.iter().map(|&i| self.hessians[i]).sum();
        let leaf = TreeNode::Leaf {
            value: -g / (h + self.params.lambda) * self.params.learning_rate,
        };

        if depth >= self.params.max_depth || rows.len() < 2 {
            return self.push(leaf);
        }

        let Some(split) = self.best_split(&rows, g, h) else {
            return self.push(leaf);
        };

        let features = self.features;
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&i| features[i][split.feature] < split.threshold);

        // Reserve the slot so the parent precedes its children.
        let index = self.push(leaf);
        let left = self.grow(left_rows, depth + 1);
        let right = self.grow(right_rows, depth + 1);
        self.nodes[index] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        index
    }

    fn push(&mut self, node: TreeNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn best_split(&self, rows: &[usize], g: f64, h: f64) -> Option<SplitCandidate> {
        let lambda = self.params.lambda;
        let min_child = self.params.min_child_weight;
        let parent_score = g * g / (h + lambda);
        let n_features = self.features[rows[0]].len();

        let mut best: Option<SplitCandidate> = None;
        let mut order = rows.to_vec();

        for feature in 0..n_features {
            order.sort_by(|&a, &b| {
                self.features[a][feature].total_cmp(&self.features[b][feature])
            });

            let mut gl = 0.0;
            let mut hl = 0.0;
            for pair in order.windows(2) {
                let (current, next) = (pair[0], pair[1]);
                gl += self.gradients[current];
                hl += self.hessians[current];

                let x = self.features[current][feature];
                let x_next = self.features[next][feature];
                if x == x_next {
                    continue;
                }

                let (gr, hr) = (g - gl, h - hl);
                if hl < min_child || hr < min_child {
                    continue;
                }

                let gain = gl * gl / (hl + lambda) + gr * gr / (hr + lambda) - parent_score;
                if gain > MIN_SPLIT_GAIN && best.as_ref().map_or(true, |b| gain > b.gain) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: (x + x_next) / 2.0,
                        gain,
                    });
                }
            }
        }

        best
    }
}
