use serde::{Deserialize, Serialize};

use crate::error::OracleLoadError;

/// Standard logistic function.
pub fn logistic(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}

/// Decision function stored in a model artifact.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Model {
    GradientBoosting(TreeEnsemble),
    Logistic(LogisticModel),
}

impl Model {
    /// Probability of the positive class for an encoded row.
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        match self {
            Model::GradientBoosting(ensemble) => logistic(ensemble.margin(row)),
            Model::Logistic(model) => logistic(model.margin(row)),
        }
    }

    /// Structural checks run once at load time so that evaluation cannot
    /// index out of bounds or loop.
    pub fn validate(&self, width: usize) -> Result<(), OracleLoadError> {
        match self {
            Model::GradientBoosting(ensemble) => ensemble.validate(width),
            Model::Logistic(model) => model.validate(width),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Model::GradientBoosting(ensemble) => format!(
                "gradient boosting ({} trees, learning rate {})",
                ensemble.trees.len(),
                ensemble.learning_rate
            ),
            Model::Logistic(model) => {
                format!("logistic regression ({} coefficients)", model.coefficients.len())
            }
        }
    }
}

/// Binary-deviance gradient boosted trees.
///
/// margin = `init_score + learning_rate * sum(leaf of each tree)`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TreeEnsemble {
    pub learning_rate: f64,
    #[serde(default)]
    pub init_score: f64,
    pub trees: Vec<DecisionTree>,
}

impl TreeEnsemble {
    pub fn margin(&self, row: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|tree| tree.evaluate(row)).sum();
        self.init_score + self.learning_rate * sum
    }

    fn validate(&self, width: usize) -> Result<(), OracleLoadError> {
        if !self.learning_rate.is_finite() || !self.init_score.is_finite() {
            return Err(malformed("learning_rate and init_score must be finite"));
        }
        if self.trees.is_empty() {
            return Err(malformed("ensemble has no trees"));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(width)
                .map_err(|reason| malformed(format!("trees[{}]: {}", i, reason)))?;
        }
        Ok(())
    }
}

/// Regression tree stored as a flat node list; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DecisionTree {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// Go to `left` when `row[feature] <= threshold`, otherwise to `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

impl DecisionTree {
    pub fn evaluate(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[feature] <= threshold { left } else { right };
                }
            }
        }
    }

    // Children must point forward, which rules out cycles.
    fn validate(&self, width: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                Node::Leaf(value) if !value.is_finite() => {
                    return Err(format!("nodes[{}]: leaf value is not finite", i));
                }
                Node::Leaf(_) => {}
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= width {
                        return Err(format!(
                            "nodes[{}]: feature {} out of range (width {})",
                            i, feature, width
                        ));
                    }
                    if threshold.is_nan() {
                        return Err(format!("nodes[{}]: threshold is NaN", i));
                    }
                    for child in [left, right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(format!("nodes[{}]: invalid child index {}", i, child));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// margin = `intercept + sum(coefficients[i] * row[i])`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogisticModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LogisticModel {
    pub fn margin(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }

    fn validate(&self, width: usize) -> Result<(), OracleLoadError> {
        if self.coefficients.len() != width {
            return Err(malformed(format!(
                "logistic model has {} coefficients for {} columns",
                self.coefficients.len(),
                width
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(malformed("logistic coefficients must be finite"));
        }
        Ok(())
    }
}

fn malformed(reason: impl Into<String>) -> OracleLoadError {
    OracleLoadError::MalformedModel {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, low: f64, high: f64) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                Node::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                Node::Leaf(low),
                Node::Leaf(high),
            ],
        }
    }

    #[test]
    fn test_logistic_midpoint() {
        assert_eq!(logistic(0.0), 0.5);
        assert!(logistic(40.0) > 0.999_999);
        assert!(logistic(-40.0) < 1e-6);
    }

    #[test]
    fn test_split_goes_left_on_equal() {
        let tree = stump(0, 1.0, -1.0, 1.0);
        assert_eq!(tree.evaluate(&[1.0]), -1.0);
        assert_eq!(tree.evaluate(&[1.01]), 1.0);
    }

    #[test]
    fn test_ensemble_margin() {
        let ensemble = TreeEnsemble {
            learning_rate: 0.5,
            init_score: 0.25,
            trees: vec![stump(0, 0.0, -2.0, 2.0), stump(1, 10.0, 1.0, 3.0)],
        };
        // 0.25 + 0.5 * (2.0 + 1.0)
        assert_eq!(ensemble.margin(&[1.0, 5.0]), 1.75);
    }

    #[test]
    fn test_rejects_backward_child() {
        let tree = DecisionTree {
            nodes: vec![
                Node::Split {
                    feature: 0,
                    threshold: 0.0,
                    left: 0,
                    right: 1,
                },
                Node::Leaf(0.0),
            ],
        };
        let model = Model::GradientBoosting(TreeEnsemble {
            learning_rate: 0.1,
            init_score: 0.0,
            trees: vec![tree],
        });
        let err = model.validate(1).unwrap_err();
        assert!(err.to_string().contains("trees[0]: nodes[0]: invalid child index 0"));
    }

    #[test]
    fn test_rejects_feature_out_of_range() {
        let model = Model::GradientBoosting(TreeEnsemble {
            learning_rate: 0.1,
            init_score: 0.0,
            trees: vec![stump(14, 0.0, 0.0, 0.0)],
        });
        assert!(model.validate(14).is_err());
        assert!(model.validate(15).is_ok());
    }

    #[test]
    fn test_rejects_empty_ensemble() {
        let model = Model::GradientBoosting(TreeEnsemble {
            learning_rate: 0.1,
            init_score: 0.0,
            trees: vec![],
        });
        assert!(model.validate(1).is_err());
    }

    #[test]
    fn test_logistic_width_mismatch() {
        let model = Model::Logistic(LogisticModel {
            intercept: 0.0,
            coefficients: vec![1.0, 2.0],
        });
        assert!(model.validate(3).is_err());
        assert!(model.validate(2).is_ok());
    }

    #[test]
    fn test_model_json_shape() {
        let json = r#"{
            "kind": "gradient_boosting",
            "learning_rate": 0.1,
            "trees": [
                {"nodes": [
                    {"split": {"feature": 0, "threshold": 0.5, "left": 1, "right": 2}},
                    {"leaf": -1.0},
                    {"leaf": 1.0}
                ]}
            ]
        }"#;
        let model: Model = serde_json::from_str(json).unwrap();
        match &model {
            Model::GradientBoosting(ensemble) => {
                assert_eq!(ensemble.init_score, 0.0);
                assert_eq!(ensemble.trees[0], stump(0, 0.5, -1.0, 1.0));
            }
            other => panic!("unexpected model {:?}", other),
        }
    }
}
