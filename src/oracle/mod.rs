//! The classifier behind the pipeline.
//!
//! Everything downstream of feature derivation talks to a [`ScoreOracle`].
//! [`ArtifactOracle`] is the file-backed implementation; tests substitute
//! their own.

pub mod artifact;
pub mod model;

pub use artifact::{Artifact, ArtifactOracle, FORMAT_VERSION};
pub use model::{logistic, DecisionTree, LogisticModel, Model, Node, TreeEnsemble};

use crate::error::OracleInferenceError;
use crate::features::FeatureVector;

/// A loaded binary classifier.
///
/// Implementations are immutable after construction and shared read-only
/// between requests.
pub trait ScoreOracle: Send + Sync {
    /// Probability that the applicant repays (the positive class).
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64, OracleInferenceError>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}
