//! Loan application scoring.
//!
//! A [`RawInput`](input::RawInput) is validated and turned into the ordered
//! [`FeatureVector`](features::FeatureVector) a trained classifier expects;
//! the classifier's probability of repayment is mapped onto a credit score
//! and a Good/Bad label. [`ScoringPipeline`](pipeline::ScoringPipeline) is
//! the single entry point.

pub mod config;
pub mod error;
pub mod features;
pub mod input;
pub mod oracle;
pub mod output;
pub mod pipeline;
pub mod prompt;
pub mod scoring;

pub use error::{
    ConfigError, FieldError, OracleInferenceError, OracleLoadError, PipelineError,
    ValidationError,
};
pub use pipeline::ScoringPipeline;
