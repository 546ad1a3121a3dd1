pub mod deriver;
pub mod vector;

pub use deriver::{derive_features, EPSILON};
pub use vector::{Feature, FeatureValue, FeatureVector, FEATURE_COUNT};
