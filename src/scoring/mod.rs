pub mod config;
pub mod mapper;
pub mod validation;

pub use config::*;
pub use mapper::{classify, credit_score, map_probability, raw_score, Label, PredictionResult};
pub use validation::validate_bands;
