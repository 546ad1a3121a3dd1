use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::error::{ConfigError, OracleInferenceError, PipelineError};
use crate::features::{derive_features, FeatureVector};
use crate::input::{RawInput, RawInputRecord};
use crate::oracle::ScoreOracle;
use crate::scoring::{map_probability, validate_bands, PredictionResult, ScoreBands};

/// Raw input -> features -> oracle probability -> credit score and label.
///
/// Holds no per-request state. Cloning is cheap and clones share the oracle,
/// so one pipeline can serve concurrent callers.
#[derive(Clone)]
pub struct ScoringPipeline {
    oracle: Arc<dyn ScoreOracle>,
    bands: ScoreBands,
}

impl ScoringPipeline {
    /// Fails if `bands` is not a usable score scale.
    pub fn new(oracle: Arc<dyn ScoreOracle>, bands: ScoreBands) -> Result<Self, ConfigError> {
        validate_bands(&bands).map_err(ConfigError::InvalidBands)?;
        Ok(Self { oracle, bands })
    }

    pub fn bands(&self) -> &ScoreBands {
        &self.bands
    }

    pub fn oracle(&self) -> &dyn ScoreOracle {
        self.oracle.as_ref()
    }

    /// Score one application.
    pub fn predict(&self, input: &RawInput) -> Result<PredictionResult, PipelineError> {
        let features = derive_features(input).map_err(|e| {
            warn!(fields = ?e.fields(), "Rejected application");
            e
        })?;
        let probability_good = self.ask_oracle(&features)?;
        let result = map_probability(probability_good, &self.bands);
        debug!(
            probability_good,
            credit_score = result.credit_score,
            label = %result.label,
            "Scored application"
        );
        Ok(result)
    }

    /// Score a loosely-typed record, reporting missing fields by name.
    pub fn predict_record(&self, record: RawInputRecord) -> Result<PredictionResult, PipelineError> {
        let input = record.into_raw_input()?;
        self.predict(&input)
    }

    fn ask_oracle(&self, features: &FeatureVector) -> Result<f64, PipelineError> {
        let probability = self.oracle.predict_proba(features).map_err(|e| {
            error!(error = %e, oracle = %self.oracle.describe(), "Oracle rejected feature vector");
            e
        })?;
        if !(0.0..=1.0).contains(&probability) {
            error!(probability, "Oracle returned a value outside [0, 1]");
            return Err(OracleInferenceError::InvalidProbability(probability).into());
        }
        Ok(probability)
    }
}
