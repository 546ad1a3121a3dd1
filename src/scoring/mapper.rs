use serde::Serialize;
use std::fmt;

use super::config::ScoreBands;

/// Loan decision derived from the credit score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Label {
    Good,
    Bad,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Good => f.write_str("Good"),
            Label::Bad => f.write_str("Bad"),
        }
    }
}

/// Outcome of one prediction request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub probability_good: f64,
    pub credit_score: u32,
    pub label: Label,
}

/// Rescale a probability in [0, 1] linearly onto the configured score range.
pub fn raw_score(probability_good: f64, bands: &ScoreBands) -> f64 {
    let min = f64::from(bands.min_score);
    let span = f64::from(bands.max_score) - min;
    min + span * probability_good
}

/// Displayed credit score: the raw score rounded to the nearest integer,
/// halves to even.
pub fn credit_score(probability_good: f64, bands: &ScoreBands) -> u32 {
    raw_score(probability_good, bands).round_ties_even() as u32
}

/// Threshold is inclusive and applies to the unrounded score.
pub fn classify(raw_score: f64, bands: &ScoreBands) -> Label {
    if raw_score >= f64::from(bands.good_threshold) {
        Label::Good
    } else {
        Label::Bad
    }
}

/// Map an oracle probability onto a score and label.
///
/// Rounding only affects the displayed score; the label is decided on the
/// raw score, so 574.6 shows as 575 and is still Bad.
pub fn map_probability(probability_good: f64, bands: &ScoreBands) -> PredictionResult {
    let raw = raw_score(probability_good, bands);
    PredictionResult {
        probability_good,
        credit_score: raw.round_ties_even() as u32,
        label: classify(raw, bands),
    }
}
