use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_SCORE: u32 = 300;
pub const DEFAULT_MAX_SCORE: u32 = 850;
pub const DEFAULT_GOOD_THRESHOLD: u32 = 575;

/// Credit score scale and decision threshold.
///
/// Every key is optional in the config file and falls back to the
/// conventional 300-850 scale with a pass mark of 575.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   min_score: 300
///   max_score: 850
///   good_threshold: 600
/// ```
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ScoreBands {
    /// Score given to a probability of 0
    #[serde(default = "default_min_score")]
    pub min_score: u32,

    /// Score given to a probability of 1
    #[serde(default = "default_max_score")]
    pub max_score: u32,

    /// Lowest score labelled Good (inclusive)
    #[serde(default = "default_good_threshold")]
    pub good_threshold: u32,
}

fn default_min_score() -> u32 {
    DEFAULT_MIN_SCORE
}

fn default_max_score() -> u32 {
    DEFAULT_MAX_SCORE
}

fn default_good_threshold() -> u32 {
    DEFAULT_GOOD_THRESHOLD
}

impl Default for ScoreBands {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            max_score: DEFAULT_MAX_SCORE,
            good_threshold: DEFAULT_GOOD_THRESHOLD,
        }
    }
}
