use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::scoring::ScoreBands;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub oracle: Option<OracleConfig>,

    /// Score scale; defaults to 300-850 with a pass mark of 575
    #[serde(default)]
    pub scoring: Option<ScoreBands>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OracleConfig {
    /// Path to the exported model artifact (JSON)
    pub artifact: PathBuf,
}

impl Config {
    /// Score bands in effect, falling back to the defaults.
    pub fn effective_bands(&self) -> ScoreBands {
        self.scoring.unwrap_or_default()
    }
}
