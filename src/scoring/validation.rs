use super::config::ScoreBands;

/// Validate score bands at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_bands(bands: &ScoreBands) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if bands.min_score >= bands.max_score {
        errors.push(format!(
            "scoring.min_score: {} must be below max_score {}",
            bands.min_score, bands.max_score
        ));
    }

    if bands.good_threshold < bands.min_score {
        errors.push(format!(
            "scoring.good_threshold: {} is below min_score {}",
            bands.good_threshold, bands.min_score
        ));
    }

    if bands.good_threshold > bands.max_score {
        errors.push(format!(
            "scoring.good_threshold: {} is above max_score {}",
            bands.good_threshold, bands.max_score
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
