//! Marginal tax bands

use serde::{Deserialize, Serialize};

use crate::error::{require_non_negative, CalcError, Result};

/// A band starting at `threshold`, taxed at `rate_percent` up to the next band's threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxBand {
    pub threshold: f64,
    pub rate_percent: f64,
}

impl TaxBand {
    pub const fn new(threshold: f64, rate_percent: f64) -> Self {
        Self { threshold, rate_percent }
    }
}

/// Bands must be non-empty, non-negative and strictly ascending by threshold
pub fn validate_bands(bands: &[TaxBand]) -> Result<()> {
    if bands.is_empty() {
        return Err(CalcError::invalid("bands", "table has no bands"));
    }
    for band in bands {
        require_non_negative("band.threshold", band.threshold)?;
        require_non_negative("band.rate_percent", band.rate_percent)?;
    }
    if let Some(pair) = bands.windows(2).find(|w| w[1].threshold <= w[0].threshold) {
        return Err(CalcError::invalid(
            "bands",
            format!("thresholds not ascending: {} then {}", pair[0].threshold, pair[1].threshold),
        ));
    }
    Ok(())
}
