//! Banded tax evaluation with surcharge and registration fee

use log::debug;
use serde::{Deserialize, Serialize};

use super::bands::{validate_bands, TaxBand};
use crate::error::{require_non_negative, Result};
use crate::money::ratio;

/// Portion of a value falling in one band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandSlice {
    pub start: f64,
    /// Last amount in the band (`next threshold − 1`); `None` for the top band
    pub end: Option<f64>,
    pub rate_percent: f64,
    pub value_in_band: f64,
    pub tax_in_band: f64,
}

/// Banded tax on a value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandTaxResult {
    /// One slice per band that starts below the value
    pub per_band: Vec<BandSlice>,
    pub total_tax: f64,
}

impl BandTaxResult {
    /// `total_tax / value`; `None` for a zero value
    pub fn effective_rate(&self, value: f64) -> Option<f64> {
        ratio(self.total_tax, value)
    }
}

/// Registration fee charged on top of banded tax
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RegistrationFee {
    Fixed { amount: f64 },
    /// Percentage of the value, optionally capped
    Percentage { rate_percent: f64, cap: Option<f64> },
}

impl RegistrationFee {
    pub fn validate(&self) -> Result<()> {
        match self {
            RegistrationFee::Fixed { amount } => require_non_negative("registration_fee.amount", *amount),
            RegistrationFee::Percentage { rate_percent, cap } => {
                require_non_negative("registration_fee.rate_percent", *rate_percent)?;
                match cap {
                    Some(cap) => require_non_negative("registration_fee.cap", *cap),
                    None => Ok(()),
                }
            }
        }
    }

    pub fn amount_for(&self, value: f64) -> f64 {
        match self {
            RegistrationFee::Fixed { amount } => *amount,
            RegistrationFee::Percentage { rate_percent, cap } => {
                let fee = value * rate_percent / 100.0;
                match cap {
                    Some(cap) => fee.min(*cap),
                    None => fee,
                }
            }
        }
    }
}

/// Additive charges applied after the banded tax
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxModifiers {
    /// Flat rate on the whole value, e.g. an additional-property surcharge
    #[serde(default)]
    pub surcharge_rate_percent: f64,

    #[serde(default)]
    pub registration_fee: Option<RegistrationFee>,
}

/// Banded tax plus modifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyTaxResult {
    pub value: f64,
    pub banded: BandTaxResult,
    pub surcharge: f64,
    pub registration_fee: f64,
    pub total: f64,
    /// `total / value`; `None` for a zero value
    pub effective_rate: Option<f64>,
}

/// Marginal tax on `value` across `bands`
pub fn evaluate(value: f64, bands: &[TaxBand]) -> Result<BandTaxResult> {
    require_non_negative("value", value)?;
    validate_bands(bands)?;

    let mut per_band = Vec::with_capacity(bands.len());
    let mut total_tax = 0.0;

    for (i, band) in bands.iter().enumerate() {
        let start = band.threshold;
        if start >= value {
            break;
        }

        let end = bands.get(i + 1).map(|next| next.threshold - 1.0);
        let value_in_band = match end {
            Some(end) => (value - start).clamp(0.0, end - start + 1.0),
            None => value - start,
        };
        let tax_in_band = value_in_band * band.rate_percent / 100.0;
        total_tax += tax_in_band;

        per_band.push(BandSlice {
            start,
            end,
            rate_percent: band.rate_percent,
            value_in_band,
            tax_in_band,
        });
    }

    Ok(BandTaxResult { per_band, total_tax })
}

/// Banded tax on `value` plus surcharge and registration fee
pub fn evaluate_with_modifiers(
    value: f64,
    bands: &[TaxBand],
    modifiers: &TaxModifiers,
) -> Result<PropertyTaxResult> {
    require_non_negative("surcharge_rate_percent", modifiers.surcharge_rate_percent)?;
    if let Some(fee) = &modifiers.registration_fee {
        fee.validate()?;
    }

    let banded = evaluate(value, bands)?;
    let surcharge = value * modifiers.surcharge_rate_percent / 100.0;
    let registration_fee = modifiers
        .registration_fee
        .as_ref()
        .map(|fee| fee.amount_for(value))
        .unwrap_or(0.0);
    let total = banded.total_tax + surcharge + registration_fee;

    debug!(
        "tax on {:.2}: banded {:.2} surcharge {:.2} fee {:.2}",
        value, banded.total_tax, surcharge, registration_fee
    );

    Ok(PropertyTaxResult {
        value,
        banded,
        surcharge,
        registration_fee,
        total,
        effective_rate: ratio(total, value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalcError;
    use approx::assert_abs_diff_eq;

    fn bands() -> Vec<TaxBand> {
        vec![
            TaxBand::new(0.0, 0.0),
            TaxBand::new(125_000.0, 2.0),
            TaxBand::new(250_000.0, 5.0),
        ]
    }

    #[test]
    fn test_value_in_second_band() {
        let result = evaluate(200_000.0, &bands()).unwrap();

        assert_abs_diff_eq!(result.total_tax, 1_500.0, epsilon = 1e-9);
        assert_eq!(result.per_band.len(), 2);
        assert_eq!(result.per_band[0].value_in_band, 125_000.0);
        assert_eq!(result.per_band[0].end, Some(124_999.0));
        assert_eq!(result.per_band[1].value_in_band, 75_000.0);
        assert_abs_diff_eq!(result.effective_rate(200_000.0).unwrap(), 0.0075, epsilon = 1e-12);
    }

    #[test]
    fn test_value_in_top_band() {
        let result = evaluate(400_000.0, &bands()).unwrap();

        assert_eq!(result.per_band.len(), 3);
        assert_eq!(result.per_band[2].end, None);
        assert_eq!(result.per_band[2].value_in_band, 150_000.0);
        assert_abs_diff_eq!(result.total_tax, 2_500.0 + 7_500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_value_on_threshold() {
        let result = evaluate(125_000.0, &bands()).unwrap();
        assert_eq!(result.per_band.len(), 1);
        assert_eq!(result.total_tax, 0.0);
    }

    #[test]
    fn test_zero_value() {
        let result = evaluate(0.0, &bands()).unwrap();
        assert!(result.per_band.is_empty());
        assert_eq!(result.total_tax, 0.0);
        assert_eq!(result.effective_rate(0.0), None);
    }

    #[test]
    fn test_first_threshold_above_zero() {
        let bands = [TaxBand::new(10_000.0, 10.0)];
        let result = evaluate(15_000.0, &bands).unwrap();
        assert_abs_diff_eq!(result.total_tax, 500.0, epsilon = 1e-9);
        assert!(evaluate(5_000.0, &bands).unwrap().per_band.is_empty());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(evaluate(-1.0, &bands()), Err(CalcError::InvalidInput { field: "value", .. })));
        assert!(matches!(evaluate(1.0, &[]), Err(CalcError::InvalidInput { field: "bands", .. })));
    }

    #[test]
    fn test_surcharge_and_fixed_fee() {
        let modifiers = TaxModifiers {
            surcharge_rate_percent: 5.0,
            registration_fee: Some(RegistrationFee::Fixed { amount: 150.0 }),
        };
        let result = evaluate_with_modifiers(200_000.0, &bands(), &modifiers).unwrap();

        assert_abs_diff_eq!(result.surcharge, 10_000.0, epsilon = 1e-9);
        assert_eq!(result.registration_fee, 150.0);
        assert_abs_diff_eq!(result.total, 11_650.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.effective_rate.unwrap(), 11_650.0 / 200_000.0, epsilon = 1e-12);
    }

    #[test]
    fn test_capped_percentage_fee() {
        let fee = RegistrationFee::Percentage { rate_percent: 1.0, cap: Some(1_500.0) };
        assert_abs_diff_eq!(fee.amount_for(100_000.0), 1_000.0, epsilon = 1e-9);
        assert_eq!(fee.amount_for(400_000.0), 1_500.0);

        let uncapped = RegistrationFee::Percentage { rate_percent: 1.0, cap: None };
        assert_abs_diff_eq!(uncapped.amount_for(400_000.0), 4_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_negative_registration_fee_rejected() {
        let with_fee = |fee| TaxModifiers {
            surcharge_rate_percent: 0.0,
            registration_fee: Some(fee),
        };

        let fixed = with_fee(RegistrationFee::Fixed { amount: -500.0 });
        assert!(matches!(
            evaluate_with_modifiers(200_000.0, &bands(), &fixed),
            Err(CalcError::InvalidInput { field: "registration_fee.amount", .. })
        ));

        let rate = with_fee(RegistrationFee::Percentage { rate_percent: -1.0, cap: None });
        assert!(matches!(
            evaluate_with_modifiers(200_000.0, &bands(), &rate),
            Err(CalcError::InvalidInput { field: "registration_fee.rate_percent", .. })
        ));

        let cap = with_fee(RegistrationFee::Percentage { rate_percent: 1.0, cap: Some(-10.0) });
        assert!(matches!(
            evaluate_with_modifiers(200_000.0, &bands(), &cap),
            Err(CalcError::InvalidInput { field: "registration_fee.cap", .. })
        ));
    }

    #[test]
    fn test_no_modifiers_matches_banded() {
        let result = evaluate_with_modifiers(300_000.0, &bands(), &TaxModifiers::default()).unwrap();
        assert_eq!(result.total, result.banded.total_tax);
    }
}
