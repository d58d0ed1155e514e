//! Error types returned at the calculator boundary

use thiserror::Error;

/// Failure of a projection calculation
///
/// Zero denominators (ROI with no extra payments, effective rate on a zero
/// value) are not errors; those figures are reported as `Option<f64>`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    /// A parameter is outside its valid domain; nothing was calculated
    #[error("invalid input for {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// The balance did not reach zero within the period ceiling
    #[error("balance did not clear within {periods} periods; increase the payment")]
    NonConvergent { periods: u32 },
}

impl CalcError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;

/// Reject anything that is not a finite, strictly positive amount
pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CalcError::invalid(field, format!("must be positive, got {}", value)));
    }
    Ok(())
}

/// Reject anything that is not a finite, non-negative amount
pub(crate) fn require_non_negative(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(CalcError::invalid(field, format!("must not be negative, got {}", value)));
    }
    Ok(())
}
