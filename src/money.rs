//! Money helpers shared by every calculator
//!
//! All arithmetic runs in `f64`. Rounding to cents happens only when a result is
//! handed to a presentation collaborator, never between periods.

/// Balances at or below this value are treated as fully repaid
pub const EPSILON: f64 = 1e-6;

/// Round a monetary amount to two decimal places
pub fn round_cents(amount: f64) -> f64 {
    let rounded = (amount * 100.0).round() / 100.0;
    // avoid printing "-0.00"
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// True when a balance should be considered cleared
pub fn is_cleared(balance: f64) -> bool {
    balance <= EPSILON
}

/// Clamp float residue at the final cent to zero.
///
/// Only absorbs values within `EPSILON` of zero; anything larger is returned
/// untouched so a logic error is never masked.
pub fn settle(balance: f64) -> f64 {
    if balance.abs() <= EPSILON { 0.0 } else { balance }
}

/// Divide, returning `None` for a zero denominator
pub fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator.abs() <= EPSILON {
        None
    } else {
        Some(numerator / denominator)
    }
}
