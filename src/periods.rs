//! Bounded period stepping
//!
//! Every calculator advances one period at a time until its balance clears.
//! They all go through [`run_periods`] so none of them can loop forever on
//! malformed input.

use log::warn;

use crate::error::{CalcError, Result};

/// Outcome of a single period step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// More periods are needed
    Continue,
    /// The projection is complete after this period
    Done,
}

/// Call `step` for periods `1..=max_periods` until it reports [`Flow::Done`].
///
/// Returns the number of the last period stepped. If the ceiling is reached
/// while `step` still wants to continue, returns [`CalcError::NonConvergent`].
pub fn run_periods<F>(max_periods: u32, mut step: F) -> Result<u32>
where
    F: FnMut(u32) -> Result<Flow>,
{
    for period in 1..=max_periods {
        if step(period)? == Flow::Done {
            return Ok(period);
        }
    }

    warn!("period ceiling of {} reached before completion", max_periods);
    Err(CalcError::NonConvergent { periods: max_periods })
}
