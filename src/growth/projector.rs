//! Compound growth with regular contributions

use log::debug;
use serde::{Deserialize, Serialize};

use super::frequency::Frequency;
use crate::error::{require_non_negative, CalcError, Result};
use crate::money::ratio;
use crate::periods::{run_periods, Flow};

/// Longest projection accepted, in years
pub const MAX_TERM_YEARS: u32 = 100;

/// Savings or investment parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthParams {
    /// Initial deposit
    pub principal: f64,
    pub annual_rate_percent: f64,
    pub compounding: Frequency,
    /// Amount paid in at each contribution
    #[serde(default)]
    pub contribution: f64,
    pub contribution_frequency: Frequency,
    pub term_years: u32,
}

impl GrowthParams {
    pub fn validate(&self) -> Result<()> {
        require_non_negative("principal", self.principal)?;
        require_non_negative("annual_rate_percent", self.annual_rate_percent)?;
        require_non_negative("contribution", self.contribution)?;
        if self.term_years == 0 {
            return Err(CalcError::invalid("term_years", "must be at least one year"));
        }
        if self.term_years > MAX_TERM_YEARS {
            return Err(CalcError::invalid(
                "term_years",
                format!("{} years exceeds the {} year limit", self.term_years, MAX_TERM_YEARS),
            ));
        }
        self.total_periods()?;
        Ok(())
    }

    /// Number of compounding periods over the whole term
    pub fn total_periods(&self) -> Result<u32> {
        self.compounding
            .periods_per_year()
            .checked_mul(self.term_years)
            .ok_or_else(|| CalcError::invalid("term_years", format!("{} years is out of range", self.term_years)))
    }
}

/// Sampled state at the end of a compounding period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    /// Compounding period index; 0 is the initial deposit
    pub period: u32,
    pub year: f64,
    pub balance: f64,
    /// Cumulative amount paid in, initial deposit included
    pub contributions: f64,
    /// Cumulative interest earned
    pub interest: f64,
}

/// Complete growth projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Period 0, every year end, and the final period
    pub periods: Vec<ProjectionPoint>,
    pub final_balance: f64,
    pub total_contributions: f64,
    pub total_interest: f64,
    /// Interest as a percentage of contributions; `None` when nothing was paid in
    pub total_return_percent: Option<f64>,
}

impl ProjectionResult {
    /// Final balance in today's money at a constant annual inflation rate
    pub fn real_final_balance(&self, inflation_percent: f64) -> f64 {
        let years = self.periods.last().map(|p| p.year).unwrap_or(0.0);
        self.final_balance / (1.0 + inflation_percent / 100.0).powf(years)
    }
}

/// Project a balance forward, compounding each period and then adding any
/// contribution falling due in that period
pub fn project(params: &GrowthParams) -> Result<ProjectionResult> {
    params.validate()?;

    let per_year = params.compounding.periods_per_year();
    let contributions_per_year = params.contribution_frequency.periods_per_year() as u64;
    let rate = params.annual_rate_percent / 100.0 / per_year as f64;
    let total_periods = params.total_periods()?;

    debug!(
        "projecting {} periods at {}% with {:.2} x{}/yr",
        total_periods, params.annual_rate_percent, params.contribution, contributions_per_year
    );

    let mut balance = params.principal;
    let mut contributions = params.principal;
    let mut points = Vec::with_capacity(params.term_years as usize + 1);
    points.push(ProjectionPoint {
        period: 0,
        year: 0.0,
        balance,
        contributions,
        interest: 0.0,
    });

    // Contribution boundaries crossed up to the end of period p
    let boundaries = |p: u32| p as u64 * contributions_per_year / per_year as u64;

    run_periods(total_periods, |period| {
        balance += balance * rate;

        let due = boundaries(period) - boundaries(period - 1);
        if due > 0 {
            let paid = params.contribution * due as f64;
            balance += paid;
            contributions += paid;
        }

        if period % per_year == 0 || period == total_periods {
            points.push(ProjectionPoint {
                period,
                year: period as f64 / per_year as f64,
                balance,
                contributions,
                interest: balance - contributions,
            });
        }

        Ok(if period == total_periods { Flow::Done } else { Flow::Continue })
    })?;

    let total_interest = balance - contributions;

    Ok(ProjectionResult {
        periods: points,
        final_balance: balance,
        total_contributions: contributions,
        total_interest,
        total_return_percent: ratio(total_interest, contributions).map(|r| r * 100.0),
    })
}
