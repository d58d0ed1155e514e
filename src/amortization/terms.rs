//! Loan parameters

use serde::{Deserialize, Serialize};

use crate::error::{require_non_negative, require_positive, CalcError, Result};

/// How the loan principal is repaid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepaymentType {
    /// Level monthly payment covering interest and principal
    #[default]
    Repayment,
    /// Interest only, with the full principal due as a balloon in the final month
    InterestOnly,
}

/// Longest schedule accepted, grace months included (100 years)
pub const MAX_LOAN_MONTHS: u32 = 1200;

/// Parameters of a single loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount borrowed
    pub principal: f64,

    /// Nominal annual rate, e.g. 3.5 for 3.5%
    pub annual_rate_percent: f64,

    /// Repayment term after any grace period
    pub term_years: u32,

    #[serde(default)]
    pub repayment_type: RepaymentType,

    /// Initial months with no payment; interest still accrues
    #[serde(default)]
    pub grace_period_months: u32,

    /// Add grace-period interest to the balance instead of tracking it separately
    #[serde(default)]
    pub capitalize_grace_interest: bool,
}

impl LoanTerms {
    /// Level-payment loan with no grace period
    pub fn repayment(principal: f64, annual_rate_percent: f64, term_years: u32) -> Self {
        Self {
            principal,
            annual_rate_percent,
            term_years,
            repayment_type: RepaymentType::Repayment,
            grace_period_months: 0,
            capitalize_grace_interest: false,
        }
    }

    /// Interest-only loan with a balloon repayment at the end of the term
    pub fn interest_only(principal: f64, annual_rate_percent: f64, term_years: u32) -> Self {
        Self {
            repayment_type: RepaymentType::InterestOnly,
            ..Self::repayment(principal, annual_rate_percent, term_years)
        }
    }

    /// Set the grace period length
    pub fn with_grace_period(mut self, months: u32) -> Self {
        self.grace_period_months = months;
        self
    }

    /// Capitalize grace-period interest into the balance
    pub fn capitalizing_grace_interest(mut self) -> Self {
        self.capitalize_grace_interest = true;
        self
    }

    /// Monthly rate as a decimal
    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate_percent / 100.0 / 12.0
    }

    /// Number of repayment months, excluding the grace period
    pub fn term_months(&self) -> Result<u32> {
        self.term_years
            .checked_mul(12)
            .ok_or_else(|| CalcError::invalid("term_years", format!("{} years is out of range", self.term_years)))
    }

    /// Upper bound on schedule length, bounded by [`MAX_LOAN_MONTHS`]
    pub fn max_periods(&self) -> Result<u32> {
        let months = self
            .term_months()?
            .checked_add(self.grace_period_months)
            .filter(|&m| m <= MAX_LOAN_MONTHS)
            .ok_or_else(|| {
                CalcError::invalid(
                    "term_years",
                    format!("term plus grace period exceeds {} months", MAX_LOAN_MONTHS),
                )
            })?;
        Ok(months)
    }

    pub fn validate(&self) -> Result<()> {
        require_positive("principal", self.principal)?;
        require_non_negative("annual_rate_percent", self.annual_rate_percent)?;
        if self.term_years == 0 {
            return Err(CalcError::invalid("term_years", "must be at least one year"));
        }
        self.max_periods()?;
        Ok(())
    }
}
