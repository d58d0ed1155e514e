//! Schedule output structures

use serde::{Deserialize, Serialize};

use crate::money::round_cents;

/// One month of a loan schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// 1-based month number, counting grace months
    pub month: u32,

    /// Scheduled payment made this month (excludes extra payments)
    pub payment: f64,

    /// Total principal repaid this month, extra payments included
    pub principal_payment: f64,

    pub interest_payment: f64,

    /// Extra principal applied this month on top of the scheduled payment
    #[serde(default)]
    pub extra_payment: f64,

    /// Balance after this month's payments
    pub balance: f64,

    pub is_grace_period: bool,
}

impl ScheduleEntry {
    /// Month with a regular scheduled payment
    pub fn repayment(month: u32, interest: f64, principal: f64, balance: f64) -> Self {
        Self {
            month,
            payment: interest + principal,
            principal_payment: principal,
            interest_payment: interest,
            extra_payment: 0.0,
            balance,
            is_grace_period: false,
        }
    }

    /// Grace month: nothing is paid, interest accrues
    pub fn grace(month: u32, interest: f64, balance: f64) -> Self {
        Self {
            month,
            payment: 0.0,
            principal_payment: 0.0,
            interest_payment: interest,
            extra_payment: 0.0,
            balance,
            is_grace_period: true,
        }
    }

    /// Copy with every money field rounded to cents, for display and export
    pub fn rounded(&self) -> Self {
        Self {
            month: self.month,
            payment: round_cents(self.payment),
            principal_payment: round_cents(self.principal_payment),
            interest_payment: round_cents(self.interest_payment),
            extra_payment: round_cents(self.extra_payment),
            balance: round_cents(self.balance),
            is_grace_period: self.is_grace_period,
        }
    }
}

/// Complete loan schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSchedule {
    /// Monthly entries, grace months first
    pub entries: Vec<ScheduleEntry>,

    /// Nominal payment outside the grace period
    /// (the interest-only payment for interest-only loans)
    pub monthly_payment: f64,

    /// Interest accrued during the grace period
    pub grace_interest: f64,

    /// Whether grace interest was added to the balance
    pub grace_interest_capitalized: bool,
}

impl LoanSchedule {
    /// Number of months in the schedule
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Balance after the last month
    pub fn final_balance(&self) -> f64 {
        self.entries.last().map(|e| e.balance).unwrap_or(0.0)
    }

    /// Interest paid through scheduled payments (grace months excluded)
    pub fn total_interest(&self) -> f64 {
        self.entries
            .iter()
            .filter(|e| !e.is_grace_period)
            .map(|e| e.interest_payment)
            .sum()
    }

    /// Get summary statistics
    pub fn summary(&self) -> LoanSummary {
        let total_interest = self.total_interest();
        let total_paid: f64 = self
            .entries
            .iter()
            .map(|e| e.payment + e.extra_payment)
            .sum();

        // Uncapitalized grace interest is owed on top of the scheduled payments
        let total_cost = if self.grace_interest_capitalized {
            total_paid
        } else {
            total_paid + self.grace_interest
        };

        LoanSummary {
            months: self.entries.len() as u32,
            monthly_payment: self.monthly_payment,
            total_interest,
            total_paid,
            grace_interest: self.grace_interest,
            total_cost,
        }
    }

    /// Copy of the entries rounded to cents
    pub fn rounded_entries(&self) -> Vec<ScheduleEntry> {
        self.entries.iter().map(ScheduleEntry::rounded).collect()
    }
}

/// Summary statistics for a loan schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub months: u32,
    pub monthly_payment: f64,
    pub total_interest: f64,
    pub total_paid: f64,
    pub grace_interest: f64,
    pub total_cost: f64,
}
