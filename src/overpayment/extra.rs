//! Extra payment definitions

use serde::{Deserialize, Serialize};

use crate::error::{require_positive, CalcError, Result};

/// How often an extra payment recurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtraFrequency {
    Monthly,
    Quarterly,
    Annually,
    OneTime,
}

impl ExtraFrequency {
    /// Months between recurrences; `None` for a one-off payment
    pub fn interval_months(&self) -> Option<u32> {
        match self {
            ExtraFrequency::Monthly => Some(1),
            ExtraFrequency::Quarterly => Some(3),
            ExtraFrequency::Annually => Some(12),
            ExtraFrequency::OneTime => None,
        }
    }
}

/// A payment made on top of the scheduled payment, applied entirely to principal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraPayment {
    pub amount: f64,
    pub frequency: ExtraFrequency,
    /// First month (1-based) the payment is made
    pub start_month: u32,
}

impl ExtraPayment {
    pub fn new(amount: f64, frequency: ExtraFrequency, start_month: u32) -> Self {
        Self { amount, frequency, start_month }
    }

    pub fn monthly(amount: f64, start_month: u32) -> Self {
        Self::new(amount, ExtraFrequency::Monthly, start_month)
    }

    pub fn lump_sum(amount: f64, month: u32) -> Self {
        Self::new(amount, ExtraFrequency::OneTime, month)
    }

    /// Whether this payment is made in the given month
    pub fn applies_in(&self, month: u32) -> bool {
        if month < self.start_month {
            return false;
        }
        match self.frequency.interval_months() {
            Some(interval) => (month - self.start_month) % interval == 0,
            None => month == self.start_month,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_positive("extra_payment.amount", self.amount)?;
        if self.start_month == 0 {
            return Err(CalcError::invalid("extra_payment.start_month", "months are numbered from 1"));
        }
        Ok(())
    }
}
