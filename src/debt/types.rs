//! Core types for debt payoff simulation

use serde::{Deserialize, Serialize};

use crate::error::{require_non_negative, require_positive, Result};

/// A single debt account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub id: String,
    pub name: String,
    pub balance: f64,
    pub annual_rate_percent: f64,
    pub min_payment: f64,
}

impl Debt {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        balance: f64,
        annual_rate_percent: f64,
        min_payment: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            balance,
            annual_rate_percent,
            min_payment,
        }
    }

    /// Interest charged in the first month at the current balance
    pub fn first_month_interest(&self) -> f64 {
        self.balance * self.annual_rate_percent / 1200.0
    }

    /// Whether the minimum payment alone ever reduces the balance
    pub fn amortizes_on_minimum(&self) -> bool {
        self.min_payment > self.first_month_interest()
    }

    pub fn validate(&self) -> Result<()> {
        require_positive("debt.balance", self.balance)?;
        require_non_negative("debt.annual_rate_percent", self.annual_rate_percent)?;
        require_positive("debt.min_payment", self.min_payment)?;
        Ok(())
    }
}

/// Payoff method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Highest interest rate first
    Avalanche,
    /// Lowest balance first
    Snowball,
    /// All debts rolled into one loan at the balance-weighted rate
    Consolidation,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Avalanche, Strategy::Snowball, Strategy::Consolidation];

    /// Indices of `debts` in priority order.
    ///
    /// Fixed once at the start of a simulation; ties keep input order.
    /// Consolidation has no ordering and keeps input order.
    pub fn priority_order(&self, debts: &[Debt]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..debts.len()).collect();
        match self {
            Strategy::Avalanche => order.sort_by(|&a, &b| {
                debts[b].annual_rate_percent.total_cmp(&debts[a].annual_rate_percent)
            }),
            Strategy::Snowball => order.sort_by(|&a, &b| debts[a].balance.total_cmp(&debts[b].balance)),
            Strategy::Consolidation => {}
        }
        order
    }
}

/// Engine limits for a simulation run
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Month ceiling before the simulation is declared non-convergent
    pub max_months: u32,

    /// Keep a per-month balance snapshot for charting
    pub track_balances: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_months: 1200, // 100 years
            track_balances: true,
        }
    }
}

/// Balances at the end of one simulated month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthBalances {
    pub month: u32,
    /// One balance per debt, in the caller's input order
    pub balances: Vec<f64>,
    pub total: f64,
}

/// Month in which a debt was cleared
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtPayoff {
    pub id: String,
    pub name: String,
    pub month: u32,
}

/// Result of a payoff simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtPayoffResult {
    pub strategy: Strategy,
    pub months_to_payoff: u32,
    pub total_interest_paid: f64,
    pub total_paid: f64,
    pub per_month_balances: Vec<MonthBalances>,
    /// Debts in the order they were cleared
    pub payoff_order: Vec<DebtPayoff>,
    /// Ids of debts whose minimum payment did not cover their first month's interest
    #[serde(default)]
    pub minimum_below_interest: Vec<String>,
}
