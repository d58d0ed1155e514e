//! Consolidation: all debts rolled into one fixed-payment loan

use log::debug;

use super::simulator::{validate_debts, weighted_average_rate};
use super::types::{Debt, DebtPayoff, DebtPayoffResult, MonthBalances, SimulationConfig, Strategy};
use crate::amortization::amortize_fixed_payment;
use crate::error::{require_non_negative, CalcError, Result};

/// Simulate a single consolidated balance repaid with a fixed monthly payment
pub fn simulate_consolidation(
    total_debt: f64,
    weighted_rate_percent: f64,
    monthly_payment: f64,
) -> Result<DebtPayoffResult> {
    simulate_consolidation_with_config(
        total_debt,
        weighted_rate_percent,
        monthly_payment,
        &SimulationConfig::default(),
    )
}

pub fn simulate_consolidation_with_config(
    total_debt: f64,
    weighted_rate_percent: f64,
    monthly_payment: f64,
    config: &SimulationConfig,
) -> Result<DebtPayoffResult> {
    let entries = amortize_fixed_payment(total_debt, weighted_rate_percent, monthly_payment, config.max_months)?;

    let months_to_payoff = entries.len() as u32;
    let per_month_balances = if config.track_balances {
        entries
            .iter()
            .map(|e| MonthBalances {
                month: e.month,
                balances: vec![e.balance],
                total: e.balance,
            })
            .collect()
    } else {
        Vec::new()
    };

    debug!(
        "consolidated {:.2} at {:.3}% clears in {} months",
        total_debt, weighted_rate_percent, months_to_payoff
    );

    Ok(DebtPayoffResult {
        strategy: Strategy::Consolidation,
        months_to_payoff,
        total_interest_paid: entries.iter().map(|e| e.interest_payment).sum(),
        total_paid: entries.iter().map(|e| e.payment).sum(),
        per_month_balances,
        payoff_order: vec![DebtPayoff {
            id: "consolidated".to_string(),
            name: "Consolidation loan".to_string(),
            month: months_to_payoff,
        }],
        minimum_below_interest: Vec::new(),
    })
}

/// Consolidate `debts` at their balance-weighted rate, paying the sum of
/// their minimums plus `extra_monthly`
pub fn consolidate(debts: &[Debt], extra_monthly: f64, config: &SimulationConfig) -> Result<DebtPayoffResult> {
    validate_debts(debts)?;
    require_non_negative("extra_monthly", extra_monthly)?;

    let total_debt: f64 = debts.iter().map(|d| d.balance).sum();
    let rate = weighted_average_rate(debts)
        .ok_or_else(|| CalcError::invalid("debts", "total balance is zero"))?;
    let payment = debts.iter().map(|d| d.min_payment).sum::<f64>() + extra_monthly;

    simulate_consolidation_with_config(total_debt, rate, payment, config)
}
