//! Month-by-month avalanche / snowball payoff simulation

use log::{debug, warn};

use super::consolidation::consolidate;
use super::types::{Debt, DebtPayoff, DebtPayoffResult, MonthBalances, SimulationConfig, Strategy};
use crate::error::{require_non_negative, CalcError, Result};
use crate::money::{is_cleared, ratio};
use crate::periods::{run_periods, Flow};

/// Simulate paying off `debts` with `extra_monthly` on top of the minimums
pub fn simulate(debts: &[Debt], extra_monthly: f64, strategy: Strategy) -> Result<DebtPayoffResult> {
    simulate_with_config(debts, extra_monthly, strategy, &SimulationConfig::default())
}

/// Simulate with explicit engine limits
pub fn simulate_with_config(
    debts: &[Debt],
    extra_monthly: f64,
    strategy: Strategy,
    config: &SimulationConfig,
) -> Result<DebtPayoffResult> {
    validate_debts(debts)?;
    require_non_negative("extra_monthly", extra_monthly)?;

    if strategy == Strategy::Consolidation {
        return consolidate(debts, extra_monthly, config);
    }

    check_total_coverage(debts, extra_monthly, config.max_months)?;
    let mut minimum_below_interest = Vec::new();
    for debt in debts.iter().filter(|d| !d.amortizes_on_minimum()) {
        warn!(
            "minimum payment {:.2} on '{}' does not cover first month interest {:.2}",
            debt.min_payment,
            debt.name,
            debt.first_month_interest()
        );
        minimum_below_interest.push(debt.id.clone());
    }

    let order = strategy.priority_order(debts);
    debug!("simulating {:?} over {} debts, extra {:.2}", strategy, debts.len(), extra_monthly);

    let mut balances: Vec<f64> = debts.iter().map(|d| d.balance).collect();
    let mut paid_off = vec![false; debts.len()];
    let mut freed_minimums = 0.0;
    let mut total_interest_paid = 0.0;
    let mut total_paid = 0.0;
    let mut per_month_balances = Vec::new();
    let mut payoff_order = Vec::with_capacity(debts.len());

    let months_to_payoff = run_periods(config.max_months, |month| {
        // Interest and minimum payment on every open debt
        for &i in &order {
            if paid_off[i] {
                continue;
            }
            let interest = balances[i] * debts[i].annual_rate_percent / 1200.0;
            total_interest_paid += interest;
            balances[i] += interest;

            let payment = debts[i].min_payment.min(balances[i]);
            balances[i] -= payment;
            total_paid += payment;
        }

        // Pooled extra goes down the priority list
        let mut pool = extra_monthly + freed_minimums;
        for &i in &order {
            if pool <= 0.0 {
                break;
            }
            if paid_off[i] || is_cleared(balances[i]) {
                continue;
            }
            let applied = pool.min(balances[i]);
            balances[i] -= applied;
            pool -= applied;
            total_paid += applied;
        }

        // Cleared debts release their minimum from next month on
        for &i in &order {
            if !paid_off[i] && is_cleared(balances[i]) {
                balances[i] = 0.0;
                paid_off[i] = true;
                freed_minimums += debts[i].min_payment;
                payoff_order.push(DebtPayoff {
                    id: debts[i].id.clone(),
                    name: debts[i].name.clone(),
                    month,
                });
            }
        }

        if config.track_balances {
            per_month_balances.push(MonthBalances {
                month,
                balances: balances.clone(),
                total: balances.iter().sum(),
            });
        }

        Ok(if paid_off.iter().all(|&p| p) { Flow::Done } else { Flow::Continue })
    })?;

    debug!("{:?} clears all debts in {} months", strategy, months_to_payoff);

    Ok(DebtPayoffResult {
        strategy,
        months_to_payoff,
        total_interest_paid,
        total_paid,
        per_month_balances,
        payoff_order,
        minimum_below_interest,
    })
}

/// Balance-weighted average annual rate: `Σ(rate·balance) / Σ balance`
pub fn weighted_average_rate(debts: &[Debt]) -> Option<f64> {
    let total_balance: f64 = debts.iter().map(|d| d.balance).sum();
    let weighted: f64 = debts.iter().map(|d| d.annual_rate_percent * d.balance).sum();
    ratio(weighted, total_balance)
}

pub(crate) fn validate_debts(debts: &[Debt]) -> Result<()> {
    if debts.is_empty() {
        return Err(CalcError::invalid("debts", "at least one debt is required"));
    }
    debts.iter().try_for_each(Debt::validate)
}

/// When all payments together cannot cover the combined interest, the total
/// balance grows every month and no ordering can clear it.
fn check_total_coverage(debts: &[Debt], extra_monthly: f64, max_months: u32) -> Result<()> {
    let total_payment: f64 = debts.iter().map(|d| d.min_payment).sum::<f64>() + extra_monthly;
    let total_interest: f64 = debts.iter().map(Debt::first_month_interest).sum();

    if total_payment <= total_interest {
        warn!(
            "monthly payments {:.2} do not cover combined interest {:.2}",
            total_payment, total_interest
        );
        return Err(CalcError::NonConvergent { periods: max_months });
    }
    Ok(())
}
