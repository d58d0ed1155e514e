//! Debt payoff strategies: avalanche, snowball and consolidation
//!
//! Every open debt accrues interest and receives its minimum payment each month.
//! The pooled extra payment then goes to debts in priority order, and each
//! cleared debt's minimum joins the pool from the following month.

mod types;
mod simulator;
mod consolidation;

pub use types::{Debt, DebtPayoff, DebtPayoffResult, MonthBalances, SimulationConfig, Strategy};
pub use simulator::{simulate, simulate_with_config, weighted_average_rate};
pub use consolidation::{consolidate, simulate_consolidation, simulate_consolidation_with_config};
