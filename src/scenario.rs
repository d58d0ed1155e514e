//! Scenario runner for batch comparisons
//!
//! Holds the simulation limits once, then evaluates several payoff strategies,
//! overpayment plans or growth scenarios side by side. Each scenario is
//! independent, so batches run on the rayon thread pool.

use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::amortization::{LoanSchedule, LoanTerms};
use crate::debt::{simulate_with_config, Debt, DebtPayoffResult, SimulationConfig, Strategy};
use crate::error::Result;
use crate::growth::{project, GrowthParams, ProjectionResult};
use crate::overpayment::{apply_extra_payments, ExtraPayment, OverpaymentResult};

/// Every payoff strategy run against the same debts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyComparison {
    /// One result per strategy, in [`Strategy::ALL`] order
    pub results: Vec<DebtPayoffResult>,
}

impl StrategyComparison {
    pub fn get(&self, strategy: Strategy) -> Option<&DebtPayoffResult> {
        self.results.iter().find(|r| r.strategy == strategy)
    }

    /// Strategy paying the least interest; ties go to the earlier strategy
    pub fn cheapest(&self) -> Option<&DebtPayoffResult> {
        self.results
            .iter()
            .reduce(|best, r| if r.total_interest_paid < best.total_interest_paid { r } else { best })
    }

    /// Strategy clearing everything soonest; ties go to the earlier strategy
    pub fn fastest(&self) -> Option<&DebtPayoffResult> {
        self.results
            .iter()
            .reduce(|best, r| if r.months_to_payoff < best.months_to_payoff { r } else { best })
    }
}

/// Pre-configured runner for batch scenario evaluation
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// let comparison = runner.compare_strategies(&debts, 100.0)?;
/// let best = comparison.cheapest();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    config: SimulationConfig,
}

impl ScenarioRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner with explicit debt simulation limits
    pub fn with_config(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run avalanche, snowball and consolidation concurrently on the same debts.
    ///
    /// Fails with the first error any strategy reports.
    pub fn compare_strategies(&self, debts: &[Debt], extra_monthly: f64) -> Result<StrategyComparison> {
        let results = Strategy::ALL
            .par_iter()
            .map(|&strategy| simulate_with_config(debts, extra_monthly, strategy, &self.config))
            .collect::<Result<Vec<_>>>()?;

        info!(
            "compared {} strategies over {} debts with {:.2} extra",
            results.len(),
            debts.len(),
            extra_monthly
        );
        Ok(StrategyComparison { results })
    }

    /// Apply each plan to the same baseline, one result per plan in input order
    pub fn compare_overpayment_plans(
        &self,
        baseline: &LoanSchedule,
        terms: &LoanTerms,
        plans: &[Vec<ExtraPayment>],
    ) -> Result<Vec<OverpaymentResult>> {
        plans
            .par_iter()
            .map(|plan| apply_extra_payments(baseline, terms, plan))
            .collect()
    }

    /// Project several growth scenarios, e.g. a range of rates
    pub fn run_growth_scenarios(&self, scenarios: &[GrowthParams]) -> Result<Vec<ProjectionResult>> {
        scenarios.par_iter().map(project).collect()
    }
}
