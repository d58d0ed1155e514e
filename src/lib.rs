//! Loan Projection - Personal finance projection engine
//!
//! This library provides:
//! - Loan amortization schedules (repayment, interest-only, grace periods)
//! - Overpayment analysis against a baseline schedule
//! - Multi-debt payoff simulation (avalanche, snowball, consolidation)
//! - Progressive band tax with surcharges and dated rate tables
//! - Savings growth with periodic contributions
//! - Parallel scenario comparison

pub mod money;
pub mod error;
pub mod periods;
pub mod amortization;
pub mod overpayment;
pub mod debt;
pub mod tax;
pub mod growth;
pub mod scenario;

// Re-export commonly used types
pub use error::{CalcError, Result};
pub use amortization::{generate_schedule, LoanSchedule, LoanSummary, LoanTerms, RepaymentType, ScheduleEntry};
pub use overpayment::{apply_extra_payments, ExtraFrequency, ExtraPayment, OverpaymentResult};
pub use debt::{simulate, Debt, DebtPayoffResult, Strategy};
pub use tax::{evaluate, BuyerStatus, StampDutyCalculator, TaxBand};
pub use growth::{project, Frequency, GrowthParams, ProjectionResult};
pub use scenario::{ScenarioRunner, StrategyComparison};
