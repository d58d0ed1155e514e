//! Loan amortization: level-payment and interest-only schedules with optional grace period

mod terms;
mod schedule;
mod engine;

pub use terms::{LoanTerms, RepaymentType, MAX_LOAN_MONTHS};
pub use schedule::{LoanSchedule, LoanSummary, ScheduleEntry};
pub use engine::{amortize_fixed_payment, generate_schedule, level_payment};
