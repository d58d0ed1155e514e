//! Month-by-month amortization

use log::debug;

use super::schedule::{LoanSchedule, ScheduleEntry};
use super::terms::{LoanTerms, RepaymentType};
use crate::error::{require_non_negative, require_positive, CalcError, Result};
use crate::money::{is_cleared, settle};
use crate::periods::{run_periods, Flow};

/// Level payment that repays `principal` over `months` at `monthly_rate`.
///
/// `P·r·(1+r)^n / ((1+r)^n − 1)`, or `P/n` when the rate is zero.
pub fn level_payment(principal: f64, monthly_rate: f64, months: u32) -> f64 {
    if months == 0 {
        return principal;
    }
    if monthly_rate == 0.0 {
        return principal / months as f64;
    }
    let growth = (1.0 + monthly_rate).powi(months as i32);
    principal * monthly_rate * growth / (growth - 1.0)
}

/// Generate the monthly schedule for a loan
pub fn generate_schedule(terms: &LoanTerms) -> Result<LoanSchedule> {
    terms.validate()?;

    let rate = terms.monthly_rate();
    let term_months = terms.term_months()?;
    let grace_months = terms.grace_period_months;

    debug!(
        "generating {:?} schedule: principal={} rate={}% term={}m grace={}m",
        terms.repayment_type, terms.principal, terms.annual_rate_percent, term_months, grace_months
    );

    let mut entries = Vec::with_capacity(terms.max_periods()? as usize);
    let (balance, grace_interest) = accrue_grace_period(terms, rate, &mut entries)?;

    let monthly_payment = match terms.repayment_type {
        RepaymentType::Repayment => {
            let payment = level_payment(balance, rate, term_months);
            step_fixed_payment(&mut entries, grace_months, balance, rate, payment, term_months, true)?;
            payment
        }
        RepaymentType::InterestOnly => {
            step_interest_only(&mut entries, grace_months, balance, rate, term_months)?;
            balance * rate
        }
    };

    debug!("schedule complete after {} months", entries.len());

    Ok(LoanSchedule {
        entries,
        monthly_payment,
        grace_interest,
        grace_interest_capitalized: terms.capitalize_grace_interest,
    })
}

/// Amortize a balance with a fixed monthly payment until it clears.
///
/// Used for loans whose payment is given rather than derived from a term,
/// such as a consolidation loan. Fails with [`CalcError::NonConvergent`] if the
/// payment does not cover the interest or the balance is not cleared within
/// `max_periods` months.
pub fn amortize_fixed_payment(
    balance: f64,
    annual_rate_percent: f64,
    payment: f64,
    max_periods: u32,
) -> Result<Vec<ScheduleEntry>> {
    require_positive("balance", balance)?;
    require_non_negative("annual_rate_percent", annual_rate_percent)?;
    require_positive("payment", payment)?;

    let rate = annual_rate_percent / 100.0 / 12.0;
    let mut entries = Vec::new();
    step_fixed_payment(&mut entries, 0, balance, rate, payment, max_periods, false)?;
    Ok(entries)
}

/// Emit grace months; returns the balance entering repayment and the interest accrued
fn accrue_grace_period(
    terms: &LoanTerms,
    rate: f64,
    entries: &mut Vec<ScheduleEntry>,
) -> Result<(f64, f64)> {
    let mut balance = terms.principal;
    let mut accrued = 0.0;

    if terms.grace_period_months == 0 {
        return Ok((balance, accrued));
    }

    run_periods(terms.grace_period_months, |month| {
        let interest = balance * rate;
        accrued += interest;
        if terms.capitalize_grace_interest {
            balance += interest;
        }
        entries.push(ScheduleEntry::grace(month, interest, balance));

        Ok(if month == terms.grace_period_months { Flow::Done } else { Flow::Continue })
    })?;

    Ok((balance, accrued))
}

/// Step a fixed payment forward from `balance`.
///
/// With `clear_at_end`, the last allowed period pays off whatever remains so the
/// schedule always ends at zero; otherwise running out of periods is an error.
fn step_fixed_payment(
    entries: &mut Vec<ScheduleEntry>,
    month_offset: u32,
    mut balance: f64,
    rate: f64,
    payment: f64,
    max_periods: u32,
    clear_at_end: bool,
) -> Result<()> {
    run_periods(max_periods, |period| {
        let interest = balance * rate;
        let mut principal = payment - interest;

        if principal <= 0.0 {
            return Err(CalcError::NonConvergent { periods: max_periods });
        }

        // Final month never overpays
        if principal > balance || (clear_at_end && period == max_periods) {
            principal = balance;
        }

        balance = settle(balance - principal);
        entries.push(ScheduleEntry::repayment(month_offset + period, interest, principal, balance));

        Ok(if is_cleared(balance) { Flow::Done } else { Flow::Continue })
    })?;

    Ok(())
}

/// Interest-only months with the balloon repayment on the last one
fn step_interest_only(
    entries: &mut Vec<ScheduleEntry>,
    month_offset: u32,
    mut balance: f64,
    rate: f64,
    term_months: u32,
) -> Result<()> {
    run_periods(term_months, |period| {
        let interest = balance * rate;
        let principal = if period == term_months { balance } else { 0.0 };

        balance = settle(balance - principal);
        entries.push(ScheduleEntry::repayment(month_offset + period, interest, principal, balance));

        Ok(if period == term_months { Flow::Done } else { Flow::Continue })
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn test_reference_mortgage() {
        let terms = LoanTerms::repayment(200_000.0, 3.5, 25);
        let schedule = generate_schedule(&terms).unwrap();
        let summary = schedule.summary();

        assert_eq!(schedule.len(), 300);
        assert_abs_diff_eq!(schedule.monthly_payment, 1001.2471, epsilon = 1e-3);
        assert_abs_diff_eq!(summary.total_interest, 100_374.14, epsilon = 0.05);
        assert_eq!(schedule.final_balance(), 0.0);
    }

    #[test]
    fn test_first_month_split() {
        let terms = LoanTerms::repayment(200_000.0, 3.5, 25);
        let schedule = generate_schedule(&terms).unwrap();
        let first = &schedule.entries[0];

        assert_eq!(first.month, 1);
        assert_abs_diff_eq!(first.interest_payment, 583.3333, epsilon = 1e-3);
        assert_abs_diff_eq!(
            first.principal_payment,
            schedule.monthly_payment - first.interest_payment,
            epsilon = 1e-9
        );
        assert!(!first.is_grace_period);
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let terms = LoanTerms::repayment(12_000.0, 0.0, 1);
        let schedule = generate_schedule(&terms).unwrap();

        assert_eq!(schedule.len(), 12);
        assert_abs_diff_eq!(schedule.monthly_payment, 1000.0, epsilon = 1e-12);
        for entry in &schedule.entries {
            assert_eq!(entry.interest_payment, 0.0);
            assert_abs_diff_eq!(entry.principal_payment, 1000.0, epsilon = 1e-9);
        }
        assert_eq!(schedule.final_balance(), 0.0);
    }

    #[test]
    fn test_interest_only_balloon() {
        let terms = LoanTerms::interest_only(120_000.0, 6.0, 2);
        let schedule = generate_schedule(&terms).unwrap();

        assert_eq!(schedule.len(), 24);
        assert_abs_diff_eq!(schedule.monthly_payment, 600.0, epsilon = 1e-9);

        for entry in &schedule.entries[..23] {
            assert_abs_diff_eq!(entry.payment, 600.0, epsilon = 1e-9);
            assert_eq!(entry.principal_payment, 0.0);
            assert_eq!(entry.balance, 120_000.0);
        }

        let last = schedule.entries.last().unwrap();
        assert_eq!(last.principal_payment, 120_000.0);
        assert_abs_diff_eq!(last.payment, 120_600.0, epsilon = 1e-9);
        assert_eq!(last.balance, 0.0);
    }

    #[test]
    fn test_grace_period_tracked_separately() {
        let terms = LoanTerms::repayment(10_000.0, 12.0, 1).with_grace_period(3);
        let schedule = generate_schedule(&terms).unwrap();

        assert_eq!(schedule.len(), 15);
        for entry in &schedule.entries[..3] {
            assert!(entry.is_grace_period);
            assert_eq!(entry.payment, 0.0);
            assert_eq!(entry.principal_payment, 0.0);
            assert_abs_diff_eq!(entry.interest_payment, 100.0, epsilon = 1e-9);
            assert_eq!(entry.balance, 10_000.0);
        }
        assert_abs_diff_eq!(schedule.grace_interest, 300.0, epsilon = 1e-9);
        assert_abs_diff_eq!(schedule.monthly_payment, level_payment(10_000.0, 0.01, 12), epsilon = 1e-12);

        let repaid: f64 = schedule.entries.iter().map(|e| e.principal_payment).sum();
        assert_abs_diff_eq!(repaid, 10_000.0, epsilon = 1e-6);

        let summary = schedule.summary();
        assert_abs_diff_eq!(summary.total_cost, summary.total_paid + 300.0, epsilon = 1e-9);
    }

    #[test]
    fn test_grace_period_capitalized() {
        let terms = LoanTerms::repayment(10_000.0, 12.0, 1)
            .with_grace_period(2)
            .capitalizing_grace_interest();
        let schedule = generate_schedule(&terms).unwrap();

        assert_abs_diff_eq!(schedule.entries[0].balance, 10_100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(schedule.entries[1].balance, 10_201.0, epsilon = 1e-9);
        assert_abs_diff_eq!(schedule.grace_interest, 201.0, epsilon = 1e-9);

        let repaid: f64 = schedule.entries.iter().map(|e| e.principal_payment).sum();
        assert_abs_diff_eq!(repaid, 10_201.0, epsilon = 1e-6);

        let summary = schedule.summary();
        assert_eq!(summary.total_cost, summary.total_paid);
    }

    #[test]
    fn test_interest_only_after_grace_period() {
        let terms = LoanTerms::interest_only(60_000.0, 6.0, 1).with_grace_period(3);
        let schedule = generate_schedule(&terms).unwrap();

        assert_eq!(schedule.len(), 15);
        assert_abs_diff_eq!(schedule.grace_interest, 900.0, epsilon = 1e-9);
        assert_abs_diff_eq!(schedule.monthly_payment, 300.0, epsilon = 1e-9);

        for entry in &schedule.entries[..3] {
            assert!(entry.is_grace_period);
            assert_eq!(entry.payment, 0.0);
            assert_eq!(entry.balance, 60_000.0);
        }
        for entry in &schedule.entries[3..14] {
            assert!(!entry.is_grace_period);
            assert_abs_diff_eq!(entry.payment, 300.0, epsilon = 1e-9);
            assert_eq!(entry.principal_payment, 0.0);
        }

        let last = schedule.entries.last().unwrap();
        assert_eq!(last.month, 15);
        assert_eq!(last.principal_payment, 60_000.0);
        assert_eq!(last.balance, 0.0);
        assert_abs_diff_eq!(schedule.summary().total_interest, 3_600.0, epsilon = 1e-9);
    }

    #[test]
    fn test_overlong_terms_rejected() {
        let result = generate_schedule(&LoanTerms::repayment(1_000.0, 5.0, 400_000_000));
        assert!(matches!(result, Err(CalcError::InvalidInput { field: "term_years", .. })));

        let result = generate_schedule(&LoanTerms::interest_only(1_000.0, 5.0, 100).with_grace_period(12));
        assert!(matches!(result, Err(CalcError::InvalidInput { field: "term_years", .. })));
    }

    #[test]
    fn test_invalid_terms_rejected() {
        let result = generate_schedule(&LoanTerms::repayment(-5.0, 3.0, 10));
        assert!(matches!(result, Err(CalcError::InvalidInput { field: "principal", .. })));
    }

    #[test]
    fn test_fixed_payment_clears() {
        let entries = amortize_fixed_payment(1_000.0, 12.0, 100.0, 1200).unwrap();
        assert_eq!(entries.len(), 11);
        assert_eq!(entries.last().unwrap().balance, 0.0);
        assert!(entries.last().unwrap().payment < 100.0);
    }

    #[test]
    fn test_fixed_payment_below_interest_is_non_convergent() {
        let result = amortize_fixed_payment(10_000.0, 24.0, 150.0, 1200);
        assert_eq!(result, Err(CalcError::NonConvergent { periods: 1200 }));
    }

    #[test]
    fn test_identical_inputs_identical_schedules() {
        let terms = LoanTerms::repayment(187_500.0, 4.25, 30).with_grace_period(4);
        let first = generate_schedule(&terms).unwrap();
        let second = generate_schedule(&terms).unwrap();
        assert_eq!(first, second);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_repayment_schedule_clears_principal(
            principal in 1_000.0f64..2_000_000.0,
            rate in 0.0f64..15.0,
            years in 1u32..40,
            grace in 0u32..24,
        ) {
            let terms = LoanTerms::repayment(principal, rate, years).with_grace_period(grace);
            let schedule = generate_schedule(&terms).unwrap();

            prop_assert!(schedule.len() as u32 <= terms.max_periods().unwrap());
            prop_assert!(schedule.final_balance().abs() <= 1e-6);

            let repaid: f64 = schedule.entries.iter().map(|e| e.principal_payment).sum();
            prop_assert!((repaid - principal).abs() <= 1e-6 * principal.max(1.0));
        }

        #[test]
        fn prop_balance_drops_by_principal(
            principal in 1_000.0f64..1_000_000.0,
            rate in 0.0f64..12.0,
            years in 1u32..35,
            interest_only in any::<bool>(),
        ) {
            let terms = if interest_only {
                LoanTerms::interest_only(principal, rate, years)
            } else {
                LoanTerms::repayment(principal, rate, years)
            };
            let schedule = generate_schedule(&terms).unwrap();

            let mut previous = principal;
            for entry in schedule.entries.iter().filter(|e| !e.is_grace_period) {
                prop_assert!(entry.balance <= previous);
                prop_assert!((entry.balance - (previous - entry.principal_payment)).abs() <= 1e-6);
                previous = entry.balance;
            }
        }
    }
}
