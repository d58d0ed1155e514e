//! Re-derive a schedule after extra payments
//!
//! The scheduled monthly payment is held at the baseline's nominal amount, so
//! extra principal shortens the term rather than lowering the payment.

use log::debug;
use serde::{Deserialize, Serialize};

use super::extra::ExtraPayment;
use crate::amortization::{LoanSchedule, LoanTerms, ScheduleEntry};
use crate::error::{CalcError, Result};
use crate::money::{is_cleared, ratio, settle};
use crate::periods::{run_periods, Flow};

/// Outcome of applying extra payments to a baseline schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverpaymentResult {
    /// Recomputed schedule, ending the month the balance clears
    pub modified: Vec<ScheduleEntry>,

    pub months_saved: u32,

    pub interest_saved: f64,

    /// Extra principal actually applied, capped by the balance outstanding at the time
    pub total_extra_paid: f64,

    /// Interest saved per unit of extra payment; `None` when nothing extra was paid
    pub roi: Option<f64>,
}

/// Apply extra payments to `baseline`, the schedule generated from `terms`.
///
/// The baseline is left untouched. Months before the first extra payment are
/// copied as-is; every month from there on is recomputed.
pub fn apply_extra_payments(
    baseline: &LoanSchedule,
    terms: &LoanTerms,
    extras: &[ExtraPayment],
) -> Result<OverpaymentResult> {
    terms.validate()?;
    for extra in extras {
        extra.validate()?;
    }
    if baseline.is_empty() {
        return Err(CalcError::invalid("baseline", "schedule has no entries"));
    }

    let last_month = baseline.len() as u32;
    let first_target = extras
        .iter()
        .map(|e| e.start_month)
        .min()
        .filter(|&m| m <= last_month);

    let modified = match first_target {
        Some(start) => recompute_from(baseline, terms, extras, start)?,
        None => baseline.entries.clone(),
    };

    let baseline_interest: f64 = baseline.entries.iter().map(|e| e.interest_payment).sum();
    let modified_interest: f64 = modified.iter().map(|e| e.interest_payment).sum();
    let total_extra_paid: f64 = modified.iter().map(|e| e.extra_payment).sum();
    let interest_saved = baseline_interest - modified_interest;

    debug!(
        "extra payments of {:.2} shorten schedule from {} to {} months",
        total_extra_paid,
        baseline.len(),
        modified.len()
    );

    Ok(OverpaymentResult {
        months_saved: last_month - modified.len() as u32,
        interest_saved,
        total_extra_paid,
        roi: ratio(interest_saved, total_extra_paid),
        modified,
    })
}

/// Copy months before `start`, then step forward applying extras
fn recompute_from(
    baseline: &LoanSchedule,
    terms: &LoanTerms,
    extras: &[ExtraPayment],
    start: u32,
) -> Result<Vec<ScheduleEntry>> {
    let rate = terms.monthly_rate();
    let nominal = baseline.monthly_payment;
    let last_month = baseline.len() as u32;

    let mut modified: Vec<ScheduleEntry> = baseline.entries[..(start - 1) as usize].to_vec();
    let mut balance = modified.last().map(|e| e.balance).unwrap_or(terms.principal);

    run_periods(last_month - start + 1, |period| {
        let month = start + period - 1;
        let in_grace = baseline.entries[(month - 1) as usize].is_grace_period;
        let interest = balance * rate;

        let scheduled_principal = if in_grace {
            if baseline.grace_interest_capitalized {
                balance += interest;
            }
            0.0
        } else if month == last_month {
            // Final month of the original term settles whatever is left
            balance
        } else {
            (nominal - interest).max(0.0).min(balance)
        };
        balance -= scheduled_principal;

        let mut extra_paid = 0.0;
        for extra in extras.iter().filter(|e| e.applies_in(month)) {
            let applied = extra.amount.min(balance);
            balance -= applied;
            extra_paid += applied;
        }
        balance = settle(balance);

        modified.push(ScheduleEntry {
            month,
            payment: if in_grace { 0.0 } else { interest + scheduled_principal },
            principal_payment: scheduled_principal + extra_paid,
            interest_payment: interest,
            extra_payment: extra_paid,
            balance,
            is_grace_period: in_grace,
        });

        Ok(if is_cleared(balance) || month == last_month { Flow::Done } else { Flow::Continue })
    })?;

    Ok(modified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::{amortize_fixed_payment, generate_schedule};
    use crate::overpayment::ExtraFrequency;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn mortgage() -> (LoanTerms, LoanSchedule) {
        let terms = LoanTerms::repayment(200_000.0, 3.5, 25);
        let schedule = generate_schedule(&terms).unwrap();
        (terms, schedule)
    }

    #[test]
    fn test_no_extras_leaves_schedule_unchanged() {
        let (terms, baseline) = mortgage();
        let result = apply_extra_payments(&baseline, &terms, &[]).unwrap();

        assert_eq!(result.modified, baseline.entries);
        assert_eq!(result.months_saved, 0);
        assert_eq!(result.interest_saved, 0.0);
        assert_eq!(result.total_extra_paid, 0.0);
        assert_eq!(result.roi, None);
    }

    #[test]
    fn test_monthly_extra_matches_higher_fixed_payment() {
        let (terms, baseline) = mortgage();
        let result = apply_extra_payments(&baseline, &terms, &[ExtraPayment::monthly(200.0, 1)]).unwrap();

        let direct = amortize_fixed_payment(200_000.0, 3.5, baseline.monthly_payment + 200.0, 300).unwrap();
        assert_eq!(result.modified.len(), direct.len());

        let direct_interest: f64 = direct.iter().map(|e| e.interest_payment).sum();
        let modified_interest: f64 = result.modified.iter().map(|e| e.interest_payment).sum();
        assert_abs_diff_eq!(modified_interest, direct_interest, epsilon = 1e-4);

        assert!(result.months_saved > 0);
        assert!(result.interest_saved > 0.0);
        assert!(result.roi.unwrap() > 0.0);
        assert_eq!(result.modified.last().unwrap().balance, 0.0);
    }

    #[test]
    fn test_months_before_first_extra_are_copied() {
        let (terms, baseline) = mortgage();
        let result = apply_extra_payments(&baseline, &terms, &[ExtraPayment::lump_sum(10_000.0, 13)]).unwrap();

        assert_eq!(&result.modified[..12], &baseline.entries[..12]);
        let month_13 = &result.modified[12];
        assert_eq!(month_13.extra_payment, 10_000.0);
        assert_abs_diff_eq!(month_13.payment, baseline.entries[12].payment, epsilon = 1e-9);
        assert_abs_diff_eq!(month_13.balance, baseline.entries[12].balance - 10_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.total_extra_paid, 10_000.0, epsilon = 1e-12);
    }

    #[test]
    fn test_lump_sum_capped_by_balance() {
        let terms = LoanTerms::repayment(10_000.0, 12.0, 1);
        let baseline = generate_schedule(&terms).unwrap();
        let result = apply_extra_payments(&baseline, &terms, &[ExtraPayment::lump_sum(50_000.0, 3)]).unwrap();

        assert_eq!(result.modified.len(), 3);
        assert_eq!(result.months_saved, 9);
        assert_abs_diff_eq!(result.total_extra_paid, baseline.entries[2].balance, epsilon = 1e-9);
        assert_eq!(result.modified[2].balance, 0.0);
    }

    #[test]
    fn test_overlapping_extras_are_additive() {
        let (terms, baseline) = mortgage();
        let extras = [
            ExtraPayment::new(300.0, ExtraFrequency::Quarterly, 3),
            ExtraPayment::new(1_000.0, ExtraFrequency::Annually, 12),
        ];
        let result = apply_extra_payments(&baseline, &terms, &extras).unwrap();

        assert_eq!(result.modified[2].extra_payment, 300.0);
        assert_eq!(result.modified[11].extra_payment, 1_300.0);
        assert_eq!(result.modified[10].extra_payment, 0.0);
    }

    #[test]
    fn test_extra_during_grace_reduces_balance() {
        let terms = LoanTerms::repayment(50_000.0, 6.0, 10).with_grace_period(6);
        let baseline = generate_schedule(&terms).unwrap();
        let result = apply_extra_payments(&baseline, &terms, &[ExtraPayment::lump_sum(5_000.0, 2)]).unwrap();

        let month_2 = &result.modified[1];
        assert!(month_2.is_grace_period);
        assert_eq!(month_2.payment, 0.0);
        assert_abs_diff_eq!(month_2.balance, 45_000.0, epsilon = 1e-9);
        assert!(result.modified[2].interest_payment < baseline.entries[2].interest_payment);
        assert!(result.months_saved > 0);
    }

    #[test]
    fn test_interest_only_extra_starts_amortizing() {
        let terms = LoanTerms::interest_only(100_000.0, 5.0, 5);
        let baseline = generate_schedule(&terms).unwrap();
        let result = apply_extra_payments(&baseline, &terms, &[ExtraPayment::lump_sum(20_000.0, 1)]).unwrap();

        // Payment held at the original interest-only amount now repays principal too
        let month_2 = &result.modified[1];
        assert_abs_diff_eq!(month_2.payment, baseline.monthly_payment, epsilon = 1e-9);
        assert!(month_2.principal_payment > 0.0);
        assert_eq!(result.modified.len(), baseline.len());
        assert_eq!(result.modified.last().unwrap().balance, 0.0);
        assert!(result.interest_saved > 0.0);
    }

    #[test]
    fn test_extra_after_schedule_end_is_ignored() {
        let terms = LoanTerms::repayment(10_000.0, 5.0, 1);
        let baseline = generate_schedule(&terms).unwrap();
        let result = apply_extra_payments(&baseline, &terms, &[ExtraPayment::lump_sum(100.0, 40)]).unwrap();
        assert_eq!(result.modified, baseline.entries);
        assert_eq!(result.roi, None);
    }

    #[test]
    fn test_invalid_extra_rejected() {
        let (terms, baseline) = mortgage();
        let result = apply_extra_payments(&baseline, &terms, &[ExtraPayment::monthly(-10.0, 1)]);
        assert!(matches!(result, Err(CalcError::InvalidInput { .. })));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_extras_never_lengthen_or_cost_interest(
            principal in 5_000.0f64..800_000.0,
            rate in 0.0f64..10.0,
            years in 1u32..35,
            amount in 1.0f64..20_000.0,
            start in 1u32..120,
            frequency in prop_oneof![
                Just(ExtraFrequency::Monthly),
                Just(ExtraFrequency::Quarterly),
                Just(ExtraFrequency::Annually),
                Just(ExtraFrequency::OneTime),
            ],
        ) {
            let terms = LoanTerms::repayment(principal, rate, years);
            let baseline = generate_schedule(&terms).unwrap();
            let result = apply_extra_payments(&baseline, &terms, &[ExtraPayment::new(amount, frequency, start)]).unwrap();

            prop_assert!(result.modified.len() <= baseline.len());
            prop_assert!(result.interest_saved >= -1e-6);
            prop_assert!(result.modified.last().unwrap().balance.abs() <= 1e-6);
        }
    }
}
