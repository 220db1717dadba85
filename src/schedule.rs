use chrono::{Months, NaiveDate};
use log::{debug, trace};
use std::{collections::HashMap, fmt};

use crate::emi::{compute_installment, monthly_rate};

/// Extra principal payments keyed by 1-based month.
pub type PrepaymentMap = HashMap<i32, f64>;

/// Balance at or below which the loan is considered repaid, in currency units.
pub const DEFAULT_BALANCE_EPSILON: f64 = 0.01;

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleOptions {
    pub balance_epsilon: f64,
}

impl ScheduleOptions {
    /// Epsilon actually used by the generator. Non-finite or negative values
    /// fall back to [`DEFAULT_BALANCE_EPSILON`].
    pub fn effective_balance_epsilon(&self) -> f64 {
        if self.balance_epsilon.is_finite() && self.balance_epsilon >= 0. {
            self.balance_epsilon
        } else {
            DEFAULT_BALANCE_EPSILON
        }
    }
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            balance_epsilon: DEFAULT_BALANCE_EPSILON,
        }
    }
}

/// One month of the ledger.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AmortizationRow {
    pub month: i32,
    pub opening_balance: f64,
    pub interest: f64,
    pub principal: f64,
    pub prepayment: f64,
    pub total_payment: f64,
    pub closing_balance: f64,
}

impl fmt::Display for AmortizationRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "month {}, opening ${:.2}, interest ${:.2}, principal ${:.2}, prepayment ${:.2}, payment ${:.2}, closing ${:.2}",
            self.month,
            self.opening_balance,
            self.interest,
            self.principal,
            self.prepayment,
            self.total_payment,
            self.closing_balance
        )
    }
}

/// Month-by-month schedule using the default balance epsilon.
pub fn generate_schedule(
    principal: f64,
    annual_rate_percent: f64,
    tenure_months: i32,
    prepayments: &PrepaymentMap,
) -> Vec<AmortizationRow> {
    generate_schedule_with(
        principal,
        annual_rate_percent,
        tenure_months,
        prepayments,
        &ScheduleOptions::default(),
    )
}

/// Month-by-month schedule for a fixed-rate reducing-balance loan.
///
/// The installment is computed once and held for the whole run, so
/// prepayments shorten the schedule instead of lowering the installment.
/// Stops after `tenure_months` rows or as soon as the balance drops to
/// `options.balance_epsilon`, whichever comes first. Non-positive principal
/// or tenure yields an empty schedule.
pub fn generate_schedule_with(
    principal: f64,
    annual_rate_percent: f64,
    tenure_months: i32,
    prepayments: &PrepaymentMap,
    options: &ScheduleOptions,
) -> Vec<AmortizationRow> {
    if principal <= 0. || tenure_months <= 0 {
        debug!(
            "empty schedule for principal {}, tenure {} months",
            principal, tenure_months
        );
        return Vec::new();
    }

    let rate = monthly_rate(annual_rate_percent);
    let installment = compute_installment(principal, annual_rate_percent, tenure_months);
    trace!("monthly rate {}, installment {}", rate, installment);

    let balance_epsilon = options.effective_balance_epsilon();
    let mut rows: Vec<AmortizationRow> = Vec::new();
    let mut remaining_balance = principal;

    for month in 1..=tenure_months {
        if remaining_balance <= balance_epsilon {
            debug!(
                "loan repaid after {} of {} months",
                month - 1,
                tenure_months
            );
            break;
        }

        let opening_balance = remaining_balance;
        let interest = opening_balance * rate;
        // never amortize negatively: a shortfall against interest repays nothing
        let scheduled_principal = (installment - interest).min(opening_balance).max(0.);
        let prepayment = prepayments.get(&month).copied().unwrap_or(0.).max(0.);

        let mut closing_balance = opening_balance - scheduled_principal - prepayment;
        let mut applied_prepayment = prepayment;
        if closing_balance < 0. {
            // only the part of the prepayment needed to settle the loan is applied
            applied_prepayment = prepayment + closing_balance;
            closing_balance = 0.;
        }

        let row = AmortizationRow {
            month,
            opening_balance: opening_balance.max(0.),
            interest: interest.max(0.),
            principal: scheduled_principal.max(0.),
            prepayment: applied_prepayment.max(0.),
            total_payment: (interest + scheduled_principal + applied_prepayment).max(0.),
            closing_balance: closing_balance.max(0.),
        };
        trace!("{}", row);
        rows.push(row);

        remaining_balance = row.closing_balance;
    }
    rows
}

/// Aggregate totals over a generated schedule.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleSummary {
    pub total_interest: f64,
    pub total_principal: f64,
    pub total_prepayment: f64,
    pub total_payment: f64,
    pub actual_tenure_months: usize,
}

impl ScheduleSummary {
    pub fn from_rows(rows: &[AmortizationRow]) -> Self {
        rows.iter().fold(
            Self {
                actual_tenure_months: rows.len(),
                ..Self::default()
            },
            |acc, row| Self {
                total_interest: acc.total_interest + row.interest,
                total_principal: acc.total_principal + row.principal,
                total_prepayment: acc.total_prepayment + row.prepayment,
                total_payment: acc.total_payment + row.total_payment,
                ..acc
            },
        )
    }
}

impl fmt::Display for ScheduleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} months, interest ${:.2}, principal ${:.2}, prepayments ${:.2}, total paid ${:.2}",
            self.actual_tenure_months,
            self.total_interest,
            self.total_principal,
            self.total_prepayment,
            self.total_payment
        )
    }
}

/// What a set of prepayments saves compared with the plain schedule.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrepaymentImpact {
    pub months_saved: usize,
    pub interest_saved: f64,
}

pub fn prepayment_impact(
    principal: f64,
    annual_rate_percent: f64,
    tenure_months: i32,
    prepayments: &PrepaymentMap,
) -> PrepaymentImpact {
    let baseline = ScheduleSummary::from_rows(&generate_schedule(
        principal,
        annual_rate_percent,
        tenure_months,
        &PrepaymentMap::new(),
    ));
    let with_prepayments = ScheduleSummary::from_rows(&generate_schedule(
        principal,
        annual_rate_percent,
        tenure_months,
        prepayments,
    ));

    let impact = PrepaymentImpact {
        months_saved: baseline
            .actual_tenure_months
            .saturating_sub(with_prepayments.actual_tenure_months),
        interest_saved: (baseline.total_interest - with_prepayments.total_interest).max(0.),
    };
    debug!(
        "prepayments save {} months and ${:.2} interest",
        impact.months_saved, impact.interest_saved
    );
    impact
}

/// Due date for each of `count` monthly payments starting at `first_pmt_date`.
/// Days past the end of a shorter month are clamped to its last day.
pub fn payment_dates(first_pmt_date: NaiveDate, count: usize) -> Vec<NaiveDate> {
    (0..count)
        .map_while(|k| {
            let months = u32::try_from(k).ok()?;
            first_pmt_date.checked_add_months(Months::new(months))
        })
        .collect()
}
