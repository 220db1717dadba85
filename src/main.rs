use chrono::NaiveDate;
use emi::loan::*;
use emi::schedule::*;
use log::{info, warn};
use simple_logger::SimpleLogger;

fn main() {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()
        .unwrap();

    let terms = LoanTerms::from_years(1_000_000., 8.5, 20.);
    let mut prepayments = PrepaymentMap::new();
    prepayments.insert(12, 100_000.);
    prepayments.insert(24, 100_000.);

    if let Err(e) = terms.validate_with_prepayments(&LoanLimits::default(), &prepayments) {
        warn!("{}", e);
        return;
    }

    info!("{}, installment ${:.2}", terms, terms.installment());

    let rows = terms.schedule(&prepayments);
    let first_pmt_date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    for (row, date) in rows.iter().zip(payment_dates(first_pmt_date, rows.len())) {
        println!("{} {}", date, row);
    }

    info!("{}", ScheduleSummary::from_rows(&rows));
    let impact = prepayment_impact(
        terms.principal,
        terms.annual_rate_percent,
        terms.tenure_months,
        &prepayments,
    );
    info!(
        "prepayments save {} months and ${:.2} in interest",
        impact.months_saved, impact.interest_saved
    );
}

// verifies that types can implement the gated traits below
#[cfg(test)]
fn is_normal<T: Sized + Send + Sync + Unpin>() {}

#[test]
fn normal_types() {
    is_normal::<AmortizationRow>();
    is_normal::<ScheduleSummary>();
    is_normal::<LoanTerms>();
    is_normal::<LoanError>();
}
