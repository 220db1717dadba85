use log::debug;

/// Monthly fractional rate for an annual percentage (8.5 -> 0.0070833..).
/// Non-positive rates are treated as interest-free.
pub fn monthly_rate(annual_rate_percent: f64) -> f64 {
    if annual_rate_percent <= 0. {
        0.
    } else {
        annual_rate_percent / 12. / 100.
    }
}

/// Fixed monthly installment for a reducing-balance loan.
///
/// Uses the annuity formula `P * r * (1 + r)^n / ((1 + r)^n - 1)` with
/// `r = annual_rate_percent / 12 / 100`. A zero (or negative) rate falls back
/// to straight-line repayment `P / n`. Returns 0 when the principal or tenure
/// is not positive.
pub fn compute_installment(principal: f64, annual_rate_percent: f64, tenure_months: i32) -> f64 {
    if principal <= 0. || tenure_months <= 0 {
        debug!(
            "no installment for principal {}, tenure {} months",
            principal, tenure_months
        );
        return 0.;
    }

    let rate = monthly_rate(annual_rate_percent);
    if rate == 0. {
        return principal / tenure_months as f64;
    }

    let factor = (1. + rate).powi(tenure_months);
    if factor.is_infinite() {
        // tenure so long the installment converges to interest only
        return principal * rate;
    }
    (principal * rate * factor) / (factor - 1.)
}

#[cfg(test)]
mod tests {
    use super::{compute_installment, monthly_rate};
    use test_log::test;

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(12.), 0.01);
        assert_eq!(monthly_rate(0.), 0.);
        assert_eq!(monthly_rate(-3.), 0.);
        assert!((monthly_rate(8.5) - 0.007_083_333).abs() < 1e-9);
    }

    #[test]
    fn test_home_loan_installment() {
        let emi = compute_installment(1_000_000., 8.5, 240);
        assert!((emi - 8678.23).abs() < 0.01, "emi was {}", emi);
        assert_eq!(format!("{:.2}", emi), "8678.23");
    }

    #[test]
    fn test_installment_matches_annuity_formula() {
        for &(principal, rate, months) in &[
            (200_000., 7., 180),
            (50_000., 10.5, 36),
            (2_500_000., 6.75, 360),
            (10_000., 24., 12),
        ] {
            let r: f64 = rate / 12. / 100.;
            let expected = principal * r * (1. + r).powf(months as f64)
                / ((1. + r).powf(months as f64) - 1.);
            let emi = compute_installment(principal, rate, months);
            assert!(
                (emi - expected).abs() < 1e-6,
                "{} @ {}% over {}: {} vs {}",
                principal,
                rate,
                months,
                emi,
                expected
            );
        }

        // same figure the monthly-compounding 15 year loan produces
        assert_eq!(
            format!("{:.4}", compute_installment(200_000., 7., 180)),
            "1797.6565"
        );
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        assert_eq!(compute_installment(120_000., 0., 12), 10_000.);
        assert_eq!(compute_installment(1000., 0., 3), 1000. / 3.);
        assert_eq!(compute_installment(1000., -1., 4), 250.);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(compute_installment(0., 8.5, 240), 0.);
        assert_eq!(compute_installment(-500., 8.5, 240), 0.);
        assert_eq!(compute_installment(1_000_000., 8.5, 0), 0.);
        assert_eq!(compute_installment(1_000_000., 8.5, -12), 0.);
    }

    #[test]
    fn test_unbounded_tenure_is_interest_only() {
        let emi = compute_installment(1000., 5., i32::MAX);
        assert!(emi.is_finite());
        assert!((emi - 1000. * 5. / 12. / 100.).abs() < 1e-9);
    }

    #[test]
    fn test_single_month_repays_principal_plus_interest() {
        let emi = compute_installment(1000., 12., 1);
        assert!((emi - 1010.).abs() < 1e-9);
    }
}
