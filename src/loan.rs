use log::warn;
use std::fmt;
use thiserror::Error;

use crate::emi::compute_installment;
use crate::schedule::{generate_schedule, AmortizationRow, PrepaymentMap};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoanError {
    #[error("loan amount must be greater than 0")]
    NonPositivePrincipal,

    #[error("interest rate cannot be negative")]
    NegativeRate,

    #[error("loan tenure must be at least 1 month")]
    NonPositiveTenure,

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("loan amount {principal} exceeds maximum {max}")]
    PrincipalTooLarge { principal: f64, max: f64 },

    #[error("interest rate {rate}% exceeds maximum {max}%")]
    RateTooHigh { rate: f64, max: f64 },

    #[error("loan tenure {months} months exceeds maximum {max} months")]
    TenureTooLong { months: i32, max: i32 },

    #[error("prepayment month {month} is outside the loan tenure of {tenure} months")]
    PrepaymentOutOfRange { month: i32, tenure: i32 },

    #[error("prepayment in month {month} must be greater than 0, got {amount}")]
    NonPositivePrepayment { month: i32, amount: f64 },
}

pub type Result<T> = std::result::Result<T, LoanError>;

/// Business limits applied by [`LoanTerms::validate`].
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoanLimits {
    pub max_principal: f64,
    pub max_annual_rate_percent: f64,
    pub max_tenure_months: i32,
}

impl Default for LoanLimits {
    fn default() -> Self {
        Self {
            max_principal: 10_000_000_000.,
            max_annual_rate_percent: 50.,
            max_tenure_months: 600,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoanTerms {
    pub principal: f64,
    pub annual_rate_percent: f64,
    pub tenure_months: i32,
}

impl LoanTerms {
    pub fn new(principal: f64, annual_rate_percent: f64, tenure_months: i32) -> Self {
        Self {
            principal,
            annual_rate_percent,
            tenure_months,
        }
    }

    /// Terms for a tenure given in years, rounded to the nearest whole month.
    pub fn from_years(principal: f64, annual_rate_percent: f64, tenure_years: f64) -> Self {
        Self::new(
            principal,
            annual_rate_percent,
            get_tenure_months(&tenure_years),
        )
    }

    /// Check the terms and prepayments before calculating. The calculation
    /// itself accepts anything; this is where callers surface input errors.
    pub fn validate(&self, limits: &LoanLimits) -> Result<()> {
        if !self.principal.is_finite() {
            return Err(LoanError::NotFinite { field: "loan amount" });
        }
        if !self.annual_rate_percent.is_finite() {
            return Err(LoanError::NotFinite {
                field: "interest rate",
            });
        }
        if self.principal <= 0. {
            return Err(LoanError::NonPositivePrincipal);
        }
        if self.annual_rate_percent < 0. {
            return Err(LoanError::NegativeRate);
        }
        if self.tenure_months <= 0 {
            return Err(LoanError::NonPositiveTenure);
        }
        if self.principal > limits.max_principal {
            return Err(LoanError::PrincipalTooLarge {
                principal: self.principal,
                max: limits.max_principal,
            });
        }
        if self.annual_rate_percent > limits.max_annual_rate_percent {
            return Err(LoanError::RateTooHigh {
                rate: self.annual_rate_percent,
                max: limits.max_annual_rate_percent,
            });
        }
        if self.tenure_months > limits.max_tenure_months {
            return Err(LoanError::TenureTooLong {
                months: self.tenure_months,
                max: limits.max_tenure_months,
            });
        }
        Ok(())
    }

    /// Validate the terms and every prepayment entry.
    pub fn validate_with_prepayments(
        &self,
        limits: &LoanLimits,
        prepayments: &PrepaymentMap,
    ) -> Result<()> {
        self.validate(limits)?;

        // report the earliest bad month so errors are stable across runs
        let mut months: Vec<&i32> = prepayments.keys().collect();
        months.sort();
        for &month in months {
            let amount = prepayments[&month];
            if month < 1 || month > self.tenure_months {
                return Err(LoanError::PrepaymentOutOfRange {
                    month,
                    tenure: self.tenure_months,
                });
            }
            if !amount.is_finite() {
                return Err(LoanError::NotFinite { field: "prepayment" });
            }
            if amount <= 0. {
                return Err(LoanError::NonPositivePrepayment { month, amount });
            }
        }
        Ok(())
    }

    pub fn installment(&self) -> f64 {
        compute_installment(self.principal, self.annual_rate_percent, self.tenure_months)
    }

    pub fn schedule(&self, prepayments: &PrepaymentMap) -> Vec<AmortizationRow> {
        generate_schedule(
            self.principal,
            self.annual_rate_percent,
            self.tenure_months,
            prepayments,
        )
    }
}

impl fmt::Display for LoanTerms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "principal ${:.2}, rate {}%, tenure {} months",
            self.principal, self.annual_rate_percent, self.tenure_months
        )
    }
}

fn get_tenure_months(&tenure_years: &f64) -> i32 {
    let months = (tenure_years * 12.).round();
    if months > i32::MAX as f64 {
        warn!("tenure of {} years truncated", tenure_years);
        i32::MAX
    } else {
        // NaN and negative values land at or below zero and are rejected by validate
        months as i32
    }
}
