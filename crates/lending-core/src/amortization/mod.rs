//! Price (French) and SAC (constant amortization) loan schedules.
//!
//! The engine is a set of pure functions over [`LoanTerms`] and a payment
//! count. All arithmetic uses `rust_decimal::Decimal`, so repeated
//! evaluations of the same inputs produce identical results.

pub mod engine;
pub mod schedule;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LendingError;
use crate::types::{Money, Percent};
use crate::LendingResult;

pub use engine::{compute_amortization, AmortizationSnapshot};
pub use schedule::{build_schedule, ScheduleOutput, SchedulePeriod};

/// Schedule algorithm of a loan contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmortizationType {
    /// Level installment; the interest share declines each period
    Price,
    /// Constant principal share; the installment declines each period
    #[serde(rename = "SAC", alias = "Sac")]
    Sac,
}

impl std::fmt::Display for AmortizationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AmortizationType::Price => write!(f, "Price"),
            AmortizationType::Sac => write!(f, "SAC"),
        }
    }
}

/// The immutable numeric terms of a loan contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Original amount lent
    pub principal: Money,
    /// Nominal annual rate in percent (5 = 5%)
    pub annual_interest_rate: Percent,
    /// Total number of monthly installments
    pub term_months: u32,
    pub amortization_type: AmortizationType,
}

impl LoanTerms {
    /// Reject terms that would divide by zero or run on a negative domain.
    pub fn validate(&self) -> LendingResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(LendingError::terms(
                "principal",
                "Principal must be positive",
            ));
        }
        if self.annual_interest_rate < Decimal::ZERO {
            return Err(LendingError::terms(
                "annual_interest_rate",
                "Interest rate cannot be negative",
            ));
        }
        if self.term_months == 0 {
            return Err(LendingError::terms(
                "term_months",
                "Term must be at least 1 month",
            ));
        }
        Ok(())
    }
}
