use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::engine::{level_payment, period_flow, principal_per_period};
use super::{AmortizationType, LoanTerms};
use crate::error::LendingError;
use crate::time_value::monthly_rate;
use crate::types::*;
use crate::LendingResult;

/// A single installment in the amortization schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulePeriod {
    pub period: u32,
    pub opening_balance: Money,
    pub installment: Money,
    pub interest: Money,
    pub principal: Money,
    pub closing_balance: Money,
}

/// Full amortization schedule of a loan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub amortization_type: AmortizationType,
    pub monthly_rate: Rate,
    /// Price only: the level installment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_payment: Option<Money>,
    /// SAC only: the constant principal share
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_per_period: Option<Money>,
    pub periods: Vec<SchedulePeriod>,
    pub total_interest: Money,
    pub total_principal: Money,
    pub total_paid: Money,
}

/// Build the month-by-month schedule over the full term.
pub fn build_schedule(terms: &LoanTerms) -> LendingResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    terms.validate()?;

    let rate = monthly_rate(terms.annual_interest_rate);
    if rate.is_zero() {
        warnings.push("Zero interest rate: installments repay principal only".into());
    }

    let (basis, level, share) = match terms.amortization_type {
        AmortizationType::Price => {
            let payment = level_payment(terms).ok_or_else(|| LendingError::InvalidLoanTerms {
                field: "annual_interest_rate".into(),
                reason: format!(
                    "Level installment is not representable over {} months",
                    terms.term_months
                ),
            })?;
            (payment, Some(payment), None)
        }
        AmortizationType::Sac => {
            let share = principal_per_period(terms);
            (share, None, Some(share))
        }
    };

    let overflow = || LendingError::InvalidLoanTerms {
        field: "principal".into(),
        reason: format!(
            "Schedule amounts are not representable at {}% over {} months",
            terms.annual_interest_rate, terms.term_months
        ),
    };

    let mut periods = Vec::with_capacity(terms.term_months as usize);
    let mut balance = terms.principal;
    let mut total_interest = Decimal::ZERO;
    let mut total_principal = Decimal::ZERO;

    for period in 1..=terms.term_months {
        let opening = balance;
        let flow =
            period_flow(terms.amortization_type, opening, rate, basis).ok_or_else(overflow)?;
        let installment = flow.installment().ok_or_else(overflow)?;

        balance = balance.checked_sub(flow.principal).ok_or_else(overflow)?;
        total_interest = total_interest
            .checked_add(flow.interest)
            .ok_or_else(overflow)?;
        total_principal = total_principal
            .checked_add(flow.principal)
            .ok_or_else(overflow)?;

        periods.push(SchedulePeriod {
            period,
            opening_balance: opening,
            installment,
            interest: flow.interest,
            principal: flow.principal,
            closing_balance: balance,
        });
    }
    let total_paid = total_interest
        .checked_add(total_principal)
        .ok_or_else(overflow)?;

    let output = ScheduleOutput {
        amortization_type: terms.amortization_type,
        monthly_rate: rate,
        level_payment: level,
        principal_per_period: share,
        periods,
        total_interest,
        total_principal,
        total_paid,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        &format!("{} amortization schedule", terms.amortization_type),
        &serde_json::json!({
            "principal": terms.principal.to_string(),
            "annual_interest_rate_pct": terms.annual_interest_rate.to_string(),
            "term_months": terms.term_months,
            "compounding": "monthly, nominal annual rate / 12",
        }),
        warnings,
        elapsed,
        output,
    ))
}
