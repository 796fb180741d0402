use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{AmortizationType, LoanTerms};
use crate::error::LendingError;
use crate::time_value::{monthly_rate, pmt};
use crate::types::{Money, Percent, Rate};
use crate::LendingResult;

const HUNDRED: Decimal = dec!(100);

/// Position of a loan after a given number of installments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSnapshot {
    /// Price: the level installment. SAC: the installment due next period
    /// (zero once the term is exhausted).
    pub payment: Money,
    /// SAC only: the constant principal share of each installment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_per_period: Option<Money>,
    pub remaining_principal: Money,
    pub accumulated_interest: Money,
    /// Share of the principal already repaid, in [0, 100]
    pub progress_percentage: Percent,
    pub payments_made: u32,
    pub payments_remaining: u32,
    /// Set when the projection overflowed and the whole principal is
    /// reported as outstanding.
    pub fallback_applied: bool,
}

impl AmortizationSnapshot {
    /// Force the terminal position of a settled contract.
    pub fn settled(mut self) -> Self {
        self.remaining_principal = Decimal::ZERO;
        self.progress_percentage = HUNDRED;
        self.payments_remaining = 0;
        self
    }
}

/// Interest and principal components of one installment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PeriodFlow {
    pub interest: Money,
    pub principal: Money,
}

impl PeriodFlow {
    pub fn installment(&self) -> Option<Money> {
        self.interest.checked_add(self.principal)
    }
}

/// Split the installment for a period starting at `balance`.
///
/// `basis` is the level payment for Price and the constant principal share
/// for SAC. `None` when the interest is not representable.
pub(crate) fn period_flow(
    kind: AmortizationType,
    balance: Money,
    rate: Rate,
    basis: Money,
) -> Option<PeriodFlow> {
    let interest = balance.checked_mul(rate)?;
    let principal = match kind {
        AmortizationType::Price => basis.checked_sub(interest)?,
        AmortizationType::Sac => basis,
    };
    Some(PeriodFlow {
        interest,
        principal,
    })
}

/// Walk `periods` installments from the full principal.
///
/// Returns the closing balance and the interest charged so far.
fn walk(
    kind: AmortizationType,
    principal: Money,
    rate: Rate,
    basis: Money,
    periods: u32,
) -> Option<(Money, Money)> {
    let mut balance = principal;
    let mut total_interest = Decimal::ZERO;
    for _ in 0..periods {
        let flow = period_flow(kind, balance, rate, basis)?;
        total_interest = total_interest.checked_add(flow.interest)?;
        balance = balance.checked_sub(flow.principal)?;
    }
    Some((balance, total_interest))
}

/// Level Price installment, `None` when it is not representable.
pub(crate) fn level_payment(terms: &LoanTerms) -> Option<Money> {
    pmt(
        monthly_rate(terms.annual_interest_rate),
        terms.term_months,
        terms.principal,
    )
}

/// Constant SAC principal share.
pub(crate) fn principal_per_period(terms: &LoanTerms) -> Money {
    terms.principal / Decimal::from(terms.term_months)
}

/// Project remaining principal and interest paid after `payments_made`
/// installments.
pub fn compute_amortization(
    terms: &LoanTerms,
    payments_made: u32,
) -> LendingResult<AmortizationSnapshot> {
    terms.validate()?;
    if payments_made > terms.term_months {
        return Err(LendingError::InvalidLoanTerms {
            field: "payments_made".into(),
            reason: format!(
                "{payments_made} payments exceed the {}-month term",
                terms.term_months
            ),
        });
    }

    let rate = monthly_rate(terms.annual_interest_rate);
    let snapshot = match terms.amortization_type {
        AmortizationType::Price => project_price(terms, rate, payments_made),
        AmortizationType::Sac => project_sac(terms, rate, payments_made),
    };
    Ok(snapshot)
}

fn outstanding_fallback(
    terms: &LoanTerms,
    payments_made: u32,
    principal_per_period: Option<Money>,
) -> AmortizationSnapshot {
    log::warn!(
        "{} projection not representable (principal {}, rate {}%, {} months); reporting full principal outstanding",
        terms.amortization_type,
        terms.principal,
        terms.annual_interest_rate,
        terms.term_months
    );
    AmortizationSnapshot {
        payment: Decimal::ZERO,
        principal_per_period,
        remaining_principal: terms.principal,
        accumulated_interest: Decimal::ZERO,
        progress_percentage: Decimal::ZERO,
        payments_made,
        payments_remaining: terms.term_months - payments_made,
        fallback_applied: true,
    }
}

fn project_price(terms: &LoanTerms, rate: Rate, payments_made: u32) -> AmortizationSnapshot {
    let projected = level_payment(terms).and_then(|payment| {
        walk(
            AmortizationType::Price,
            terms.principal,
            rate,
            payment,
            payments_made,
        )
        .map(|(balance, interest)| (payment, balance, interest))
    });
    let Some((payment, balance, total_interest)) = projected else {
        return outstanding_fallback(terms, payments_made, None);
    };

    let remaining = balance.max(Decimal::ZERO);
    AmortizationSnapshot {
        payment,
        principal_per_period: None,
        remaining_principal: remaining,
        accumulated_interest: total_interest.max(Decimal::ZERO),
        progress_percentage: progress(terms.principal, remaining),
        payments_made,
        payments_remaining: terms.term_months - payments_made,
        fallback_applied: false,
    }
}

fn project_sac(terms: &LoanTerms, rate: Rate, payments_made: u32) -> AmortizationSnapshot {
    let share = principal_per_period(terms);

    let projected = walk(
        AmortizationType::Sac,
        terms.principal,
        rate,
        share,
        payments_made,
    )
    .and_then(|(balance, interest)| {
        let repaid = share.checked_mul(Decimal::from(payments_made))?;
        let remaining = terms.principal.checked_sub(repaid)?.max(Decimal::ZERO);
        let next_installment = if payments_made < terms.term_months {
            period_flow(AmortizationType::Sac, balance.max(Decimal::ZERO), rate, share)?
                .installment()?
        } else {
            Decimal::ZERO
        };
        Some((remaining, interest, next_installment))
    });
    let Some((remaining, total_interest, next_installment)) = projected else {
        return outstanding_fallback(terms, payments_made, Some(share));
    };

    AmortizationSnapshot {
        payment: next_installment,
        principal_per_period: Some(share),
        remaining_principal: remaining,
        accumulated_interest: total_interest.max(Decimal::ZERO),
        progress_percentage: progress(terms.principal, remaining),
        payments_made,
        payments_remaining: terms.term_months - payments_made,
        fallback_applied: false,
    }
}

fn progress(principal: Money, remaining: Money) -> Percent {
    ((principal - remaining) / principal * HUNDRED).clamp(Decimal::ZERO, HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn price_10k() -> LoanTerms {
        LoanTerms {
            principal: dec!(10000),
            annual_interest_rate: dec!(5),
            term_months: 12,
            amortization_type: AmortizationType::Price,
        }
    }

    fn sac_25k() -> LoanTerms {
        LoanTerms {
            principal: dec!(25000),
            annual_interest_rate: dec!(4.5),
            term_months: 24,
            amortization_type: AmortizationType::Sac,
        }
    }

    #[test]
    fn test_price_midway() {
        let snap = compute_amortization(&price_10k(), 6).unwrap();
        assert!((snap.payment - dec!(856.07)).abs() < dec!(0.01));
        // Iterative projection of the level installment: ~5062.37 left
        assert!((snap.remaining_principal - dec!(5062.37)).abs() < dec!(0.01));
        assert!((snap.accumulated_interest - dec!(198.82)).abs() < dec!(0.01));
        assert_eq!(snap.payments_remaining, 6);
        assert!(!snap.fallback_applied);
    }

    #[test]
    fn test_sac_midway() {
        let snap = compute_amortization(&sac_25k(), 12).unwrap();
        let share = snap.principal_per_period.unwrap();
        assert!((share - dec!(1041.67)).abs() < dec!(0.01));
        assert!((snap.remaining_principal - dec!(12500)).abs() < dec!(0.0001));
        // Interest on 25000, 23958.33, ... over 12 months at 0.375%/month
        assert!((snap.accumulated_interest - dec!(867.1875)).abs() < dec!(0.0001));
        assert!((snap.progress_percentage - dec!(50)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_sac_next_installment() {
        let snap = compute_amortization(&sac_25k(), 0).unwrap();
        // 1041.67 principal + 25000 * 0.00375 interest
        assert!((snap.payment - dec!(1135.4167)).abs() < dec!(0.001));

        let done = compute_amortization(&sac_25k(), 24).unwrap();
        assert_eq!(done.payment, Decimal::ZERO);
    }

    #[test]
    fn test_zero_payments_is_initial_state() {
        for terms in [price_10k(), sac_25k()] {
            let snap = compute_amortization(&terms, 0).unwrap();
            assert_eq!(snap.remaining_principal, terms.principal);
            assert_eq!(snap.accumulated_interest, Decimal::ZERO);
            assert_eq!(snap.progress_percentage, Decimal::ZERO);
        }
    }

    #[test]
    fn test_full_term_pays_off() {
        for terms in [price_10k(), sac_25k()] {
            let snap = compute_amortization(&terms, terms.term_months).unwrap();
            assert!(snap.remaining_principal < dec!(0.000001));
            assert!((snap.progress_percentage - dec!(100)).abs() < dec!(0.000001));
        }
    }

    #[test]
    fn test_zero_rate_price() {
        let mut terms = price_10k();
        terms.annual_interest_rate = Decimal::ZERO;
        let snap = compute_amortization(&terms, 3).unwrap();
        assert_eq!(snap.payment, dec!(10000) / dec!(12));
        assert_eq!(snap.accumulated_interest, Decimal::ZERO);
        assert!((snap.remaining_principal - dec!(7500)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_unrepresentable_payment_falls_back() {
        let terms = LoanTerms {
            principal: dec!(1000),
            annual_interest_rate: dec!(12000),
            term_months: 600,
            amortization_type: AmortizationType::Price,
        };
        let snap = compute_amortization(&terms, 10).unwrap();
        assert!(snap.fallback_applied);
        assert_eq!(snap.remaining_principal, dec!(1000));
        assert_eq!(snap.accumulated_interest, Decimal::ZERO);
    }

    #[test]
    fn test_sac_overflow_falls_back() {
        let terms = LoanTerms {
            principal: dec!(100000000000000000000),
            annual_interest_rate: dec!(1000000000000),
            term_months: 12,
            amortization_type: AmortizationType::Sac,
        };
        for k in [0, 1, 12] {
            let snap = compute_amortization(&terms, k).unwrap();
            assert!(snap.fallback_applied, "k={k}");
            assert_eq!(snap.remaining_principal, terms.principal);
            assert_eq!(snap.payment, Decimal::ZERO);
            assert_eq!(snap.payments_made, k);
        }
    }

    #[test]
    fn test_period_flow_overflow_is_none() {
        let flow = period_flow(
            AmortizationType::Sac,
            Decimal::MAX,
            dec!(2),
            Decimal::ONE,
        );
        assert_eq!(flow, None);
    }

    #[test]
    fn test_payments_beyond_term_rejected() {
        let err = compute_amortization(&price_10k(), 13).unwrap_err();
        assert!(matches!(err, LendingError::InvalidLoanTerms { ref field, .. } if field == "payments_made"));
    }

    #[test]
    fn test_zero_term_rejected() {
        let mut terms = sac_25k();
        terms.term_months = 0;
        assert!(matches!(
            compute_amortization(&terms, 0),
            Err(LendingError::InvalidLoanTerms { .. })
        ));
    }

    #[test]
    fn test_settled_override() {
        let snap = compute_amortization(&price_10k(), 12).unwrap().settled();
        assert_eq!(snap.remaining_principal, Decimal::ZERO);
        assert_eq!(snap.progress_percentage, dec!(100));
    }

    #[test]
    fn test_deterministic() {
        let a = compute_amortization(&price_10k(), 7).unwrap();
        let b = compute_amortization(&price_10k(), 7).unwrap();
        assert_eq!(a, b);
    }
}
