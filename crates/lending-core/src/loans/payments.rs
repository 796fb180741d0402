use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::{Loan, LoanStatus, Payment, PaymentType};
use crate::error::LendingError;
use crate::types::Money;
use crate::LendingResult;

const DATE_FORMAT: &str = "%Y-%m-%d";
const CENTS: u32 = 2;

/// A payment as submitted by the caller, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Ignored for settlements: the payoff amount is fixed by the engine.
    #[serde(default)]
    pub amount: Money,
    /// ISO date (`YYYY-MM-DD`)
    #[serde(default)]
    pub date: Option<String>,
    #[serde(rename = "type", alias = "payment_type")]
    pub payment_type: PaymentType,
    #[serde(default)]
    pub remarks: Option<String>,
}

/// Payoff amount for the loan: the engine's remaining principal, rounded
/// to cents.
///
/// A positive balance below half a cent is quoted as one cent so the
/// settlement stays payable.
pub fn settlement_quote(loan: &Loan) -> LendingResult<Money> {
    let remaining = loan.snapshot()?.remaining_principal;
    let quote = remaining.round_dp_with_strategy(CENTS, RoundingStrategy::MidpointAwayFromZero);
    if quote.is_zero() && remaining > Decimal::ZERO {
        return Ok(Decimal::new(1, CENTS));
    }
    Ok(quote)
}

fn parse_payment_date(raw: Option<&str>) -> LendingResult<NaiveDate> {
    let value = raw.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(LendingError::InvalidPaymentDate {
            value: "<missing>".into(),
        });
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| LendingError::InvalidPaymentDate {
        value: value.to_string(),
    })
}

/// Validate a payment against a loan and return the updated loan.
///
/// The input loan is never modified; on error the caller keeps its state.
pub fn register_payment(loan: &Loan, request: &PaymentRequest) -> LendingResult<Loan> {
    apply_payment(loan, request).map(|(updated, _)| updated)
}

/// Same as [`register_payment`], also returning the appended record.
pub(crate) fn apply_payment(
    loan: &Loan,
    request: &PaymentRequest,
) -> LendingResult<(Loan, Payment)> {
    loan.terms.validate()?;
    if loan.payments_made > loan.terms.term_months {
        return Err(LendingError::InvalidLoanTerms {
            field: "payments_made".into(),
            reason: format!(
                "{} payments exceed the {}-month term",
                loan.payments_made, loan.terms.term_months
            ),
        });
    }
    if loan.is_settled() || loan.payments_made >= loan.terms.term_months {
        return Err(LendingError::LoanAlreadySettled {
            loan_id: loan.id.clone(),
        });
    }

    let date = parse_payment_date(request.date.as_deref())?;

    let amount = match request.payment_type {
        PaymentType::Settlement => settlement_quote(loan)?,
        PaymentType::Amortization | PaymentType::Renewal => request.amount,
    };
    if amount <= Decimal::ZERO {
        return Err(LendingError::InvalidPaymentAmount { amount });
    }

    let mut updated = loan.clone();
    updated.payments_made = loan.payments_made + 1;
    let payment = Payment {
        amount,
        date,
        payment_type: request.payment_type,
        remarks: request.remarks.clone().filter(|r| !r.trim().is_empty()),
    };
    updated.payment_history.push(payment.clone());

    if updated.payments_made == updated.terms.term_months {
        updated.status = LoanStatus::Paid;
        updated.next_payment_date = None;
    } else {
        updated.next_payment_date = loan
            .next_payment_date
            .and_then(|d| d.checked_add_months(Months::new(1)));
    }

    log::debug!(
        "Loan {}: {:?} payment of {} on {} accepted ({}/{} installments, {})",
        updated.id,
        request.payment_type,
        amount,
        date,
        updated.payments_made,
        updated.terms.term_months,
        updated.status
    );

    Ok((updated, payment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::{compute_amortization, AmortizationType, LoanTerms};
    use rust_decimal_macros::dec;

    fn loan() -> Loan {
        let mut l = Loan::new(
            "loan1",
            "1",
            LoanTerms {
                principal: dec!(5000),
                annual_interest_rate: dec!(5),
                term_months: 12,
                amortization_type: AmortizationType::Price,
            },
            NaiveDate::from_ymd_opt(2023, 10, 1).unwrap(),
        )
        .unwrap();
        l.payments_made = 3;
        l.next_payment_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        l
    }

    fn request(amount: Money, date: Option<&str>, kind: PaymentType) -> PaymentRequest {
        PaymentRequest {
            amount,
            date: date.map(String::from),
            payment_type: kind,
            remarks: None,
        }
    }

    #[test]
    fn test_accepts_installment() {
        let before = loan();
        let after = register_payment(
            &before,
            &request(dec!(428.04), Some("2024-01-01"), PaymentType::Amortization),
        )
        .unwrap();

        assert_eq!(after.payments_made, 4);
        assert_eq!(after.status, LoanStatus::Active);
        assert_eq!(after.payment_history.len(), 1);
        assert_eq!(after.payment_history[0].amount, dec!(428.04));
        assert_eq!(after.next_payment_date, NaiveDate::from_ymd_opt(2024, 2, 1));
        // Original untouched
        assert_eq!(before.payments_made, 3);
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        for amount in [Decimal::ZERO, dec!(-10)] {
            let err = register_payment(
                &loan(),
                &request(amount, Some("2024-01-01"), PaymentType::Amortization),
            )
            .unwrap_err();
            assert_eq!(err, LendingError::InvalidPaymentAmount { amount });
        }
    }

    #[test]
    fn test_rejects_missing_or_bad_date() {
        let missing = register_payment(&loan(), &request(dec!(10), None, PaymentType::Renewal));
        assert!(matches!(missing, Err(LendingError::InvalidPaymentDate { .. })));

        let blank = register_payment(&loan(), &request(dec!(10), Some("  "), PaymentType::Renewal));
        assert!(matches!(blank, Err(LendingError::InvalidPaymentDate { .. })));

        let bad = register_payment(
            &loan(),
            &request(dec!(10), Some("2024-13-45"), PaymentType::Renewal),
        );
        assert_eq!(
            bad.unwrap_err(),
            LendingError::InvalidPaymentDate {
                value: "2024-13-45".into()
            }
        );
    }

    #[test]
    fn test_settlement_amount_is_engine_remaining() {
        let l = loan();
        let expected = l
            .snapshot()
            .unwrap()
            .remaining_principal
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        // Caller-supplied amount is ignored
        let after = register_payment(
            &l,
            &request(dec!(1), Some("2024-01-01"), PaymentType::Settlement),
        )
        .unwrap();

        assert_eq!(after.payment_history[0].amount, expected);
        assert_eq!(after.payments_made, 4);
        assert_eq!(after.status, LoanStatus::Active);
        assert_eq!(after.next_payment_date, NaiveDate::from_ymd_opt(2024, 2, 1));
    }

    #[test]
    fn test_settlement_counts_one_period_of_interest() {
        let l = loan();
        let after = register_payment(
            &l,
            &request(Decimal::ZERO, Some("2024-01-01"), PaymentType::Settlement),
        )
        .unwrap();

        let charged = compute_amortization(&l.terms, 4).unwrap();
        let full_term = compute_amortization(&l.terms, 12).unwrap();
        let snap = after.snapshot().unwrap();
        assert_eq!(snap.accumulated_interest, charged.accumulated_interest);
        assert!(snap.accumulated_interest < full_term.accumulated_interest);
    }

    #[test]
    fn test_settlement_on_last_installment_closes_loan() {
        let mut l = loan();
        l.payments_made = 11;
        let after = register_payment(
            &l,
            &request(Decimal::ZERO, Some("2024-09-01"), PaymentType::Settlement),
        )
        .unwrap();
        assert_eq!(after.payments_made, 12);
        assert_eq!(after.status, LoanStatus::Paid);
        assert_eq!(after.next_payment_date, None);
        assert_eq!(after.snapshot().unwrap().remaining_principal, Decimal::ZERO);
    }

    #[test]
    fn test_sub_cent_balance_quotes_one_cent() {
        let mut l = Loan::new(
            "tiny",
            "1",
            LoanTerms {
                principal: dec!(0.01),
                annual_interest_rate: dec!(5),
                term_months: 12,
                amortization_type: AmortizationType::Sac,
            },
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .unwrap();
        l.payments_made = 11;

        assert!(l.snapshot().unwrap().remaining_principal < dec!(0.005));
        assert_eq!(settlement_quote(&l).unwrap(), dec!(0.01));

        let after = register_payment(
            &l,
            &request(Decimal::ZERO, Some("2024-12-01"), PaymentType::Settlement),
        )
        .unwrap();
        assert_eq!(after.payment_history[0].amount, dec!(0.01));
        assert_eq!(after.status, LoanStatus::Paid);
    }

    #[test]
    fn test_rejects_loan_with_invalid_terms() {
        let mut l = loan();
        l.terms.principal = dec!(-500);
        let err = register_payment(
            &l,
            &request(dec!(10), Some("2024-01-01"), PaymentType::Amortization),
        )
        .unwrap_err();
        assert!(matches!(err, LendingError::InvalidLoanTerms { ref field, .. } if field == "principal"));

        let mut over = loan();
        over.payments_made = 13;
        let err = register_payment(
            &over,
            &request(dec!(10), Some("2024-01-01"), PaymentType::Renewal),
        )
        .unwrap_err();
        assert!(matches!(err, LendingError::InvalidLoanTerms { ref field, .. } if field == "payments_made"));
    }

    #[test]
    fn test_settlement_quote_differs_from_linear_estimate() {
        // Linear estimate would be 5000 * (1 - 3/12) = 3750
        let quote = settlement_quote(&loan()).unwrap();
        assert!(quote > dec!(3750));
        assert!((quote - dec!(3773.29)).abs() < dec!(0.01));
    }

    #[test]
    fn test_last_installment_settles() {
        let mut l = loan();
        l.payments_made = 11;
        let after = register_payment(
            &l,
            &request(dec!(428.04), Some("2024-09-01"), PaymentType::Amortization),
        )
        .unwrap();
        assert_eq!(after.status, LoanStatus::Paid);
        assert_eq!(after.next_payment_date, None);
    }

    #[test]
    fn test_rejects_settled_loan() {
        let mut l = loan();
        l.payments_made = 12;
        l.status = LoanStatus::Paid;
        let snapshot = l.clone();

        let err = register_payment(
            &l,
            &request(dec!(100), Some("2024-01-01"), PaymentType::Amortization),
        )
        .unwrap_err();
        assert_eq!(
            err,
            LendingError::LoanAlreadySettled {
                loan_id: "loan1".into()
            }
        );
        assert_eq!(l, snapshot);
    }

    #[test]
    fn test_overdue_status_kept_until_refresh() {
        let mut l = loan();
        l.status = LoanStatus::Overdue;
        let after = register_payment(
            &l,
            &request(dec!(428.04), Some("2024-01-05"), PaymentType::Amortization),
        )
        .unwrap();
        assert_eq!(after.status, LoanStatus::Overdue);
    }

    #[test]
    fn test_blank_remarks_dropped() {
        let mut req = request(dec!(50), Some("2024-01-01"), PaymentType::Renewal);
        req.remarks = Some("   ".into());
        let after = register_payment(&loan(), &req).unwrap();
        assert_eq!(after.payment_history[0].remarks, None);
    }
}
