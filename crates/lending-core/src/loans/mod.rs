//! Loan contracts, their payment history and the payment registration policy.

pub mod payments;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::amortization::{compute_amortization, AmortizationSnapshot, LoanTerms};
use crate::types::Money;
use crate::LendingResult;

pub use payments::{register_payment, settlement_quote, PaymentRequest};

/// Lifecycle state of a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanStatus {
    #[serde(alias = "Ativo")]
    Active,
    #[serde(alias = "Pago")]
    Paid,
    #[serde(alias = "Atrasado")]
    Overdue,
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoanStatus::Active => write!(f, "Active"),
            LoanStatus::Paid => write!(f, "Paid"),
            LoanStatus::Overdue => write!(f, "Overdue"),
        }
    }
}

/// Kind of a recorded payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentType {
    /// Regular scheduled installment
    #[serde(alias = "amortization", alias = "Parcela", alias = "Amortização")]
    Amortization,
    /// Installment paid as part of a renewal
    #[serde(alias = "renewal", alias = "Renovação")]
    Renewal,
    /// Payoff of the whole outstanding balance
    #[serde(alias = "settlement", alias = "Quitação")]
    Settlement,
}

/// A recorded payment. Immutable once appended to a loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub amount: Money,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// A lending contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: String,
    pub client_id: String,
    pub terms: LoanTerms,
    #[serde(default)]
    pub payments_made: u32,
    pub status: LoanStatus,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_history: Vec<Payment>,
}

impl Loan {
    /// A fresh contract with no payments; the first installment is due one
    /// month after `start_date`.
    pub fn new(
        id: impl Into<String>,
        client_id: impl Into<String>,
        terms: LoanTerms,
        start_date: NaiveDate,
    ) -> LendingResult<Self> {
        terms.validate()?;
        Ok(Self {
            id: id.into(),
            client_id: client_id.into(),
            terms,
            payments_made: 0,
            status: LoanStatus::Active,
            start_date,
            next_payment_date: start_date.checked_add_months(Months::new(1)),
            payment_history: Vec::new(),
        })
    }

    pub fn is_settled(&self) -> bool {
        self.status == LoanStatus::Paid
    }

    /// Engine projection for the current payment count; a settled loan is
    /// reported with nothing outstanding.
    pub fn snapshot(&self) -> LendingResult<AmortizationSnapshot> {
        let snapshot = compute_amortization(&self.terms, self.payments_made)?;
        if self.is_settled() {
            Ok(snapshot.settled())
        } else {
            Ok(snapshot)
        }
    }

    /// Sum of all recorded payments.
    pub fn total_paid(&self) -> Money {
        self.payment_history.iter().map(|p| p.amount).sum()
    }

    /// Re-derive Active/Overdue from the next due date. Paid loans never
    /// change. Returns true when the status changed.
    pub fn refresh_status(&mut self, as_of: NaiveDate) -> bool {
        if self.is_settled() {
            return false;
        }
        let next = match self.next_payment_date {
            Some(d) if d < as_of => LoanStatus::Overdue,
            _ => LoanStatus::Active,
        };
        if next == self.status {
            return false;
        }
        if next == LoanStatus::Overdue {
            log::warn!(
                "Loan {} overdue since {:?} (as of {as_of})",
                self.id,
                self.next_payment_date
            );
        }
        self.status = next;
        true
    }
}
