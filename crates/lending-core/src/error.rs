use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LendingError {
    #[error("Invalid loan terms: {field}: {reason}")]
    InvalidLoanTerms { field: String, reason: String },

    #[error("Invalid payment amount: {amount} (must be greater than zero)")]
    InvalidPaymentAmount { amount: Decimal },

    #[error("Invalid payment date: {value}")]
    InvalidPaymentDate { value: String },

    #[error("Loan {loan_id} is already settled")]
    LoanAlreadySettled { loan_id: String },

    #[error("Loan not found: {0}")]
    LoanNotFound(String),

    #[error("Client not found: {0}")]
    ClientNotFound(String),

    #[error("Duplicate {kind}: {id}")]
    DuplicateRecord { kind: String, id: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LendingError {
    pub(crate) fn terms(field: &str, reason: impl Into<String>) -> Self {
        LendingError::InvalidLoanTerms {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for LendingError {
    fn from(e: serde_json::Error) -> Self {
        LendingError::SerializationError(e.to_string())
    }
}
