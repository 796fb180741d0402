use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::LendingError;
use crate::loans::Loan;
use crate::scoring::{score_for_value, ScoreBand, ScorePolicy};
use crate::types::Currency;
use crate::LendingResult;

/// A borrower and their credit score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_date: Option<NaiveDate>,
}

impl Client {
    pub fn band(&self) -> ScoreBand {
        score_for_value(self.score)
    }
}

/// Serialized snapshot of a lending book
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Book {
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub score_policy: ScorePolicy,
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub loans: Vec<Loan>,
}

impl Book {
    pub fn from_json(json: &str) -> LendingResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> LendingResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Repository of loans and clients.
///
/// Implementations own persistence; callers serialize writes per loan.
pub trait LoanStore {
    fn loan(&self, id: &str) -> LendingResult<Loan>;
    fn loans(&self) -> Vec<Loan>;
    /// Add a new loan. Fails if the id is taken or the owning client is unknown.
    fn insert_loan(&mut self, loan: Loan) -> LendingResult<()>;
    /// Replace an existing loan.
    fn save_loan(&mut self, loan: Loan) -> LendingResult<()>;

    fn client(&self, id: &str) -> LendingResult<Client>;
    fn clients(&self) -> Vec<Client>;
    fn insert_client(&mut self, client: Client) -> LendingResult<()>;
    fn save_client(&mut self, client: Client) -> LendingResult<()>;
}

/// Store backed by ordered in-process maps
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    clients: BTreeMap<String, Client>,
    loans: BTreeMap<String, Loan>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a book: unique ids, valid terms, known owners.
    pub fn from_book(book: Book) -> LendingResult<Self> {
        let mut store = Self::new();
        for client in book.clients {
            store.insert_client(client)?;
        }
        for loan in book.loans {
            loan.terms.validate()?;
            if loan.payments_made > loan.terms.term_months {
                return Err(LendingError::InvalidLoanTerms {
                    field: "payments_made".into(),
                    reason: format!(
                        "Loan {} records {} payments on a {}-month term",
                        loan.id, loan.payments_made, loan.terms.term_months
                    ),
                });
            }
            store.insert_loan(loan)?;
        }
        log::info!(
            "Loaded book with {} clients and {} loans",
            store.clients.len(),
            store.loans.len()
        );
        Ok(store)
    }

    pub fn to_book(&self, currency: Currency, score_policy: ScorePolicy) -> Book {
        Book {
            currency,
            score_policy,
            clients: self.clients(),
            loans: self.loans(),
        }
    }
}

impl LoanStore for InMemoryStore {
    fn loan(&self, id: &str) -> LendingResult<Loan> {
        self.loans
            .get(id)
            .cloned()
            .ok_or_else(|| LendingError::LoanNotFound(id.to_string()))
    }

    fn loans(&self) -> Vec<Loan> {
        self.loans.values().cloned().collect()
    }

    fn insert_loan(&mut self, loan: Loan) -> LendingResult<()> {
        if self.loans.contains_key(&loan.id) {
            return Err(LendingError::DuplicateRecord {
                kind: "loan".into(),
                id: loan.id,
            });
        }
        if !self.clients.contains_key(&loan.client_id) {
            return Err(LendingError::ClientNotFound(loan.client_id));
        }
        self.loans.insert(loan.id.clone(), loan);
        Ok(())
    }

    fn save_loan(&mut self, loan: Loan) -> LendingResult<()> {
        match self.loans.get_mut(&loan.id) {
            Some(slot) => {
                *slot = loan;
                Ok(())
            }
            None => Err(LendingError::LoanNotFound(loan.id)),
        }
    }

    fn client(&self, id: &str) -> LendingResult<Client> {
        self.clients
            .get(id)
            .cloned()
            .ok_or_else(|| LendingError::ClientNotFound(id.to_string()))
    }

    fn clients(&self) -> Vec<Client> {
        self.clients.values().cloned().collect()
    }

    fn insert_client(&mut self, client: Client) -> LendingResult<()> {
        if self.clients.contains_key(&client.id) {
            return Err(LendingError::DuplicateRecord {
                kind: "client".into(),
                id: client.id,
            });
        }
        self.clients.insert(client.id.clone(), client);
        Ok(())
    }

    fn save_client(&mut self, client: Client) -> LendingResult<()> {
        match self.clients.get_mut(&client.id) {
            Some(slot) => {
                *slot = client;
                Ok(())
            }
            None => Err(LendingError::ClientNotFound(client.id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::{AmortizationType, LoanTerms};
    use rust_decimal_macros::dec;

    fn client(id: &str, score: u32) -> Client {
        Client {
            id: id.into(),
            name: format!("Client {id}"),
            email: None,
            score,
            join_date: None,
        }
    }

    fn loan(id: &str, client_id: &str) -> Loan {
        Loan::new(
            id,
            client_id,
            LoanTerms {
                principal: dec!(1000),
                annual_interest_rate: dec!(3),
                term_months: 4,
                amortization_type: AmortizationType::Sac,
            },
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_insert_and_fetch() {
        let mut store = InMemoryStore::new();
        store.insert_client(client("1", 700)).unwrap();
        store.insert_loan(loan("a", "1")).unwrap();
        assert_eq!(store.loan("a").unwrap().client_id, "1");
        assert_eq!(store.client("1").unwrap().band(), ScoreBand::Good);
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut store = InMemoryStore::new();
        store.insert_client(client("1", 700)).unwrap();
        assert!(matches!(
            store.insert_client(client("1", 500)),
            Err(LendingError::DuplicateRecord { .. })
        ));
        store.insert_loan(loan("a", "1")).unwrap();
        assert!(matches!(
            store.insert_loan(loan("a", "1")),
            Err(LendingError::DuplicateRecord { .. })
        ));
    }

    #[test]
    fn test_loan_requires_known_client() {
        let mut store = InMemoryStore::new();
        assert_eq!(
            store.insert_loan(loan("a", "9")),
            Err(LendingError::ClientNotFound("9".into()))
        );
    }

    #[test]
    fn test_save_unknown_is_not_found() {
        let mut store = InMemoryStore::new();
        assert_eq!(
            store.save_loan(loan("zz", "1")),
            Err(LendingError::LoanNotFound("zz".into()))
        );
        assert_eq!(
            store.save_client(client("7", 1)),
            Err(LendingError::ClientNotFound("7".into()))
        );
    }

    #[test]
    fn test_book_round_trip_keeps_records() {
        let book = Book {
            clients: vec![client("1", 850)],
            loans: vec![loan("a", "1")],
            ..Book::default()
        };
        let json = book.to_json().unwrap();
        let store = InMemoryStore::from_book(Book::from_json(&json).unwrap()).unwrap();
        let back = store.to_book(Currency::BRL, ScorePolicy::default());
        assert_eq!(back.clients, book.clients);
        assert_eq!(back.loans, book.loans);
    }

    #[test]
    fn test_book_rejects_overpaid_loan() {
        let mut bad = loan("a", "1");
        bad.payments_made = 5;
        let book = Book {
            clients: vec![client("1", 850)],
            loans: vec![bad],
            ..Book::default()
        };
        assert!(matches!(
            InMemoryStore::from_book(book),
            Err(LendingError::InvalidLoanTerms { .. })
        ));
    }
}
