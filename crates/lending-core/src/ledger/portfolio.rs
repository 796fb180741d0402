use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::store::Client;
use crate::loans::{Loan, LoanStatus};
use crate::scoring::ScoreBand;
use crate::types::{Currency, Money};
use crate::LendingResult;

/// Loan list filter: free-text search plus optional status and owner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanFilter {
    /// Case-insensitive substring of the loan id or the client name
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<LoanStatus>,
    #[serde(default)]
    pub client_id: Option<String>,
}

impl LoanFilter {
    pub fn matches(&self, loan: &Loan, client_name: &str) -> bool {
        if let Some(status) = self.status {
            if loan.status != status {
                return false;
            }
        }
        if let Some(ref owner) = self.client_id {
            if &loan.client_id != owner {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let needle = term.to_lowercase();
                loan.id.to_lowercase().contains(&needle)
                    || client_name.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}

/// Per-client position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSummary {
    pub client_id: String,
    pub name: String,
    pub score: u32,
    pub band: ScoreBand,
    pub total_loans: usize,
    /// Loans not yet settled (Active or Overdue)
    pub active_loans: usize,
    pub total_paid: Money,
    pub outstanding_principal: Money,
}

/// Book-wide figures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub currency: Currency,
    pub total_loans: usize,
    pub active_loans: usize,
    pub overdue_loans: usize,
    pub paid_loans: usize,
    pub total_principal: Money,
    pub outstanding_principal: Money,
    pub interest_collected: Money,
    pub total_received: Money,
    pub clients: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_score: Option<Decimal>,
}

pub fn summarize_client(client: &Client, loans: &[Loan]) -> LendingResult<ClientSummary> {
    let owned: Vec<&Loan> = loans.iter().filter(|l| l.client_id == client.id).collect();

    let mut outstanding = Decimal::ZERO;
    for loan in &owned {
        outstanding += loan.snapshot()?.remaining_principal;
    }

    Ok(ClientSummary {
        client_id: client.id.clone(),
        name: client.name.clone(),
        score: client.score,
        band: client.band(),
        total_loans: owned.len(),
        active_loans: owned.iter().filter(|l| !l.is_settled()).count(),
        total_paid: owned.iter().map(|l| l.total_paid()).sum(),
        outstanding_principal: outstanding,
    })
}

pub fn summarize_portfolio(
    loans: &[Loan],
    clients: &[Client],
    currency: Currency,
) -> LendingResult<PortfolioSummary> {
    let mut outstanding = Decimal::ZERO;
    let mut interest = Decimal::ZERO;
    for loan in loans {
        let snapshot = loan.snapshot()?;
        outstanding += snapshot.remaining_principal;
        interest += snapshot.accumulated_interest;
    }

    let count = |status: LoanStatus| loans.iter().filter(|l| l.status == status).count();

    let average_score = if clients.is_empty() {
        None
    } else {
        let total: u64 = clients.iter().map(|c| u64::from(c.score)).sum();
        Some(Decimal::from(total) / Decimal::from(clients.len() as u64))
    };

    Ok(PortfolioSummary {
        currency,
        total_loans: loans.len(),
        active_loans: count(LoanStatus::Active),
        overdue_loans: count(LoanStatus::Overdue),
        paid_loans: count(LoanStatus::Paid),
        total_principal: loans.iter().map(|l| l.terms.principal).sum(),
        outstanding_principal: outstanding,
        interest_collected: interest,
        total_received: loans.iter().map(|l| l.total_paid()).sum(),
        clients: clients.len(),
        average_score,
    })
}
