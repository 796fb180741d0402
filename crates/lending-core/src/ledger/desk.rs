use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::portfolio::{
    summarize_client, summarize_portfolio, ClientSummary, LoanFilter, PortfolioSummary,
};
use super::store::LoanStore;
use crate::amortization::{AmortizationSnapshot, AmortizationType};
use crate::loans::{self, Loan, LoanStatus, Payment, PaymentRequest};
use crate::scoring::{ScorePolicy, ScoreTransition};
use crate::types::{Currency, Money};
use crate::LendingResult;

/// A loan joined with its owner's name and its engine projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanView {
    pub loan_id: String,
    pub client_id: String,
    pub client_name: String,
    pub status: LoanStatus,
    pub amortization_type: AmortizationType,
    pub principal: Money,
    pub term_months: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_payment_date: Option<NaiveDate>,
    pub snapshot: AmortizationSnapshot,
}

/// Outcome of a registered payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub payment: Payment,
    pub loan: Loan,
    pub snapshot: AmortizationSnapshot,
    pub score: ScoreTransition,
}

/// Coordinates a [`LoanStore`] with the payment and scoring policies.
pub struct LendingDesk<S: LoanStore> {
    store: S,
    policy: ScorePolicy,
    currency: Currency,
}

impl<S: LoanStore> LendingDesk<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            policy: ScorePolicy::default(),
            currency: Currency::default(),
        }
    }

    pub fn with_policy(mut self, policy: ScorePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn policy(&self) -> &ScorePolicy {
        &self.policy
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Register a payment and bump the owner's score.
    ///
    /// Both records are validated before either is written. If the client
    /// write fails after the loan was saved, the previous loan is written
    /// back before the error is returned.
    pub fn register_payment(
        &mut self,
        loan_id: &str,
        request: &PaymentRequest,
    ) -> LendingResult<PaymentReceipt> {
        let loan = self.store.loan(loan_id)?;
        let mut client = self.store.client(&loan.client_id)?;

        let (updated, payment) = loans::payments::apply_payment(&loan, request)?;
        let snapshot = updated.snapshot()?;

        let transition = self.policy.transition(client.score);
        client.score = transition.current_score;
        if transition.band_changed() {
            log::debug!(
                "Client {} moved from {} to {} ({} -> {})",
                client.id,
                transition.previous_band,
                transition.current_band,
                transition.previous_score,
                transition.current_score
            );
        }

        self.store.save_loan(updated.clone())?;
        if let Err(err) = self.store.save_client(client) {
            let loan_id = loan.id.clone();
            if let Err(restore) = self.store.save_loan(loan) {
                log::error!("Loan {loan_id}: restoring previous state failed: {restore}");
            }
            return Err(err);
        }

        Ok(PaymentReceipt {
            payment,
            loan: updated,
            snapshot,
            score: transition,
        })
    }

    pub fn loan_view(&self, loan_id: &str) -> LendingResult<LoanView> {
        let loan = self.store.loan(loan_id)?;
        let client = self.store.client(&loan.client_id)?;
        view(loan, client.name)
    }

    pub fn settlement_quote(&self, loan_id: &str) -> LendingResult<Money> {
        loans::settlement_quote(&self.store.loan(loan_id)?)
    }

    pub fn search_loans(&self, filter: &LoanFilter) -> LendingResult<Vec<LoanView>> {
        let mut out = Vec::new();
        for loan in self.store.loans() {
            let name = self
                .store
                .client(&loan.client_id)
                .map(|c| c.name)
                .unwrap_or_default();
            if filter.matches(&loan, &name) {
                out.push(view(loan, name)?);
            }
        }
        Ok(out)
    }

    pub fn client_summary(&self, client_id: &str) -> LendingResult<ClientSummary> {
        let client = self.store.client(client_id)?;
        summarize_client(&client, &self.store.loans())
    }

    pub fn portfolio_summary(&self) -> LendingResult<PortfolioSummary> {
        summarize_portfolio(
            &self.store.loans(),
            &self.store.clients(),
            self.currency.clone(),
        )
    }

    /// Re-derive Active/Overdue for every loan; returns the ids that changed.
    pub fn refresh_statuses(&mut self, as_of: NaiveDate) -> LendingResult<Vec<String>> {
        let mut changed = Vec::new();
        for mut loan in self.store.loans() {
            if loan.refresh_status(as_of) {
                changed.push(loan.id.clone());
                self.store.save_loan(loan)?;
            }
        }
        Ok(changed)
    }
}

fn view(loan: Loan, client_name: String) -> LendingResult<LoanView> {
    let snapshot = loan.snapshot()?;
    Ok(LoanView {
        loan_id: loan.id,
        client_id: loan.client_id,
        client_name,
        status: loan.status,
        amortization_type: loan.terms.amortization_type,
        principal: loan.terms.principal,
        term_months: loan.terms.term_months,
        next_payment_date: loan.next_payment_date,
        snapshot,
    })
}
