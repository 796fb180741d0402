use napi::Result as NapiResult;
use napi_derive::napi;

use lending_core::amortization::LoanTerms;
use lending_core::ledger::{Book, InMemoryStore, LendingDesk};
use lending_core::loans::{Loan, PaymentRequest};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
struct AmortizationBindingInput {
    #[serde(flatten)]
    terms: LoanTerms,
    #[serde(default)]
    payments_made: u32,
}

#[napi]
pub fn compute_amortization(input_json: String) -> NapiResult<String> {
    let input: AmortizationBindingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lending_core::amortization::compute_amortization(&input.terms, input.payments_made)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn build_schedule(input_json: String) -> NapiResult<String> {
    let terms: LoanTerms = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lending_core::amortization::build_schedule(&terms).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

#[napi]
pub fn settlement_quote(loan_json: String) -> NapiResult<String> {
    let loan: Loan = serde_json::from_str(&loan_json).map_err(to_napi_error)?;
    let quote = lending_core::loans::settlement_quote(&loan).map_err(to_napi_error)?;
    serde_json::to_string(&serde_json::json!({
        "loan_id": loan.id,
        "settlement_quote": quote,
    }))
    .map_err(to_napi_error)
}

#[derive(serde::Deserialize)]
struct PaymentBindingInput {
    loan: Loan,
    payment: PaymentRequest,
}

/// Returns the updated loan and its snapshot.
#[napi]
pub fn register_payment(input_json: String) -> NapiResult<String> {
    let input: PaymentBindingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let updated =
        lending_core::loans::register_payment(&input.loan, &input.payment).map_err(to_napi_error)?;
    let snapshot = updated.snapshot().map_err(to_napi_error)?;
    serde_json::to_string(&serde_json::json!({
        "loan": updated,
        "snapshot": snapshot,
    }))
    .map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

#[napi]
pub fn score_for_value(score: u32) -> NapiResult<String> {
    let band = lending_core::scoring::score_for_value(score);
    serde_json::to_string(&band).map_err(to_napi_error)
}

#[napi]
pub fn next_score_after_payment(score: u32) -> u32 {
    lending_core::scoring::next_score_after_payment(score)
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

#[napi]
pub fn portfolio_summary(book_json: String) -> NapiResult<String> {
    let book = Book::from_json(&book_json).map_err(to_napi_error)?;
    let currency = book.currency.clone();
    let store = InMemoryStore::from_book(book).map_err(to_napi_error)?;
    let output = LendingDesk::new(store)
        .with_currency(currency)
        .portfolio_summary()
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
