use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use lending_core::ledger::{InMemoryStore, LendingDesk, LoanFilter, LoanView};
use lending_core::loans::{LoanStatus, PaymentRequest, PaymentType};
use lending_core::scoring::ScorePolicy;

use super::scoring::PolicyArgs;
use crate::input;

/// Payment kind accepted on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PaymentKind {
    Amortization,
    Renewal,
    Settlement,
}

impl From<PaymentKind> for PaymentType {
    fn from(kind: PaymentKind) -> Self {
        match kind {
            PaymentKind::Amortization => PaymentType::Amortization,
            PaymentKind::Renewal => PaymentType::Renewal,
            PaymentKind::Settlement => PaymentType::Settlement,
        }
    }
}

/// Loan status accepted as a list filter
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusKind {
    Active,
    Paid,
    Overdue,
}

impl From<StatusKind> for LoanStatus {
    fn from(kind: StatusKind) -> Self {
        match kind {
            StatusKind::Active => LoanStatus::Active,
            StatusKind::Paid => LoanStatus::Paid,
            StatusKind::Overdue => LoanStatus::Overdue,
        }
    }
}

/// The book every ledger command works on
#[derive(Args)]
pub struct BookArgs {
    /// Path to the book file (JSON, or YAML by extension)
    #[arg(long)]
    pub book: String,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

/// Arguments for the payoff quote of one loan
#[derive(Args)]
pub struct SettlementQuoteArgs {
    #[command(flatten)]
    pub book: BookArgs,

    /// Loan identifier
    #[arg(long)]
    pub loan_id: String,
}

/// Arguments for registering a payment
#[derive(Args)]
pub struct RegisterPaymentArgs {
    #[command(flatten)]
    pub book: BookArgs,

    /// Loan identifier
    #[arg(long)]
    pub loan_id: String,

    /// Path to a JSON/YAML payment document (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount paid; ignored for settlements
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Payment date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,

    /// Payment kind
    #[arg(long = "type", value_enum, default_value = "amortization")]
    pub payment_type: PaymentKind,

    /// Free-text remarks
    #[arg(long)]
    pub remarks: Option<String>,

    /// Persist the updated book back to its file
    #[arg(long)]
    pub write: bool,
}

/// Arguments for the loan list
#[derive(Args)]
pub struct LoansArgs {
    #[command(flatten)]
    pub book: BookArgs,

    /// Case-insensitive match on loan id or client name
    #[arg(long)]
    pub search: Option<String>,

    /// Only loans in this status
    #[arg(long, value_enum)]
    pub status: Option<StatusKind>,

    /// Only loans owned by this client
    #[arg(long)]
    pub client_id: Option<String>,
}

/// Arguments for a client position
#[derive(Args)]
pub struct ClientArgs {
    #[command(flatten)]
    pub book: BookArgs,

    /// Client identifier
    #[arg(long)]
    pub client_id: String,
}

/// Arguments for the overdue sweep
#[derive(Args)]
pub struct RefreshArgs {
    #[command(flatten)]
    pub book: BookArgs,

    /// Reference date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Persist the updated book back to its file
    #[arg(long)]
    pub write: bool,
}

/// A desk over the book's records, plus the policy stored in the book so
/// CLI overrides are not persisted.
struct OpenBook {
    desk: LendingDesk<InMemoryStore>,
    stored_policy: ScorePolicy,
}

fn open_book(args: &BookArgs) -> Result<OpenBook, Box<dyn std::error::Error>> {
    let book = input::file::read_book(&args.book)?;
    let stored_policy = book.score_policy.clone();
    let policy = args.policy.apply(stored_policy.clone());
    let currency = book.currency.clone();
    let store = InMemoryStore::from_book(book)?;
    Ok(OpenBook {
        desk: LendingDesk::new(store)
            .with_policy(policy)
            .with_currency(currency),
        stored_policy,
    })
}

fn save_book(path: &str, open: OpenBook) -> Result<(), Box<dyn std::error::Error>> {
    let currency = open.desk.currency().clone();
    let book = open.desk.into_store().to_book(currency, open.stored_policy);
    input::file::write_book(path, &book)
}

fn loan_row(view: &LoanView) -> Value {
    json!({
        "loan_id": view.loan_id,
        "client": view.client_name,
        "status": view.status,
        "type": view.amortization_type,
        "principal": view.principal,
        "installments": format!("{}/{}", view.snapshot.payments_made, view.term_months),
        "remaining_principal": view.snapshot.remaining_principal.round_dp(2),
        "progress_pct": view.snapshot.progress_percentage.round_dp(2),
        "next_payment_date": view.next_payment_date,
    })
}

pub fn run_settlement_quote(args: SettlementQuoteArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let open = open_book(&args.book)?;
    let quote = open.desk.settlement_quote(&args.loan_id)?;
    Ok(json!({
        "loan_id": args.loan_id,
        "settlement_quote": quote,
        "currency": open.desk.currency(),
    }))
}

pub fn run_register_payment(args: RegisterPaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: PaymentRequest = if let Some(ref path) = args.input {
        input::file::read_structured(path)?
    } else if args.date.is_some() {
        PaymentRequest {
            amount: args.amount.unwrap_or(Decimal::ZERO),
            date: args.date.clone(),
            payment_type: args.payment_type.into(),
            remarks: args.remarks.clone(),
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--date is required (or provide --input)".into());
    };

    let mut open = open_book(&args.book)?;
    let receipt = open.desk.register_payment(&args.loan_id, &request)?;
    let value = serde_json::to_value(&receipt)?;

    if args.write {
        save_book(&args.book.book, open)?;
    }
    Ok(value)
}

pub fn run_loans(args: LoansArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let open = open_book(&args.book)?;
    let filter = LoanFilter {
        search: args.search,
        status: args.status.map(LoanStatus::from),
        client_id: args.client_id,
    };
    let rows: Vec<Value> = open
        .desk
        .search_loans(&filter)?
        .iter()
        .map(loan_row)
        .collect();
    Ok(Value::Array(rows))
}

pub fn run_client(args: ClientArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let open = open_book(&args.book)?;
    let summary = open.desk.client_summary(&args.client_id)?;
    Ok(serde_json::to_value(summary)?)
}

pub fn run_portfolio(args: BookArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let open = open_book(&args)?;
    let summary = open.desk.portfolio_summary()?;
    Ok(serde_json::to_value(summary)?)
}

pub fn run_refresh_status(args: RefreshArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let as_of = args
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let mut open = open_book(&args.book)?;
    let changed = open.desk.refresh_statuses(as_of)?;

    let written = args.write && !changed.is_empty();
    if written {
        save_book(&args.book.book, open)?;
    }
    Ok(json!({
        "as_of": as_of,
        "changed": changed,
        "book_written": written,
    }))
}
