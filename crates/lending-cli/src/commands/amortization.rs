use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use lending_core::amortization::{self, AmortizationType, LoanTerms};

use crate::input;

/// Amortization system accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScheduleKind {
    Price,
    Sac,
}

impl From<ScheduleKind> for AmortizationType {
    fn from(kind: ScheduleKind) -> Self {
        match kind {
            ScheduleKind::Price => AmortizationType::Price,
            ScheduleKind::Sac => AmortizationType::Sac,
        }
    }
}

/// Loan terms given as individual flags
#[derive(Args)]
pub struct TermsArgs {
    /// Principal lent
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Nominal annual interest rate in percent (5 = 5%)
    #[arg(long, alias = "rate")]
    pub annual_interest_rate: Option<Decimal>,

    /// Number of monthly installments
    #[arg(long, alias = "term")]
    pub term_months: Option<u32>,

    /// Amortization system
    #[arg(long = "type", value_enum, default_value = "price")]
    pub amortization_type: ScheduleKind,
}

impl TermsArgs {
    fn to_terms(&self) -> Result<LoanTerms, Box<dyn std::error::Error>> {
        Ok(LoanTerms {
            principal: self
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_interest_rate: self
                .annual_interest_rate
                .ok_or("--annual-interest-rate is required (or provide --input)")?,
            term_months: self
                .term_months
                .ok_or("--term-months is required (or provide --input)")?,
            amortization_type: self.amortization_type.into(),
        })
    }
}

/// Arguments for a point-in-time amortization projection
#[derive(Args)]
pub struct AmortizationArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub terms: TermsArgs,

    /// Installments already paid
    #[arg(long, default_value_t = 0)]
    pub payments_made: u32,
}

/// Arguments for the full month-by-month schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub terms: TermsArgs,
}

#[derive(Deserialize)]
struct AmortizationInput {
    #[serde(flatten)]
    terms: LoanTerms,
    #[serde(default)]
    payments_made: u32,
}

fn read_input(
    path: Option<&str>,
    flags: &TermsArgs,
    payments_made: u32,
) -> Result<AmortizationInput, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return input::file::read_structured(path);
    }
    if flags.principal.is_some() {
        return Ok(AmortizationInput {
            terms: flags.to_terms()?,
            payments_made,
        });
    }
    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }
    Err("Loan terms are required: pass --principal, --annual-interest-rate and --term-months, or --input".into())
}

pub fn run_amortization(args: AmortizationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let req = read_input(args.input.as_deref(), &args.terms, args.payments_made)?;
    let snapshot = amortization::compute_amortization(&req.terms, req.payments_made)?;
    Ok(serde_json::to_value(snapshot)?)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let req = read_input(args.input.as_deref(), &args.terms, 0)?;
    let result = amortization::build_schedule(&req.terms)?;
    Ok(serde_json::to_value(result)?)
}
