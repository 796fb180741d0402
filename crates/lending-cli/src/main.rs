mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::amortization::{AmortizationArgs, ScheduleArgs};
use commands::ledger::{
    BookArgs, ClientArgs, LoansArgs, RefreshArgs, RegisterPaymentArgs, SettlementQuoteArgs,
};
use commands::scoring::{NextScoreArgs, ScoreBandArgs};

/// Loan amortization, payment registration and credit scoring
#[derive(Parser)]
#[command(
    name = "lend",
    version,
    about = "Loan amortization, payment registration and credit scoring",
    long_about = "A CLI for a small lending back office with decimal precision. \
                  Projects Price and SAC schedules, quotes settlements, registers \
                  payments against a loan book and reports client scores and \
                  portfolio figures."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log engine decisions to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Project a loan's position after a number of installments
    Amortization(AmortizationArgs),
    /// Build the full month-by-month schedule
    Schedule(ScheduleArgs),
    /// Quote the payoff amount of a loan (remaining principal)
    SettlementQuote(SettlementQuoteArgs),
    /// Register a payment and update the client's score
    RegisterPayment(RegisterPaymentArgs),
    /// Map a credit score to its band
    ScoreBand(ScoreBandArgs),
    /// Score after a registered payment
    NextScore(NextScoreArgs),
    /// List and search loans in a book
    Loans(LoansArgs),
    /// Position of one client
    Client(ClientArgs),
    /// Book-wide portfolio figures
    Portfolio(BookArgs),
    /// Mark loans with a past due date as overdue
    RefreshStatus(RefreshArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(verbose: bool) {
    let mut builder = if verbose {
        let mut b = env_logger::Builder::new();
        b.filter_level(log::LevelFilter::Debug);
        b
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
    };
    builder.format_timestamp(None).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Amortization(args) => commands::amortization::run_amortization(args),
        Commands::Schedule(args) => commands::amortization::run_schedule(args),
        Commands::SettlementQuote(args) => commands::ledger::run_settlement_quote(args),
        Commands::RegisterPayment(args) => commands::ledger::run_register_payment(args),
        Commands::ScoreBand(args) => commands::scoring::run_score_band(args),
        Commands::NextScore(args) => commands::scoring::run_next_score(args),
        Commands::Loans(args) => commands::ledger::run_loans(args),
        Commands::Client(args) => commands::ledger::run_client(args),
        Commands::Portfolio(args) => commands::ledger::run_portfolio(args),
        Commands::RefreshStatus(args) => commands::ledger::run_refresh_status(args),
        Commands::Version => {
            println!("lend {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
