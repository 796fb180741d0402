//! Store interface and the desk service that coordinates reads and writes
//! around the pure amortization, payment and scoring policies.

pub mod desk;
pub mod portfolio;
pub mod store;

pub use desk::{LendingDesk, LoanView, PaymentReceipt};
pub use portfolio::{ClientSummary, LoanFilter, PortfolioSummary};
pub use store::{Book, Client, InMemoryStore, LoanStore};
