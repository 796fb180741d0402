pub mod amortization;
pub mod ledger;
pub mod scoring;
