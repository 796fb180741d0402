pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "loans")]
pub mod loans;

#[cfg(feature = "scoring")]
pub mod scoring;

#[cfg(feature = "ledger")]
pub mod ledger;

pub use error::LendingError;
pub use types::*;

/// Standard result type for all lending operations
pub type LendingResult<T> = Result<T, LendingError>;
