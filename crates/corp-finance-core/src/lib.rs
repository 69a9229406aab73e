pub mod error;
pub mod types;

#[cfg(feature = "captable")]
pub mod captable;

pub use error::CorpFinanceError;
pub use types::*;

/// Standard result type for all corp-finance operations
pub type CorpFinanceResult<T> = Result<T, CorpFinanceError>;
