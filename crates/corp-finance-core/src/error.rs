use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpFinanceError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A cap-table snapshot violates a structural invariant (non-positive
    /// shares, non-contiguous seniority ranks, missing participation cap on
    /// a capped series, vested > issued, …). Fatal: the orchestrator returns
    /// early with no breakpoints.
    #[error("Malformed cap table: {0}")]
    MalformedCapTable(String),

    /// Post-finalization invariants (contiguity, percentage sums, monotone
    /// cumulative RVPS, …) failed. The result is still returned with
    /// diagnostics; only `success` is set to false.
    #[error("Inconsistent breakpoints: {0}")]
    InconsistentBreakpoints(String),

    /// An unreachable branch was reached — indicates a bug in an analyzer
    /// or the finalizer, not a problem with caller input.
    #[error("Internal invariant violated in {component}: {detail}")]
    InternalInvariant { component: String, detail: String },
}

impl From<serde_json::Error> for CorpFinanceError {
    fn from(e: serde_json::Error) -> Self {
        CorpFinanceError::SerializationError(e.to_string())
    }
}
