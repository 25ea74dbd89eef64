use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectFinanceError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Degenerate cash-flow series: {0}")]
    DegenerateSeries(String),

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Period mismatch: expected periods {expected}, found {found}")]
    PeriodMismatch { expected: String, found: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for ProjectFinanceError {
    fn from(e: serde_json::Error) -> Self {
        ProjectFinanceError::SerializationError(e.to_string())
    }
}
