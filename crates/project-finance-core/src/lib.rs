pub mod error;
pub mod model;
pub mod time_value;
pub mod types;

pub use error::ProjectFinanceError;
pub use types::*;

/// Standard result type for all project-finance operations
pub type PfResult<T> = Result<T, ProjectFinanceError>;
