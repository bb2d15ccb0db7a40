//! Convenience result type alias for Imasu.

use crate::error::AppError;

/// A specialized `Result` type for Imasu operations.
pub type AppResult<T> = Result<T, AppError>;
