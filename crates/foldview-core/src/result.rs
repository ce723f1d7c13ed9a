//! Convenience result type alias for Foldview.

use crate::error::AppError;

/// A specialized `Result` type for Foldview operations.
pub type AppResult<T> = Result<T, AppError>;
