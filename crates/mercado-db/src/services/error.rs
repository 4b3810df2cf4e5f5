//! Service-layer error type, merging domain and database failures.

use thiserror::Error;

use crate::error::DbError;
use mercado_core::CoreError;

/// Errors surfaced by the service layer.
///
/// Domain rule violations (`Core`) and persistence failures (`Db`) stay
/// distinguishable so callers can decide what is retryable and what is a
/// user mistake.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Domain rule violation from `mercado-core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Database failure.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<mercado_core::ValidationError> for ServiceError {
    fn from(err: mercado_core::ValidationError) -> Self {
        ServiceError::Core(CoreError::from(err))
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
