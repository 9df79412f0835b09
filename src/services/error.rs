use thiserror::Error;

use crate::provider::ProviderError;

/// Failure taxonomy of the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidRequest(String),

    /// Provider failure the service could not re-map; surfaces through the
    /// fault boundary.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
