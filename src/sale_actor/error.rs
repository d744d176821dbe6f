use thiserror::Error;
use crate::actor_framework::FrameworkError;

/// Errors that can occur during sales ledger operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SaleError {
    #[error("Sale not found: {0}")]
    NotFound(String),
    #[error("Sale rejected: {0}")]
    Rejected(String),
    #[error("Sales store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Sales store error: {0}")]
    Store(String),
}

impl From<FrameworkError> for SaleError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => SaleError::NotFound(id),
            FrameworkError::Rejected(msg) => SaleError::Rejected(msg),
            FrameworkError::Unavailable(msg) => SaleError::StoreUnavailable(msg),
            FrameworkError::Persistence(msg) => SaleError::Store(msg),
        }
    }
}
