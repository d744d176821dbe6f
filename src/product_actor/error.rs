use thiserror::Error;
use crate::actor_framework::FrameworkError;
use crate::domain::ValidationError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(String),
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock { product_id: String, requested: u32, available: u32 },
    #[error("Product validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Product rejected: {0}")]
    Rejected(String),
    #[error("Product store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Product store error: {0}")]
    Store(String),
}

impl From<FrameworkError> for ProductError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => ProductError::NotFound(id),
            FrameworkError::Rejected(msg) => ProductError::Rejected(msg),
            FrameworkError::Unavailable(msg) => ProductError::StoreUnavailable(msg),
            FrameworkError::Persistence(msg) => ProductError::Store(msg),
        }
    }
}
