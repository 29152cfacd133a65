//! Domain error types.

use store::StoreError;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::order::OrderError;

/// Coarse classification of a domain failure, used at the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced entity does not exist.
    NotFound,
    /// Malformed or out-of-range input.
    ValidationFailure,
    /// Not enough stock to satisfy the request.
    InsufficientResource,
    /// The store failed; nothing the caller did wrong.
    Internal,
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A catalog rule was violated.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// An order placement rule was violated.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// An error occurred in the store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl DomainError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Catalog(_) => ErrorKind::ValidationFailure,
            DomainError::Order(err) => err.kind(),
            DomainError::Store(_) => ErrorKind::Internal,
        }
    }
}
