//! Order placement and related types.

mod commands;
mod entity;
mod service;

pub use commands::{PlaceOrder, RequestedItem};
pub use entity::{LineItem, Order};
pub use service::OrderService;

use common::ProductId;
use thiserror::Error;

use crate::error::ErrorKind;

/// Errors that can occur while placing an order.
///
/// Placement stops at the first failing item, so exactly one of these is
/// reported per rejected request.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The request did not name any items.
    #[error("Order must contain at least one item.")]
    NoItems,

    /// A requested product does not exist.
    #[error("Product with ID {product_id} not found.")]
    ProductNotFound { product_id: ProductId },

    /// A requested quantity was zero or negative.
    #[error("Quantity must be greater than zero (product {product_id}, got {quantity}).")]
    InvalidQuantity { product_id: ProductId, quantity: i64 },

    /// A product does not have enough stock left for the requested quantity.
    #[error(
        "Insufficient stock for product {product_name} (ID {product_id}): requested {requested}, available {available}."
    )]
    InsufficientStock {
        product_id: ProductId,
        product_name: String,
        requested: i64,
        available: i64,
    },

    /// The order total does not fit in the money representation.
    #[error("Order total is too large.")]
    TotalOverflow,

    /// The request has more items than an order can number.
    #[error("Order cannot contain more than {max} items.")]
    TooManyItems { max: i32 },
}

impl OrderError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderError::ProductNotFound { .. } => ErrorKind::NotFound,
            OrderError::InsufficientStock { .. } => ErrorKind::InsufficientResource,
            OrderError::NoItems
            | OrderError::InvalidQuantity { .. }
            | OrderError::TotalOverflow
            | OrderError::TooManyItems { .. } => ErrorKind::ValidationFailure,
        }
    }

    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            OrderError::NoItems => "no_items",
            OrderError::ProductNotFound { .. } => "product_not_found",
            OrderError::InvalidQuantity { .. } => "invalid_quantity",
            OrderError::InsufficientStock { .. } => "insufficient_stock",
            OrderError::TotalOverflow => "total_overflow",
            OrderError::TooManyItems { .. } => "too_many_items",
        }
    }
}
