//! Product catalog.

mod commands;
mod product;
mod service;

pub use commands::CreateProduct;
pub use product::Product;
pub use service::CatalogService;

use thiserror::Error;

/// Errors that can occur when changing the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Price must be strictly positive.
    #[error("Price cannot be negative or zero (got {price}).")]
    InvalidPrice { price: f64 },

    /// A positive price smaller than the smallest storable amount.
    #[error("Price must be at least one cent (got {price}).")]
    PriceBelowOneCent { price: f64 },

    /// A price that is not a finite number or does not fit in cents.
    #[error("Price {price} cannot be represented in cents.")]
    UnrepresentablePrice { price: f64 },

    /// Stock must not be negative.
    #[error("Stock quantity cannot be negative (got {stock}).")]
    InvalidStock { stock: i64 },
}
