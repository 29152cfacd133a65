//! Domain layer for the storefront backend.
//!
//! This crate provides:
//! - [`CatalogService`] for creating and listing products
//! - [`OrderService`] for all-or-nothing order placement against the catalog
//! - the [`Money`] value object and the domain error taxonomy

pub mod catalog;
pub mod error;
pub mod money;
pub mod order;

pub use catalog::{CatalogError, CatalogService, CreateProduct, Product};
pub use common::{OrderId, OrderStatus, ProductId};
pub use error::{DomainError, ErrorKind};
pub use money::Money;
pub use order::{LineItem, Order, OrderError, OrderService, PlaceOrder, RequestedItem};
