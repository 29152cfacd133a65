//! Persistence gateway for the storefront.
//!
//! The domain layer talks to storage only through the [`Store`] and
//! [`UnitOfWork`] traits. Two implementations are provided:
//! - [`PostgresStore`] backed by a `sqlx` connection pool
//! - [`InMemoryStore`] for tests and local runs

pub mod error;
pub mod memory;
pub mod postgres;
pub mod record;
pub mod store;

pub use common::{OrderId, OrderStatus, ProductId};
pub use error::{Result, StoreError};
pub use memory::{InMemoryStore, InMemoryUnitOfWork};
pub use postgres::{PostgresStore, PostgresUnitOfWork};
pub use record::{LineItemRecord, NewOrder, NewProduct, OrderRecord, ProductRecord, StoredOrder};
pub use store::{Store, UnitOfWork};
