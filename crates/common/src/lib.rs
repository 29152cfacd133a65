//! Identifier and status types shared by the store, domain and API crates.

mod status;
mod types;

pub use status::{OrderStatus, ParseOrderStatusError};
pub use types::{OrderId, ProductId};
