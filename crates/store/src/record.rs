//! Row types exchanged with the store.
//!
//! Prices are carried as integer cents; the domain layer wraps them in its
//! own money type.

use chrono::{DateTime, Utc};

use crate::{OrderId, OrderStatus, ProductId};

/// A persisted catalog product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub stock: i64,
}

/// A product that has not been assigned an identity yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub stock: i64,
}

/// A persisted order header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub id: OrderId,
    pub total_cents: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// An order header that has not been assigned an identity yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub total_cents: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    /// A pending order with a zero total, stamped with the current time.
    pub fn pending() -> Self {
        Self {
            total_cents: 0,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// One line of an order.
///
/// `line_no` is the 1-based position of the line within its order, so the
/// same product may appear on several lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItemRecord {
    pub order_id: OrderId,
    pub line_no: i32,
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

/// An order header together with its lines, ordered by `line_no`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredOrder {
    pub order: OrderRecord,
    pub line_items: Vec<LineItemRecord>,
}
