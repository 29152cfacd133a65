use chrono::{DateTime, Utc};
use common::{OrderId, OrderStatus, ProductId};
use store::{LineItemRecord, StoredOrder};

use crate::Money;

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    /// 1-based position of the line in the placement request.
    pub line_no: i32,
    pub product_id: ProductId,
    pub quantity: i64,
    /// Product price captured when the order was placed.
    pub unit_price: Money,
}

impl From<LineItemRecord> for LineItem {
    fn from(record: LineItemRecord) -> Self {
        Self {
            line_no: record.line_no,
            product_id: record.product_id,
            quantity: record.quantity,
            unit_price: Money::from_cents(record.unit_price_cents),
        }
    }
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub total_price: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub line_items: Vec<LineItem>,
}

impl Order {
    /// Returns the number of lines on the order.
    pub fn line_count(&self) -> usize {
        self.line_items.len()
    }
}

impl From<StoredOrder> for Order {
    fn from(stored: StoredOrder) -> Self {
        Self {
            id: stored.order.id,
            total_price: Money::from_cents(stored.order.total_cents),
            status: stored.order.status,
            created_at: stored.order.created_at,
            line_items: stored.line_items.into_iter().map(LineItem::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::OrderRecord;

    fn record(line_no: i32, product_id: i64, quantity: i64, cents: i64) -> LineItemRecord {
        LineItemRecord {
            order_id: OrderId::new(1),
            line_no,
            product_id: ProductId::new(product_id),
            quantity,
            unit_price_cents: cents,
        }
    }

    #[test]
    fn test_line_item_from_record() {
        let item = LineItem::from(record(2, 7, 3, 1999));
        assert_eq!(item.line_no, 2);
        assert_eq!(item.product_id, ProductId::new(7));
        assert_eq!(item.quantity, 3);
        assert_eq!(item.unit_price, Money::from_cents(1999));
    }

    #[test]
    fn test_order_from_stored_keeps_duplicate_lines() {
        let stored = StoredOrder {
            order: OrderRecord {
                id: OrderId::new(1),
                total_cents: 5000,
                status: OrderStatus::Completed,
                created_at: Utc::now(),
            },
            line_items: vec![record(1, 1, 2, 1000), record(2, 2, 1, 1000), record(3, 1, 2, 1000)],
        };

        let order = Order::from(stored);

        assert_eq!(order.total_price.cents(), 5000);
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.line_count(), 3);
        assert_eq!(
            order
                .line_items
                .iter()
                .map(|l| (l.line_no, l.product_id.as_i64()))
                .collect::<Vec<_>>(),
            vec![(1, 1), (2, 2), (3, 1)]
        );
    }
}
