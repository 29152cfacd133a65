//! Order commands.

use common::ProductId;

/// One requested (product, quantity) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestedItem {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl RequestedItem {
    /// Creates a new requested item.
    pub fn new(product_id: ProductId, quantity: i64) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// Command to place an order.
///
/// Items are processed in the given order. The same product may appear more
/// than once; every occurrence is checked against the stock left by the
/// occurrences before it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceOrder {
    pub items: Vec<RequestedItem>,
}

impl PlaceOrder {
    /// Creates a new PlaceOrder command.
    pub fn new(items: Vec<RequestedItem>) -> Self {
        Self { items }
    }

    /// Appends an item to the request.
    pub fn with_item(mut self, product_id: ProductId, quantity: i64) -> Self {
        self.items.push(RequestedItem::new(product_id, quantity));
        self
    }
}
