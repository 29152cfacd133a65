use async_trait::async_trait;

use crate::{
    LineItemRecord, NewOrder, NewProduct, OrderId, OrderRecord, OrderStatus, ProductId,
    ProductRecord, Result, StoredOrder,
};

/// Core trait for store implementations.
///
/// Reads that don't need isolation go straight to the store. Anything that
/// writes goes through a [`UnitOfWork`] opened with [`Store::begin`].
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait Store: Send + Sync {
    /// The unit of work type handed out by [`Store::begin`].
    type UnitOfWork: UnitOfWork;

    /// Opens a new unit of work.
    async fn begin(&self) -> Result<Self::UnitOfWork>;

    /// Returns every product in the catalog, ordered by id.
    async fn list_products(&self) -> Result<Vec<ProductRecord>>;

    /// Retrieves a single product.
    ///
    /// Returns None if the product doesn't exist.
    async fn get_product(&self, id: ProductId) -> Result<Option<ProductRecord>>;

    /// Retrieves an order with its line items.
    ///
    /// Returns None if the order doesn't exist.
    async fn get_order(&self, id: OrderId) -> Result<Option<StoredOrder>>;
}

/// A single atomic transaction against the store.
///
/// Writes made through a unit of work are invisible to everyone else until
/// [`UnitOfWork::commit`] succeeds. Calling [`UnitOfWork::rollback`], or
/// dropping the unit of work without committing, discards all of them.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Fetches a product and locks it for the rest of the unit of work.
    ///
    /// Returns None if the product doesn't exist.
    async fn fetch_product_for_update(&mut self, id: ProductId) -> Result<Option<ProductRecord>>;

    /// Inserts a product and returns it with its assigned identity.
    async fn insert_product(&mut self, product: NewProduct) -> Result<ProductRecord>;

    /// Overwrites the stock level of an existing product.
    async fn update_product_stock(&mut self, id: ProductId, stock: i64) -> Result<()>;

    /// Inserts an order header and returns it with its assigned identity.
    async fn insert_order(&mut self, order: NewOrder) -> Result<OrderRecord>;

    /// Overwrites the total and status of an existing order.
    async fn update_order(
        &mut self,
        id: OrderId,
        total_cents: i64,
        status: OrderStatus,
    ) -> Result<()>;

    /// Appends a line item to an order.
    async fn insert_line_item(&mut self, item: LineItemRecord) -> Result<()>;

    /// Publishes every write made through this unit of work.
    async fn commit(self) -> Result<()>;

    /// Discards every write made through this unit of work.
    async fn rollback(self) -> Result<()>;
}
