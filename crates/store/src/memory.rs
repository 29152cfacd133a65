use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    LineItemRecord, NewOrder, NewProduct, OrderId, OrderRecord, OrderStatus, ProductId,
    ProductRecord, Result, StoreError, StoredOrder,
    store::{Store, UnitOfWork},
};

#[derive(Debug, Clone, Default)]
struct Tables {
    products: BTreeMap<ProductId, ProductRecord>,
    orders: BTreeMap<OrderId, OrderRecord>,
    line_items: Vec<LineItemRecord>,
    last_product_id: i64,
    last_order_id: i64,
}

/// In-memory store implementation for testing.
///
/// Units of work are serialized: `begin` holds the table lock until the unit
/// of work commits, rolls back or is dropped. Writes are staged on a working
/// copy of the tables which replaces the shared tables on commit.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
    fail_on_commit: Arc<AtomicBool>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the store to fail every commit until reset.
    pub fn set_fail_on_commit(&self, fail: bool) {
        self.fail_on_commit.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of committed orders.
    pub async fn order_count(&self) -> usize {
        self.tables.lock().await.orders.len()
    }

    /// Returns the number of committed line items across all orders.
    pub async fn line_item_count(&self) -> usize {
        self.tables.lock().await.line_items.len()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    type UnitOfWork = InMemoryUnitOfWork;

    async fn begin(&self) -> Result<InMemoryUnitOfWork> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(InMemoryUnitOfWork {
            guard,
            working,
            fail_on_commit: self.fail_on_commit.clone(),
        })
    }

    async fn list_products(&self) -> Result<Vec<ProductRecord>> {
        let tables = self.tables.lock().await;
        Ok(tables.products.values().cloned().collect())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<ProductRecord>> {
        let tables = self.tables.lock().await;
        Ok(tables.products.get(&id).cloned())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<StoredOrder>> {
        let tables = self.tables.lock().await;
        let Some(order) = tables.orders.get(&id).cloned() else {
            return Ok(None);
        };

        let mut line_items: Vec<_> = tables
            .line_items
            .iter()
            .filter(|item| item.order_id == id)
            .cloned()
            .collect();
        line_items.sort_by_key(|item| item.line_no);

        Ok(Some(StoredOrder { order, line_items }))
    }
}

/// Unit of work over an [`InMemoryStore`].
pub struct InMemoryUnitOfWork {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
    fail_on_commit: Arc<AtomicBool>,
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn fetch_product_for_update(&mut self, id: ProductId) -> Result<Option<ProductRecord>> {
        // The whole table set is already locked by `begin`.
        Ok(self.working.products.get(&id).cloned())
    }

    async fn insert_product(&mut self, product: NewProduct) -> Result<ProductRecord> {
        self.working.last_product_id += 1;
        let record = ProductRecord {
            id: ProductId::new(self.working.last_product_id),
            name: product.name,
            description: product.description,
            price_cents: product.price_cents,
            stock: product.stock,
        };
        self.working.products.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_product_stock(&mut self, id: ProductId, stock: i64) -> Result<()> {
        let product = self
            .working
            .products
            .get_mut(&id)
            .ok_or(StoreError::NotFound {
                entity: "product",
                id: id.as_i64(),
            })?;
        product.stock = stock;
        Ok(())
    }

    async fn insert_order(&mut self, order: NewOrder) -> Result<OrderRecord> {
        self.working.last_order_id += 1;
        let record = OrderRecord {
            id: OrderId::new(self.working.last_order_id),
            total_cents: order.total_cents,
            status: order.status,
            created_at: order.created_at,
        };
        self.working.orders.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_order(
        &mut self,
        id: OrderId,
        total_cents: i64,
        status: OrderStatus,
    ) -> Result<()> {
        let order = self
            .working
            .orders
            .get_mut(&id)
            .ok_or(StoreError::NotFound {
                entity: "order",
                id: id.as_i64(),
            })?;
        order.total_cents = total_cents;
        order.status = status;
        Ok(())
    }

    async fn insert_line_item(&mut self, item: LineItemRecord) -> Result<()> {
        if !self.working.orders.contains_key(&item.order_id) {
            return Err(StoreError::NotFound {
                entity: "order",
                id: item.order_id.as_i64(),
            });
        }
        if !self.working.products.contains_key(&item.product_id) {
            return Err(StoreError::NotFound {
                entity: "product",
                id: item.product_id.as_i64(),
            });
        }
        self.working.line_items.push(item);
        Ok(())
    }

    async fn commit(self) -> Result<()> {
        if self.fail_on_commit.load(Ordering::SeqCst) {
            tracing::warn!("in-memory commit failure injected, discarding unit of work");
            return Err(StoreError::Unavailable("commit failed".to_string()));
        }

        let Self {
            mut guard, working, ..
        } = self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(stock: i64) -> NewProduct {
        NewProduct {
            name: "Widget".to_string(),
            description: "A widget".to_string(),
            price_cents: 1000,
            stock,
        }
    }

    #[tokio::test]
    async fn test_commit_publishes_writes() {
        let store = InMemoryStore::new();

        let mut uow = store.begin().await.unwrap();
        let product = uow.insert_product(widget(5)).await.unwrap();
        uow.commit().await.unwrap();

        assert_eq!(product.id, ProductId::new(1));
        let stored = store.get_product(product.id).await.unwrap().unwrap();
        assert_eq!(stored, product);
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let store = InMemoryStore::new();

        let mut uow = store.begin().await.unwrap();
        uow.insert_product(widget(5)).await.unwrap();
        uow.rollback().await.unwrap();

        assert!(store.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_drop_without_commit_discards_writes() {
        let store = InMemoryStore::new();

        {
            let mut uow = store.begin().await.unwrap();
            uow.insert_order(NewOrder::pending()).await.unwrap();
        }

        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_stock_update_is_isolated_until_commit() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let product = uow.insert_product(widget(5)).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        uow.update_product_stock(product.id, 2).await.unwrap();
        let seen = uow.fetch_product_for_update(product.id).await.unwrap();
        assert_eq!(seen.unwrap().stock, 2);
        uow.rollback().await.unwrap();

        let stored = store.get_product(product.id).await.unwrap().unwrap();
        assert_eq!(stored.stock, 5);
    }

    #[tokio::test]
    async fn test_update_missing_product_fails() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().await.unwrap();

        let result = uow.update_product_stock(ProductId::new(99), 1).await;
        assert!(matches!(
            result,
            Err(StoreError::NotFound {
                entity: "product",
                id: 99
            })
        ));
    }

    #[tokio::test]
    async fn test_line_items_returned_in_line_order() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let product = uow.insert_product(widget(5)).await.unwrap();
        let order = uow.insert_order(NewOrder::pending()).await.unwrap();
        for line_no in [2, 1] {
            uow.insert_line_item(LineItemRecord {
                order_id: order.id,
                line_no,
                product_id: product.id,
                quantity: 1,
                unit_price_cents: 1000,
            })
            .await
            .unwrap();
        }
        uow.update_order(order.id, 2000, OrderStatus::Completed)
            .await
            .unwrap();
        uow.commit().await.unwrap();

        let stored = store.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(stored.order.status, OrderStatus::Completed);
        assert_eq!(stored.order.total_cents, 2000);
        let lines: Vec<_> = stored.line_items.iter().map(|l| l.line_no).collect();
        assert_eq!(lines, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_injected_commit_failure_discards_writes() {
        let store = InMemoryStore::new();
        store.set_fail_on_commit(true);

        let mut uow = store.begin().await.unwrap();
        uow.insert_product(widget(5)).await.unwrap();
        let result = uow.commit().await;

        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert!(store.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_identities_are_sequential() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let first = uow.insert_product(widget(1)).await.unwrap();
        let second = uow.insert_product(widget(1)).await.unwrap();
        uow.commit().await.unwrap();

        assert_eq!(first.id, ProductId::new(1));
        assert_eq!(second.id, ProductId::new(2));
    }
}
