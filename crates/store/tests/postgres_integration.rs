//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use serial_test::serial;
use sqlx::PgPool;
use store::{
    LineItemRecord, NewOrder, NewProduct, OrderStatus, PostgresStore, ProductId, Store,
    StoreError, UnitOfWork,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_catalog_tables.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    // Clear tables for test isolation
    sqlx::query("TRUNCATE TABLE order_line_items, orders, products RESTART IDENTITY")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStore::new(pool)
}

fn widget(stock: i64) -> NewProduct {
    NewProduct {
        name: "Widget".to_string(),
        description: "A widget".to_string(),
        price_cents: 1000,
        stock,
    }
}

async fn seed_product(store: &PostgresStore, stock: i64) -> ProductId {
    let mut uow = store.begin().await.unwrap();
    let product = uow.insert_product(widget(stock)).await.unwrap();
    uow.commit().await.unwrap();
    product.id
}

#[tokio::test]
#[serial]
async fn insert_and_list_products() {
    let store = get_test_store().await;

    let first = seed_product(&store, 5).await;
    let second = seed_product(&store, 0).await;

    let products = store.list_products().await.unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].id, first);
    assert_eq!(products[1].id, second);
    assert_eq!(products[0].price_cents, 1000);
    assert_eq!(products[1].stock, 0);
}

#[tokio::test]
#[serial]
async fn get_missing_product_returns_none() {
    let store = get_test_store().await;

    let product = store.get_product(ProductId::new(999)).await.unwrap();
    assert!(product.is_none());
}

#[tokio::test]
#[serial]
async fn rollback_discards_stock_update() {
    let store = get_test_store().await;
    let id = seed_product(&store, 5).await;

    let mut uow = store.begin().await.unwrap();
    uow.update_product_stock(id, 1).await.unwrap();
    uow.rollback().await.unwrap();

    let product = store.get_product(id).await.unwrap().unwrap();
    assert_eq!(product.stock, 5);
}

#[tokio::test]
#[serial]
async fn dropped_unit_of_work_discards_order() {
    let store = get_test_store().await;

    {
        let mut uow = store.begin().await.unwrap();
        uow.insert_order(NewOrder::pending()).await.unwrap();
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
#[serial]
async fn order_with_duplicate_product_lines_round_trips() {
    let store = get_test_store().await;
    let id = seed_product(&store, 5).await;

    let mut uow = store.begin().await.unwrap();
    let order = uow.insert_order(NewOrder::pending()).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    for line_no in 1..=2 {
        uow.insert_line_item(LineItemRecord {
            order_id: order.id,
            line_no,
            product_id: id,
            quantity: 2,
            unit_price_cents: 1000,
        })
        .await
        .unwrap();
    }
    uow.update_order(order.id, 4000, OrderStatus::Completed)
        .await
        .unwrap();
    uow.commit().await.unwrap();

    let stored = store.get_order(order.id).await.unwrap().unwrap();
    assert_eq!(stored.order.total_cents, 4000);
    assert_eq!(stored.order.status, OrderStatus::Completed);
    assert_eq!(stored.line_items.len(), 2);
    assert!(stored.line_items.iter().all(|l| l.product_id == id));
}

#[tokio::test]
#[serial]
async fn negative_stock_violates_constraint() {
    let store = get_test_store().await;
    let id = seed_product(&store, 1).await;

    let mut uow = store.begin().await.unwrap();
    let result = uow.update_product_stock(id, -1).await;

    match result {
        Err(StoreError::Database(sqlx::Error::Database(db_err))) => {
            assert_eq!(db_err.constraint(), Some("products_stock_non_negative"));
        }
        other => panic!("expected constraint violation, got {other:?}"),
    }
}

#[tokio::test]
#[serial]
async fn update_missing_product_is_not_found() {
    let store = get_test_store().await;

    let mut uow = store.begin().await.unwrap();
    let result = uow.update_product_stock(ProductId::new(42), 3).await;
    assert!(matches!(
        result,
        Err(StoreError::NotFound {
            entity: "product",
            id: 42
        })
    ));
}

#[tokio::test]
#[serial]
async fn row_lock_prevents_lost_updates() {
    let store = get_test_store().await;
    let id = seed_product(&store, 20).await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let mut uow = store.begin().await.unwrap();
            let product = uow.fetch_product_for_update(id).await.unwrap().unwrap();
            uow.update_product_stock(id, product.stock - 1).await.unwrap();
            uow.commit().await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let product = store.get_product(id).await.unwrap().unwrap();
    assert_eq!(product.stock, 10);
}
