use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};

use crate::{
    LineItemRecord, NewOrder, NewProduct, OrderId, OrderRecord, OrderStatus, ProductId,
    ProductRecord, Result, StoreError, StoredOrder,
    store::{Store, UnitOfWork},
};

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_product(row: PgRow) -> Result<ProductRecord> {
        Ok(ProductRecord {
            id: ProductId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price_cents: row.try_get("price_cents")?,
            stock: row.try_get("stock")?,
        })
    }

    fn row_to_order(row: PgRow) -> Result<OrderRecord> {
        let status: String = row.try_get("status")?;
        Ok(OrderRecord {
            id: OrderId::new(row.try_get("id")?),
            total_cents: row.try_get("total_cents")?,
            status: status
                .parse::<OrderStatus>()
                .map_err(|e| StoreError::InvalidStatus(e.0))?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_line_item(row: PgRow) -> Result<LineItemRecord> {
        Ok(LineItemRecord {
            order_id: OrderId::new(row.try_get("order_id")?),
            line_no: row.try_get("line_no")?,
            product_id: ProductId::new(row.try_get("product_id")?),
            quantity: row.try_get("quantity")?,
            unit_price_cents: row.try_get("unit_price_cents")?,
        })
    }
}

#[async_trait]
impl Store for PostgresStore {
    type UnitOfWork = PostgresUnitOfWork;

    async fn begin(&self) -> Result<PostgresUnitOfWork> {
        let tx = self.pool.begin().await?;
        Ok(PostgresUnitOfWork { tx })
    }

    async fn list_products(&self) -> Result<Vec<ProductRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, price_cents, stock
            FROM products
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<ProductRecord>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT id, name, description, price_cents, stock
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<StoredOrder>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT id, total_cents, status, created_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let order = Self::row_to_order(row)?;

        let rows = sqlx::query(
            r#"
            SELECT order_id, line_no, product_id, quantity, unit_price_cents
            FROM order_line_items
            WHERE order_id = $1
            ORDER BY line_no ASC
            "#,
        )
        .bind(id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        let line_items = rows
            .into_iter()
            .map(Self::row_to_line_item)
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(StoredOrder { order, line_items }))
    }
}

/// Unit of work over a [`PostgresStore`], wrapping one database transaction.
///
/// Dropping it without committing rolls the transaction back.
pub struct PostgresUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    async fn fetch_product_for_update(&mut self, id: ProductId) -> Result<Option<ProductRecord>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT id, name, description, price_cents, stock
            FROM products
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(PostgresStore::row_to_product).transpose()
    }

    async fn insert_product(&mut self, product: NewProduct) -> Result<ProductRecord> {
        let row = sqlx::query(
            r#"
            INSERT INTO products (name, description, price_cents, stock)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, price_cents, stock
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock)
        .fetch_one(&mut *self.tx)
        .await?;

        PostgresStore::row_to_product(row)
    }

    async fn update_product_stock(&mut self, id: ProductId, stock: i64) -> Result<()> {
        let result = sqlx::query("UPDATE products SET stock = $2 WHERE id = $1")
            .bind(id.as_i64())
            .bind(stock)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "product",
                id: id.as_i64(),
            });
        }
        Ok(())
    }

    async fn insert_order(&mut self, order: NewOrder) -> Result<OrderRecord> {
        let row = sqlx::query(
            r#"
            INSERT INTO orders (total_cents, status, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, total_cents, status, created_at
            "#,
        )
        .bind(order.total_cents)
        .bind(order.status.as_str())
        .bind(order.created_at)
        .fetch_one(&mut *self.tx)
        .await?;

        PostgresStore::row_to_order(row)
    }

    async fn update_order(
        &mut self,
        id: OrderId,
        total_cents: i64,
        status: OrderStatus,
    ) -> Result<()> {
        let result = sqlx::query("UPDATE orders SET total_cents = $2, status = $3 WHERE id = $1")
            .bind(id.as_i64())
            .bind(total_cents)
            .bind(status.as_str())
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "order",
                id: id.as_i64(),
            });
        }
        Ok(())
    }

    async fn insert_line_item(&mut self, item: LineItemRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO order_line_items (order_id, line_no, product_id, quantity, unit_price_cents)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(item.order_id.as_i64())
        .bind(item.line_no)
        .bind(item.product_id.as_i64())
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
