//! Order service.

use common::{OrderId, OrderStatus, ProductId};
use store::{LineItemRecord, NewOrder, Store, UnitOfWork};

use super::{LineItem, Order, OrderError, PlaceOrder, RequestedItem};
use crate::Money;
use crate::error::DomainError;

/// Service for placing and reading orders.
#[derive(Clone)]
pub struct OrderService<S: Store> {
    store: S,
}

impl<S: Store> OrderService<S> {
    /// Creates a new order service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Places an order.
    ///
    /// The whole item list runs inside one unit of work. Stock is checked and
    /// decremented item by item in request order; the first failing item
    /// aborts placement and rolls back every decrement made before it,
    /// together with the pending order row. On success the order is
    /// committed as `completed`.
    #[tracing::instrument(skip(self, cmd), fields(items = cmd.items.len()))]
    pub async fn place_order(&self, cmd: PlaceOrder) -> Result<Order, DomainError> {
        if cmd.items.is_empty() {
            return Err(rejected(OrderError::NoItems.into()));
        }

        let started = std::time::Instant::now();
        let mut uow = self.store.begin().await?;

        let order = match apply_items(&mut uow, &cmd.items).await {
            Ok(order) => order,
            Err(err) => {
                if let Err(rollback_err) = uow.rollback().await {
                    tracing::error!(error = %rollback_err, "rollback failed");
                }
                return Err(rejected(err));
            }
        };

        if let Err(err) = uow.commit().await {
            return Err(rejected(err.into()));
        }

        metrics::counter!("orders_placed_total").increment(1);
        metrics::histogram!("order_placement_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        tracing::info!(
            order_id = %order.id,
            total = %order.total_price,
            lines = order.line_count(),
            "order placed"
        );
        Ok(order)
    }

    /// Loads an order by ID.
    ///
    /// Returns None if the order doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.store.get_order(order_id).await?.map(Order::from))
    }
}

/// Records a rejected placement and hands the error back.
fn rejected(err: DomainError) -> DomainError {
    let reason = match &err {
        DomainError::Order(order_err) => order_err.reason(),
        DomainError::Catalog(_) => "catalog",
        DomainError::Store(_) => "store",
    };
    metrics::counter!("orders_rejected_total", "reason" => reason).increment(1);
    tracing::warn!(error = %err, reason, "order rejected");
    err
}

/// Runs the placement loop against an open unit of work.
///
/// Leaves committing or rolling back to the caller.
async fn apply_items<U: UnitOfWork>(
    uow: &mut U,
    items: &[RequestedItem],
) -> Result<Order, DomainError> {
    let header = uow.insert_order(NewOrder::pending()).await?;

    // Row locks are taken in product id order before any item is checked.
    let mut product_ids: Vec<ProductId> = items.iter().map(|item| item.product_id).collect();
    product_ids.sort_unstable();
    product_ids.dedup();
    for product_id in product_ids {
        uow.fetch_product_for_update(product_id).await?;
    }

    let mut total = Money::zero();
    let mut line_items = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let product = uow
            .fetch_product_for_update(item.product_id)
            .await?
            .ok_or(OrderError::ProductNotFound {
                product_id: item.product_id,
            })?;

        if item.quantity <= 0 {
            return Err(OrderError::InvalidQuantity {
                product_id: item.product_id,
                quantity: item.quantity,
            }
            .into());
        }

        if product.stock < item.quantity {
            return Err(OrderError::InsufficientStock {
                product_id: product.id,
                product_name: product.name,
                requested: item.quantity,
                available: product.stock,
            }
            .into());
        }

        uow.update_product_stock(product.id, product.stock - item.quantity)
            .await?;

        let unit_price = Money::from_cents(product.price_cents);
        total = unit_price
            .checked_multiply(item.quantity)
            .and_then(|cost| total.checked_add(cost))
            .ok_or(OrderError::TotalOverflow)?;

        let record = LineItemRecord {
            order_id: header.id,
            line_no: line_number(index)?,
            product_id: product.id,
            quantity: item.quantity,
            unit_price_cents: unit_price.cents(),
        };
        uow.insert_line_item(record.clone()).await?;
        line_items.push(LineItem::from(record));
    }

    debug_assert!(header.status.can_complete());
    uow.update_order(header.id, total.cents(), OrderStatus::Completed)
        .await?;

    Ok(Order {
        id: header.id,
        total_price: total,
        status: OrderStatus::Completed,
        created_at: header.created_at,
        line_items,
    })
}

/// Converts a 0-based item index into a 1-based line number.
fn line_number(index: usize) -> Result<i32, OrderError> {
    index
        .checked_add(1)
        .and_then(|n| i32::try_from(n).ok())
        .ok_or(OrderError::TooManyItems { max: i32::MAX })
}
