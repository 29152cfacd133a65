//! Order placement and lookup endpoints.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::{Order, OrderId, OrderStatus, PlaceOrder, Product, ProductId, RequestedItem};
use serde::{Deserialize, Serialize};
use store::Store;

use super::{AppState, parse_id};
use crate::error::ApiError;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub products: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: i64,
    pub quantity: i64,
}

impl From<PlaceOrderRequest> for PlaceOrder {
    fn from(req: PlaceOrderRequest) -> Self {
        PlaceOrder::new(
            req.products
                .into_iter()
                .map(|item| RequestedItem::new(ProductId::new(item.product_id), item.quantity))
                .collect(),
        )
    }
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: i64,
    pub total_price: f64,
    pub status: OrderStatus,
    pub created_at: String,
    pub products: Vec<OrderLineResponse>,
}

/// A line of an order, shown with the product it refers to.
#[derive(Debug, Serialize)]
pub struct OrderLineResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
    pub quantity: i64,
    pub unit_price: f64,
}

// -- Handlers --

/// POST /orders: places an order, all items or none.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<PlaceOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let Json(req) = payload?;

    let order = state.orders.place_order(req.into()).await?;
    let response = to_response(&state, order).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /orders/{id}: returns a placed order.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = OrderId::new(parse_id(&id)?);

    let order = state
        .orders
        .get_order(order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order with ID {order_id} not found.")))?;

    Ok(Json(to_response(&state, order).await?))
}

/// Joins each line with the current catalog entry for its product.
async fn to_response<S: Store + Clone + 'static>(
    state: &AppState<S>,
    order: Order,
) -> Result<OrderResponse, ApiError> {
    let mut products: HashMap<ProductId, Product> = HashMap::new();
    let mut lines = Vec::with_capacity(order.line_items.len());

    for item in &order.line_items {
        if !products.contains_key(&item.product_id) {
            let product = state
                .catalog
                .get_product(item.product_id)
                .await?
                .ok_or_else(|| {
                    ApiError::Internal(format!(
                        "order {} references missing product {}",
                        order.id, item.product_id
                    ))
                })?;
            products.insert(item.product_id, product);
        }
        let product = &products[&item.product_id];

        lines.push(OrderLineResponse {
            id: product.id.as_i64(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.as_decimal(),
            stock: product.stock,
            quantity: item.quantity,
            unit_price: item.unit_price.as_decimal(),
        });
    }

    Ok(OrderResponse {
        id: order.id.as_i64(),
        total_price: order.total_price.as_decimal(),
        status: order.status,
        created_at: order.created_at.to_rfc3339(),
        products: lines,
    })
}
