//! Catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::{CreateProduct, DomainError, Product, ProductId};
use serde::{Deserialize, Serialize};
use store::Store;

use super::{AppState, parse_id};
use crate::error::ApiError;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    /// Decimal price, rounded to the nearest cent.
    pub price: f64,
    pub stock: i64,
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.as_i64(),
            name: product.name,
            description: product.description,
            price: product.price.as_decimal(),
            stock: product.stock,
        }
    }
}

// -- Handlers --

/// POST /products: validates and adds a product to the catalog.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let Json(req) = payload?;

    let cmd = CreateProduct::with_decimal_price(req.name, req.description, req.price, req.stock)
        .map_err(DomainError::from)?;
    let product = state.catalog.create_product(cmd).await?;

    Ok((StatusCode::CREATED, Json(product.into())))
}

/// GET /products: lists the catalog in id order.
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.catalog.list_products().await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// GET /products/{id}: returns a single product.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product_id = ProductId::new(parse_id(&id)?);

    let product = state
        .catalog
        .get_product(product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product with ID {product_id} not found.")))?;

    Ok(Json(product.into()))
}
