//! Catalog service.

use common::ProductId;
use store::{Store, UnitOfWork};

use super::{CreateProduct, Product};
use crate::error::DomainError;

/// Service for creating and reading catalog products.
#[derive(Clone)]
pub struct CatalogService<S: Store> {
    store: S,
}

impl<S: Store> CatalogService<S> {
    /// Creates a new catalog service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Validates and persists a new product.
    ///
    /// Nothing is written when validation fails.
    #[tracing::instrument(skip(self, cmd), fields(name = %cmd.name))]
    pub async fn create_product(&self, cmd: CreateProduct) -> Result<Product, DomainError> {
        if let Err(err) = cmd.validate() {
            tracing::debug!(error = %err, "product rejected");
            metrics::counter!("products_rejected_total").increment(1);
            return Err(err.into());
        }

        let mut uow = self.store.begin().await?;
        let record = uow.insert_product(cmd.into_new_product()).await?;
        uow.commit().await?;

        metrics::counter!("products_created_total").increment(1);
        tracing::info!(product_id = %record.id, "product created");
        Ok(record.into())
    }

    /// Returns a snapshot of the whole catalog.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        let records = self.store.list_products().await?;
        Ok(records.into_iter().map(Product::from).collect())
    }

    /// Loads a product by ID.
    ///
    /// Returns None if the product doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, DomainError> {
        Ok(self.store.get_product(id).await?.map(Product::from))
    }
}
