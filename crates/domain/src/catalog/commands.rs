//! Catalog commands.

use store::NewProduct;

use super::CatalogError;
use crate::Money;

/// Command to add a product to the catalog.
#[derive(Debug, Clone)]
pub struct CreateProduct {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub stock: i64,
}

impl CreateProduct {
    /// Creates a new CreateProduct command.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: Money,
        stock: i64,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price,
            stock,
        }
    }

    /// Creates the command from a decimal price, as received over HTTP.
    ///
    /// Zero and negative prices fail with `InvalidPrice` before any
    /// conversion. Positive prices are rounded to the nearest cent and must
    /// come out as at least one representable cent.
    pub fn with_decimal_price(
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        stock: i64,
    ) -> Result<Self, CatalogError> {
        if price <= 0.0 {
            return Err(CatalogError::InvalidPrice { price });
        }
        let money =
            Money::try_from_decimal(price).ok_or(CatalogError::UnrepresentablePrice { price })?;
        if !money.is_positive() {
            return Err(CatalogError::PriceBelowOneCent { price });
        }
        Ok(Self::new(name, description, money, stock))
    }

    /// Checks the price and stock rules, price first.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if !self.price.is_positive() {
            return Err(CatalogError::InvalidPrice {
                price: self.price.as_decimal(),
            });
        }
        if self.stock < 0 {
            return Err(CatalogError::InvalidStock { stock: self.stock });
        }
        Ok(())
    }

    pub(crate) fn into_new_product(self) -> NewProduct {
        NewProduct {
            name: self.name,
            description: self.description,
            price_cents: self.price.cents(),
            stock: self.stock,
        }
    }
}
