//! Product business logic - Handles product creation and lookups.
//!
//! Products carry a strictly positive price and a non-negative stock level.
//! Names are not unique. All functions are async and return Result types for
//! proper error handling throughout the system.

use crate::{
    entities::{Product, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Input for creating a product
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NewProduct {
    /// Product name
    pub name: String,
    /// Unit price, must be > 0
    pub price: f64,
    /// Initial stock, defaults to 0 when omitted
    #[serde(default)]
    pub stock: Option<i32>,
}

impl NewProduct {
    /// Builds an input with no explicit stock.
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
            stock: None,
        }
    }

    /// Sets the initial stock.
    #[must_use]
    pub const fn with_stock(mut self, stock: i32) -> Self {
        self.stock = Some(stock);
        self
    }
}

/// Checks name, price and stock for a new product.
pub fn validate_product_input(input: &NewProduct) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(Error::validation("Product name cannot be empty"));
    }

    if !input.price.is_finite() {
        return Err(Error::validation("Price must be a valid number"));
    }

    if input.price <= 0.0 {
        return Err(Error::validation("Price must be positive"));
    }

    if input.stock.is_some_and(|stock| stock < 0) {
        return Err(Error::validation("Stock cannot be negative"));
    }

    Ok(())
}

/// Creates a new product with the specified parameters, performing input validation.
///
/// # Errors
/// Returns an error if:
/// - The product name is empty or whitespace-only
/// - The price is zero, negative or not finite (NaN, infinity)
/// - The stock is negative
/// - The database insert operation fails
#[instrument(skip(db))]
pub async fn create_product<C>(db: &C, input: &NewProduct) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    validate_product_input(input)?;

    let product = product::ActiveModel {
        name: Set(input.name.trim().to_string()),
        price: Set(input.price),
        stock: Set(input.stock.unwrap_or(0)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let created = product.insert(db).await?;

    info!(
        "Added product '{}' (ID: {}) at {} with stock {}",
        created.name, created.id, created.price, created.stock
    );
    Ok(created)
}

/// Retrieves all products ordered by ID.
pub async fn get_all_products<C>(db: &C) -> Result<Vec<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find()
        .order_by_asc(product::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific product by its unique ID.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}
