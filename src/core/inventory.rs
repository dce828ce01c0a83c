//! Inventory replenishment business logic
//!
//! Products whose stock falls below [`LOW_STOCK_THRESHOLD`] are topped up by
//! [`RESTOCK_AMOUNT`]. Stock only ever increases along this path, and a run
//! touches only products still under the threshold, so re-running it is safe.

use crate::{
    entities::{Product, product},
    errors::Result,
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Products with stock strictly below this are restocked
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// Units added to each low-stock product per run
pub const RESTOCK_AMOUNT: i32 = 10;

/// Represents the result of restocking a single product.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestockedProduct {
    /// ID of the restocked product
    pub id: i64,
    /// Name of the restocked product
    pub name: String,
    /// Stock before the run
    pub old_stock: i32,
    /// Stock after the run
    pub new_stock: i32,
}

/// Raises the stock of every product below [`LOW_STOCK_THRESHOLD`] by
/// [`RESTOCK_AMOUNT`] and reports what changed, in product ID order.
///
/// All updates happen in one transaction: either every low-stock product is
/// restocked or none is.
#[instrument(skip(db))]
pub async fn update_low_stock_products(db: &DatabaseConnection) -> Result<Vec<RestockedProduct>> {
    let txn = db.begin().await?;

    let low_stock = Product::find()
        .filter(product::Column::Stock.lt(LOW_STOCK_THRESHOLD))
        .order_by_asc(product::Column::Id)
        .all(&txn)
        .await?;
    debug!("Found {} low-stock products", low_stock.len());

    let mut restocked = Vec::with_capacity(low_stock.len());
    for item in low_stock {
        let old_stock = item.stock;
        let new_stock = old_stock.saturating_add(RESTOCK_AMOUNT);

        let id = item.id;
        let name = item.name.clone();
        let mut active_model: product::ActiveModel = item.into();
        active_model.stock = Set(new_stock);
        active_model.update(&txn).await?;

        restocked.push(RestockedProduct {
            id,
            name,
            old_stock,
            new_stock,
        });
    }

    txn.commit().await?;

    info!("Restocked {} products", restocked.len());
    Ok(restocked)
}

/// Formats the summary message for a replenishment run.
#[must_use]
pub fn format_restock_summary(restocked: &[RestockedProduct]) -> String {
    match restocked.len() {
        0 => "No low-stock products found".to_string(),
        1 => "Updated 1 low-stock product".to_string(),
        n => format!("Updated {n} low-stock products"),
    }
}
