//! Order business logic - Order creation and order listings.
//!
//! An order references exactly one existing customer and at least one existing
//! product. The total is computed once from the resolved product prices and
//! stored on the order row; later price changes do not touch it. The order row
//! and its join rows are written in a single transaction.

use crate::{
    entities::{Customer, Order, OrderProduct, Product, customer, order, order_product, product},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument};

/// Input for creating an order
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    /// Customer placing the order
    pub customer_id: i64,
    /// Products in the order
    pub product_ids: Vec<i64>,
    /// Order timestamp, defaults to now
    #[serde(default)]
    pub order_date: Option<DateTime<Utc>>,
}

/// An order together with its customer and products.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    /// The stored order row
    #[serde(flatten)]
    pub order: order::Model,
    /// Owning customer
    pub customer: customer::Model,
    /// Attached products, ordered by ID
    pub products: Vec<product::Model>,
}

/// Sums the prices of the given products.
#[must_use]
pub fn compute_total_amount(products: &[product::Model]) -> f64 {
    products.iter().map(|p| p.price).sum()
}

/// Resolves each product ID in order, stopping at the first one that does not
/// exist. Repeated IDs resolve once, so the result is a set.
async fn resolve_products<C>(db: &C, product_ids: &[i64]) -> Result<Vec<product::Model>>
where
    C: ConnectionTrait,
{
    let mut seen = HashSet::new();
    let mut products = Vec::with_capacity(product_ids.len());

    for &product_id in product_ids {
        if !seen.insert(product_id) {
            continue;
        }
        let product = Product::find_by_id(product_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                Error::not_found(format!("Product with ID {product_id} does not exist"))
            })?;
        products.push(product);
    }

    Ok(products)
}

/// Creates an order for an existing customer and a non-empty set of products.
///
/// # Errors
/// Returns an error if:
/// - The customer does not exist (`NotFound`, "Customer does not exist")
/// - Any product ID does not exist (`NotFound`, names the first missing ID)
/// - No products were given (`ValidationFailed`)
/// - The database write fails
#[instrument(skip(db))]
pub async fn create_order(db: &DatabaseConnection, input: &NewOrder) -> Result<OrderView> {
    let txn = db.begin().await?;

    let customer = Customer::find_by_id(input.customer_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Customer does not exist"))?;

    let mut products = resolve_products(&txn, &input.product_ids).await?;
    if products.is_empty() {
        return Err(Error::validation("At least one product is required"));
    }
    products.sort_by_key(|p| p.id);

    let total_amount = compute_total_amount(&products);
    let order = order::ActiveModel {
        customer_id: Set(customer.id),
        order_date: Set(input.order_date.unwrap_or_else(Utc::now)),
        total_amount: Set(total_amount),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let links = products.iter().map(|p| order_product::ActiveModel {
        order_id: Set(order.id),
        product_id: Set(p.id),
    });
    OrderProduct::insert_many(links)
        .exec_without_returning(&txn)
        .await?;

    txn.commit().await?;

    info!(
        "Created order {} for customer {} with {} products, total {:.2}",
        order.id,
        customer.id,
        products.len(),
        order.total_amount
    );
    Ok(OrderView {
        order,
        customer,
        products,
    })
}

/// Upper bound on IDs bound into one `IN (...)` list. `SQLite` caps the
/// number of variables per statement.
const ID_CHUNK_SIZE: usize = 500;

/// Attaches customers and products to a batch of order rows.
async fn load_views<C>(db: &C, orders: Vec<order::Model>) -> Result<Vec<OrderView>>
where
    C: ConnectionTrait,
{
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let customer_ids: Vec<i64> = orders
        .iter()
        .map(|o| o.customer_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let mut links = Vec::new();
    for chunk in order_ids.chunks(ID_CHUNK_SIZE) {
        links.extend(
            OrderProduct::find()
                .filter(order_product::Column::OrderId.is_in(chunk.iter().copied()))
                .all(db)
                .await?,
        );
    }
    let product_ids: Vec<i64> = links
        .iter()
        .map(|l| l.product_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let mut products: HashMap<i64, product::Model> = HashMap::new();
    for chunk in product_ids.chunks(ID_CHUNK_SIZE) {
        let found = Product::find()
            .filter(product::Column::Id.is_in(chunk.iter().copied()))
            .all(db)
            .await?;
        products.extend(found.into_iter().map(|p| (p.id, p)));
    }

    let mut customers: HashMap<i64, customer::Model> = HashMap::new();
    for chunk in customer_ids.chunks(ID_CHUNK_SIZE) {
        let found = Customer::find()
            .filter(customer::Column::Id.is_in(chunk.iter().copied()))
            .all(db)
            .await?;
        customers.extend(found.into_iter().map(|c| (c.id, c)));
    }

    let mut products_by_order: HashMap<i64, Vec<product::Model>> = HashMap::new();
    for link in links {
        if let Some(p) = products.get(&link.product_id) {
            products_by_order
                .entry(link.order_id)
                .or_default()
                .push(p.clone());
        }
    }

    let mut views = Vec::with_capacity(orders.len());
    for order in orders {
        let customer = customers.get(&order.customer_id).cloned().ok_or_else(|| {
            Error::not_found(format!(
                "Customer {} for order {} is missing",
                order.customer_id, order.id
            ))
        })?;
        let mut products = products_by_order.remove(&order.id).unwrap_or_default();
        products.sort_by_key(|p| p.id);
        views.push(OrderView {
            order,
            customer,
            products,
        });
    }

    debug!("Loaded {} order views", views.len());
    Ok(views)
}

/// Retrieves all orders ordered by ID, optionally only those placed at or
/// after `order_date_gte`.
pub async fn get_all_orders<C>(
    db: &C,
    order_date_gte: Option<DateTime<Utc>>,
) -> Result<Vec<OrderView>>
where
    C: ConnectionTrait,
{
    let mut query = Order::find().order_by_asc(order::Column::Id);
    if let Some(since) = order_date_gte {
        query = query.filter(order::Column::OrderDate.gte(since));
    }
    let orders = query.all(db).await?;
    load_views(db, orders).await
}

/// Retrieves a single order with its customer and products.
pub async fn get_order_by_id<C>(db: &C, order_id: i64) -> Result<Option<OrderView>>
where
    C: ConnectionTrait,
{
    let Some(order) = Order::find_by_id(order_id).one(db).await? else {
        return Ok(None);
    };
    Ok(load_views(db, vec![order]).await?.pop())
}
