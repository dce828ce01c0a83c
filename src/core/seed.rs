//! Demo data seeding
//!
//! Populates an empty database with a couple of customers, three products and
//! one order so the API has something to show. Seeding never deletes data: if
//! any customer already exists the database is left untouched.

use crate::{
    core::{customer, order, product},
    entities::Customer,
    errors::Result,
};
use sea_orm::{PaginatorTrait, prelude::*};
use tracing::{info, instrument};

/// Seeds demo data into an empty database.
///
/// Returns `true` if data was inserted, `false` if the database already had
/// customers.
#[instrument(skip(db))]
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<bool> {
    if Customer::find().count(db).await? > 0 {
        info!("Customers already present, skipping demo seed");
        return Ok(false);
    }

    let outcome = customer::bulk_create_customers(
        db,
        &[
            customer::NewCustomer::new("John Doe", "john@example.com")
                .with_phone("+1234567890"),
            customer::NewCustomer::new("Jane Smith", "jane@example.com")
                .with_phone("987-654-3210"),
        ],
    )
    .await?;

    let mut products = Vec::new();
    for input in [
        product::NewProduct::new("Laptop", 999.99).with_stock(10),
        product::NewProduct::new("Phone", 699.99).with_stock(15),
        product::NewProduct::new("Tablet", 399.99).with_stock(20),
    ] {
        products.push(product::create_product(db, &input).await?);
    }

    if let Some(first) = outcome.customers.first() {
        order::create_order(
            db,
            &order::NewOrder {
                customer_id: first.id,
                product_ids: products.iter().take(2).map(|p| p.id).collect(),
                order_date: None,
            },
        )
        .await?;
    }

    info!("Database seeded with demo data");
    Ok(true)
}
