//! Database configuration module for the CRM backend.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema (including the unique constraint on customer email and the order/product
//! join table) always matches the Rust structs.

use crate::config::AppConfig;
use crate::entities::{Customer, Order, OrderProduct, Product};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::PathBuf;
use tracing::{debug, info};

/// Fallback database location when neither `DATABASE_URL` nor the config sets one
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/crm.sqlite?mode=rwc";

/// Resolves the database URL.
///
/// `DATABASE_URL` wins, then the `[database] url` setting, then
/// [`DEFAULT_DATABASE_URL`].
#[must_use]
pub fn get_database_url(config: &AppConfig) -> String {
    std::env::var("DATABASE_URL")
        .ok()
        .or_else(|| config.database.url.clone())
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database and makes sure all tables exist.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database at {}", database_url);
    if let Some(parent) = sqlite_file_path(database_url)
        .as_deref()
        .and_then(std::path::Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)?;
    }
    let db = Database::connect(database_url).await?;
    create_tables(&db).await?;
    info!("Database connection ready");
    Ok(db)
}

/// Extracts the file path from a `SQLite` URL. In-memory databases and other
/// backends have none.
fn sqlite_file_path(database_url: &str) -> Option<PathBuf> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Some(PathBuf::from(path))
}

/// Creates all necessary database tables if they do not already exist.
///
/// Tables are created parent-first so foreign keys resolve: customers, products,
/// orders, then the order/product join table.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut customer_table = schema.create_table_from_entity(Customer);
    let mut product_table = schema.create_table_from_entity(Product);
    let mut order_table = schema.create_table_from_entity(Order);
    let mut order_product_table = schema.create_table_from_entity(OrderProduct);

    db.execute(builder.build(customer_table.if_not_exists()))
        .await?;
    db.execute(builder.build(product_table.if_not_exists()))
        .await?;
    db.execute(builder.build(order_table.if_not_exists()))
        .await?;
    db.execute(builder.build(order_product_table.if_not_exists()))
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        customer::Model as CustomerModel, order::Model as OrderModel,
        order_product::Model as OrderProductModel, product::Model as ProductModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[test]
    fn test_sqlite_file_path() {
        assert_eq!(
            sqlite_file_path("sqlite://data/crm.sqlite?mode=rwc"),
            Some(PathBuf::from("data/crm.sqlite"))
        );
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("postgres://localhost/crm"), None);
    }

    #[tokio::test]
    async fn test_create_connection() -> Result<()> {
        let db = create_connection("sqlite::memory:").await?;

        let _: Vec<CustomerModel> = Customer::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<CustomerModel> = Customer::find().limit(1).all(&db).await?;
        let _: Vec<ProductModel> = Product::find().limit(1).all(&db).await?;
        let _: Vec<OrderModel> = Order::find().limit(1).all(&db).await?;
        let _: Vec<OrderProductModel> = OrderProduct::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[test]
    fn test_database_url_prefers_config_over_default() {
        // Only meaningful when DATABASE_URL is not set in the test environment
        if std::env::var("DATABASE_URL").is_ok() {
            return;
        }
        let mut config = AppConfig::default();
        assert_eq!(get_database_url(&config), DEFAULT_DATABASE_URL);
        config.database.url = Some("sqlite::memory:".to_string());
        assert_eq!(get_database_url(&config), "sqlite::memory:");
    }
}
