//! Shared test utilities for the CRM backend.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{customer, product},
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Installs a test-friendly tracing subscriber once per process.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test customer without a phone number.
pub async fn create_test_customer(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
) -> Result<entities::customer::Model> {
    customer::create_customer(db, &customer::NewCustomer::new(name, email)).await
}

/// Creates a test product with the given price and stock.
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    price: f64,
    stock: i32,
) -> Result<entities::product::Model> {
    product::create_product(db, &product::NewProduct::new(name, price).with_stock(stock)).await
}

/// Returns a unique path in the system temp directory for a job log file.
pub fn temp_log_path(label: &str) -> std::path::PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    std::env::temp_dir().join(format!(
        "crm_{label}_{}_{nanos}.txt",
        std::process::id()
    ))
}
