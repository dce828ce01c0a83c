//! API boundary - named queries and mutations over the core layer.
//!
//! Every operation is a variant of [`Operation`] and has its own handler. All
//! handlers share one contract: they take the database and the operation's
//! input and return a JSON value or an [`Error`] whose kind tells the caller
//! what went wrong. The HTTP transport lives in [`server`]; scheduled jobs
//! call [`execute`] in-process.

/// HTTP transport for the API
pub mod server;

use crate::{
    core::{customer, inventory, order, product},
    entities::{customer as customer_entity, product as product_entity},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

/// Greeting returned by the `hello` query
pub const HELLO_GREETING: &str = "Hello, GraphQL!";

/// A named query or mutation together with its input.
///
/// On the wire this is `{"operation": "<name>", ...fields}`, for example
/// `{"operation": "createCustomer", "input": {"name": "A", "email": "a@x.io"}}`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(
    tag = "operation",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Operation {
    /// Liveness probe query
    Hello,
    /// List every customer
    Customers,
    /// List every product
    Products,
    /// List orders, optionally only recent ones
    Orders {
        /// Only orders placed at or after this instant
        #[serde(default)]
        order_date_gte: Option<DateTime<Utc>>,
    },
    /// Create one customer
    CreateCustomer {
        /// Customer fields
        input: customer::NewCustomer,
    },
    /// Create many customers, best-effort
    BulkCreateCustomers {
        /// Customer fields, one entry per customer
        inputs: Vec<customer::NewCustomer>,
    },
    /// Create one product
    CreateProduct {
        /// Product fields
        input: product::NewProduct,
    },
    /// Create one order
    CreateOrder {
        /// Order fields
        input: order::NewOrder,
    },
    /// Restock every product below the low-stock threshold
    UpdateLowStockProducts,
}

impl Operation {
    /// The operation's wire name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Hello => "hello",
            Self::Customers => "customers",
            Self::Products => "products",
            Self::Orders { .. } => "orders",
            Self::CreateCustomer { .. } => "createCustomer",
            Self::BulkCreateCustomers { .. } => "bulkCreateCustomers",
            Self::CreateProduct { .. } => "createProduct",
            Self::CreateOrder { .. } => "createOrder",
            Self::UpdateLowStockProducts => "updateLowStockProducts",
        }
    }
}

/// Result of `createCustomer`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CreateCustomerPayload {
    /// The stored customer
    pub customer: customer_entity::Model,
    /// Confirmation text
    pub message: String,
}

/// Result of `bulkCreateCustomers`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BulkCreateCustomersPayload {
    /// Customers created, in input order
    pub customers: Vec<customer_entity::Model>,
    /// One message per rejected input
    pub errors: Vec<String>,
}

/// Result of `createProduct`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CreateProductPayload {
    /// The stored product
    pub product: product_entity::Model,
}

/// Result of `createOrder`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CreateOrderPayload {
    /// The stored order with its customer and products
    pub order: order::OrderView,
}

/// Result of `updateLowStockProducts`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLowStockPayload {
    /// False only when the run itself failed
    pub success: bool,
    /// Summary, or the error text when `success` is false
    pub message: String,
    /// Number of products restocked
    pub count: usize,
    /// What changed, per product
    pub updated_products: Vec<inventory::RestockedProduct>,
}

/// Handles `createCustomer`.
pub async fn create_customer(
    db: &DatabaseConnection,
    input: &customer::NewCustomer,
) -> Result<CreateCustomerPayload> {
    let customer = customer::create_customer(db, input).await?;
    Ok(CreateCustomerPayload {
        customer,
        message: "Customer created successfully".to_string(),
    })
}

/// Handles `bulkCreateCustomers`. Per-item failures are data, not errors.
pub async fn bulk_create_customers(
    db: &DatabaseConnection,
    inputs: &[customer::NewCustomer],
) -> Result<BulkCreateCustomersPayload> {
    let outcome = customer::bulk_create_customers(db, inputs).await?;
    Ok(BulkCreateCustomersPayload {
        customers: outcome.customers,
        errors: outcome.errors,
    })
}

/// Handles `createProduct`.
pub async fn create_product(
    db: &DatabaseConnection,
    input: &product::NewProduct,
) -> Result<CreateProductPayload> {
    let product = product::create_product(db, input).await?;
    Ok(CreateProductPayload { product })
}

/// Handles `createOrder`.
pub async fn create_order(
    db: &DatabaseConnection,
    input: &order::NewOrder,
) -> Result<CreateOrderPayload> {
    let order = order::create_order(db, input).await?;
    Ok(CreateOrderPayload { order })
}

/// Handles `updateLowStockProducts`.
///
/// Never fails: an error during the run is reported as `success: false` with
/// the error text as the message.
pub async fn update_low_stock_products(db: &DatabaseConnection) -> UpdateLowStockPayload {
    match inventory::update_low_stock_products(db).await {
        Ok(updated_products) => UpdateLowStockPayload {
            success: true,
            message: inventory::format_restock_summary(&updated_products),
            count: updated_products.len(),
            updated_products,
        },
        Err(e) => {
            error!("Low-stock update failed: {}", e);
            UpdateLowStockPayload {
                success: false,
                message: format!("Error updating low-stock products: {e}"),
                count: 0,
                updated_products: Vec::new(),
            }
        }
    }
}

/// Runs an operation and returns its result as JSON.
///
/// # Errors
/// Returns the handler's error for validation, not-found and conflict
/// failures, and for storage failures in every operation except
/// `updateLowStockProducts`.
pub async fn execute(db: &DatabaseConnection, operation: Operation) -> Result<Value> {
    debug!("Executing operation {}", operation.name());
    let value = match operation {
        Operation::Hello => Value::String(HELLO_GREETING.to_string()),
        Operation::Customers => serde_json::to_value(customer::get_all_customers(db).await?)?,
        Operation::Products => serde_json::to_value(product::get_all_products(db).await?)?,
        Operation::Orders { order_date_gte } => {
            serde_json::to_value(order::get_all_orders(db, order_date_gte).await?)?
        }
        Operation::CreateCustomer { input } => {
            serde_json::to_value(create_customer(db, &input).await?)?
        }
        Operation::BulkCreateCustomers { inputs } => {
            serde_json::to_value(bulk_create_customers(db, &inputs).await?)?
        }
        Operation::CreateProduct { input } => {
            serde_json::to_value(create_product(db, &input).await?)?
        }
        Operation::CreateOrder { input } => serde_json::to_value(create_order(db, &input).await?)?,
        Operation::UpdateLowStockProducts => {
            serde_json::to_value(update_low_stock_products(db).await)?
        }
    };
    Ok(value)
}

/// Parses a JSON request body into an [`Operation`].
pub fn parse_operation(body: &str) -> Result<Operation> {
    serde_json::from_str(body).map_err(|e| Error::validation(format!("Invalid request: {e}")))
}
