//! Customer business logic - Creation, bulk creation and lookups.
//!
//! Every customer passes the same validation chain before any write: phone
//! shape first, then a non-empty name, then a plausible email. Email
//! uniqueness is checked explicitly before the insert, and a unique-constraint
//! violation from the database is mapped to the same conflict error in case
//! another writer slips in between.

use crate::{
    entities::{Customer, customer},
    errors::{Error, Result},
};
use regex::Regex;
use sea_orm::{QueryOrder, Set, SqlErr, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, info, instrument, warn};

#[allow(clippy::expect_used)]
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+\d{1,15}|\d{3}-\d{3}-\d{4})$").expect("phone pattern is a valid literal")
});

#[allow(clippy::expect_used)]
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is a valid literal")
});

/// Input for creating a customer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewCustomer {
    /// Display name
    pub name: String,
    /// Contact email, must not belong to an existing customer
    pub email: String,
    /// Optional phone number
    #[serde(default)]
    pub phone: Option<String>,
}

impl NewCustomer {
    /// Builds an input without a phone number.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
        }
    }

    /// Sets the phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Result of a bulk creation: what was stored and what was rejected.
#[derive(Debug, Clone, Default)]
pub struct BulkCreateOutcome {
    /// Customers created, in input order
    pub customers: Vec<customer::Model>,
    /// One entry per rejected input, naming its email
    pub errors: Vec<String>,
}

/// Checks a phone number against the accepted shapes: `+` followed by 1-15
/// digits, or `###-###-####`.
pub fn validate_phone(phone: &str) -> Result<()> {
    if PHONE_PATTERN.is_match(phone) {
        Ok(())
    } else {
        Err(Error::validation(
            "Invalid phone format. Use +1234567890 or 123-456-7890",
        ))
    }
}

/// Runs every field-level check for a customer input, phone first.
pub fn validate_customer_input(input: &NewCustomer) -> Result<()> {
    if let Some(phone) = input.phone.as_deref() {
        validate_phone(phone)?;
    }

    if input.name.trim().is_empty() {
        return Err(Error::validation("Name cannot be empty"));
    }

    if !EMAIL_PATTERN.is_match(input.email.trim()) {
        return Err(Error::validation("Enter a valid email address"));
    }

    Ok(())
}

/// Creates a new customer after validating the input.
///
/// Works on a plain connection or inside an open transaction, which is how
/// [`bulk_create_customers`] reuses it.
///
/// # Errors
/// Returns an error if:
/// - The phone, name or email fails validation (`ValidationFailed`)
/// - A customer with the same email already exists (`Conflict`)
/// - The database insert fails
#[instrument(skip(db, input), fields(email = %input.email))]
pub async fn create_customer<C>(db: &C, input: &NewCustomer) -> Result<customer::Model>
where
    C: ConnectionTrait,
{
    validate_customer_input(input)?;

    let email = input.email.trim().to_string();
    if get_customer_by_email(db, &email).await?.is_some() {
        debug!("Rejecting duplicate email");
        return Err(Error::conflict("Email already exists"));
    }

    let customer = customer::ActiveModel {
        name: Set(input.name.trim().to_string()),
        email: Set(email),
        phone: Set(input.phone.clone()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let created = customer.insert(db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Error::conflict("Email already exists"),
        _ => Error::from(e),
    })?;

    info!("Created customer {} (ID: {})", created.name, created.id);
    Ok(created)
}

/// Creates many customers in one database transaction, best-effort.
///
/// Each input is validated and inserted on its own. A rejected input is
/// recorded as `"Failed to create customer <email>: <reason>"` and the batch
/// carries on; the successful subset is committed together. Only a failure of
/// the transaction itself (begin or commit) aborts the whole call.
#[instrument(skip(db, inputs), fields(count = inputs.len()))]
pub async fn bulk_create_customers(
    db: &DatabaseConnection,
    inputs: &[NewCustomer],
) -> Result<BulkCreateOutcome> {
    let txn = db.begin().await?;
    let mut outcome = BulkCreateOutcome::default();

    for input in inputs {
        match create_customer(&txn, input).await {
            Ok(customer) => outcome.customers.push(customer),
            Err(e) => {
                warn!("Bulk create rejected {}: {}", input.email, e);
                outcome
                    .errors
                    .push(format!("Failed to create customer {}: {e}", input.email));
            }
        }
    }

    txn.commit().await?;

    info!(
        "Bulk create finished: {} created, {} rejected",
        outcome.customers.len(),
        outcome.errors.len()
    );
    Ok(outcome)
}

/// Retrieves all customers ordered by ID.
pub async fn get_all_customers<C>(db: &C) -> Result<Vec<customer::Model>>
where
    C: ConnectionTrait,
{
    Customer::find()
        .order_by_asc(customer::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific customer by its unique ID.
pub async fn get_customer_by_id<C>(db: &C, customer_id: i64) -> Result<Option<customer::Model>>
where
    C: ConnectionTrait,
{
    Customer::find_by_id(customer_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a customer by exact email.
pub async fn get_customer_by_email<C>(db: &C, email: &str) -> Result<Option<customer::Model>>
where
    C: ConnectionTrait,
{
    Customer::find()
        .filter(customer::Column::Email.eq(email))
        .one(db)
        .await
        .map_err(Into::into)
}
