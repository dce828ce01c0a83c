//! Order reminder job: lists orders placed during the last week.

use super::append_lines;
use crate::{
    api::{Operation, execute},
    errors::Result,
};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::path::Path;
use tracing::{error, info, instrument};

/// How far back an order counts as pending
pub const REMINDER_WINDOW_DAYS: i64 = 7;

/// The fields of an order the reminder needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingOrder {
    /// Order ID
    pub id: i64,
    /// When the order was placed
    pub order_date: DateTime<Utc>,
    /// Who placed it
    pub customer: PendingOrderCustomer,
}

/// Customer contact for a pending order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PendingOrderCustomer {
    /// Where the reminder goes
    pub email: String,
}

/// Queries orders placed within [`REMINDER_WINDOW_DAYS`] of `now`.
pub async fn find_pending_orders(
    db: &DatabaseConnection,
    now: DateTime<Utc>,
) -> Result<Vec<PendingOrder>> {
    let since = now - Duration::days(REMINDER_WINDOW_DAYS);
    let value = execute(
        db,
        Operation::Orders {
            order_date_gte: Some(since),
        },
    )
    .await?;
    Ok(serde_json::from_value(value)?)
}

/// Formats the header line and one line per pending order.
#[must_use]
pub fn format_reminder_lines(timestamp: NaiveDateTime, orders: &[PendingOrder]) -> Vec<String> {
    let ts = timestamp.format("%Y-%m-%d %H:%M:%S");
    let mut lines = Vec::with_capacity(orders.len() + 1);
    lines.push(format!(
        "[{ts}] Processing {} pending orders from last {REMINDER_WINDOW_DAYS} days",
        orders.len()
    ));
    lines.extend(orders.iter().map(|order| {
        format!(
            "[{ts}] Order ID: {}, Customer Email: {}, Order Date: {}",
            order.id,
            order.customer.email,
            order.order_date.to_rfc3339()
        )
    }));
    lines
}

/// Finds recent orders and appends a reminder entry for each.
#[instrument(skip(db))]
pub async fn run(db: &DatabaseConnection, log_path: &Path) -> Result<()> {
    let now = chrono::Local::now().naive_local();
    match find_pending_orders(db, Utc::now()).await {
        Ok(orders) => {
            info!("Order reminders processed for {} orders", orders.len());
            append_lines(log_path, &format_reminder_lines(now, &orders)).await
        }
        Err(e) => {
            error!("Error processing order reminders: {}", e);
            let line = format!(
                "[{}] Error processing order reminders: {e}",
                now.format("%Y-%m-%d %H:%M:%S")
            );
            append_lines(log_path, &[line]).await?;
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::order::{NewOrder, create_order};
    use crate::test_utils::*;
    use chrono::{NaiveDate, TimeZone};

    #[tokio::test]
    async fn test_find_pending_orders_uses_window() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_customer(&db, "Alice", "alice@example.com").await?;
        let product = create_test_product(&db, "P1", 10.0, 1).await?;
        let now = Utc::now();

        for days_ago in [2, 10] {
            create_order(
                &db,
                &NewOrder {
                    customer_id: alice.id,
                    product_ids: vec![product.id],
                    order_date: Some(now - Duration::days(days_ago)),
                },
            )
            .await?;
        }

        let pending = find_pending_orders(&db, now).await?;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].customer.email, "alice@example.com");

        Ok(())
    }

    #[test]
    fn test_format_reminder_lines() {
        let timestamp = NaiveDate::from_ymd_opt(2025, 2, 3)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let orders = vec![PendingOrder {
            id: 7,
            order_date: Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap(),
            customer: PendingOrderCustomer {
                email: "bob@example.com".to_string(),
            },
        }];

        assert_eq!(
            format_reminder_lines(timestamp, &orders),
            vec![
                "[2025-02-03 09:30:00] Processing 1 pending orders from last 7 days".to_string(),
                concat!(
                    "[2025-02-03 09:30:00] Order ID: 7, Customer Email: bob@example.com, ",
                    "Order Date: 2025-02-01T08:00:00+00:00"
                )
                .to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_run_with_no_orders() -> Result<()> {
        let db = setup_test_db().await?;
        let path = temp_log_path("reminders");

        run(&db, &path).await?;

        let contents = std::fs::read_to_string(&path)?;
        std::fs::remove_file(&path).ok();
        assert!(
            contents
                .trim_end()
                .ends_with("Processing 0 pending orders from last 7 days")
        );

        Ok(())
    }
}
