//! Report job: summarises customers, orders and revenue into one log line.

use super::append_lines;
use crate::{
    api::{Operation, execute},
    core::report::{CrmReport, format_report_line},
    errors::Result,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::{error, info, instrument};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderTotal {
    total_amount: f64,
}

/// Queries customers and orders through the API and builds the report.
pub async fn collect_report(db: &DatabaseConnection) -> Result<CrmReport> {
    let customers: Vec<Value> = serde_json::from_value(execute(db, Operation::Customers).await?)?;
    let orders: Vec<OrderTotal> = serde_json::from_value(
        execute(
            db,
            Operation::Orders {
                order_date_gte: None,
            },
        )
        .await?,
    )?;

    Ok(CrmReport::from_order_totals(
        customers.len(),
        orders.into_iter().map(|o| o.total_amount),
    ))
}

/// Builds the report and appends it to the log. On failure the error is
/// logged to the file too, then returned.
#[instrument(skip(db))]
pub async fn run(db: &DatabaseConnection, log_path: &Path) -> Result<()> {
    let now = chrono::Local::now().naive_local();
    match collect_report(db).await {
        Ok(report) => {
            let line = format_report_line(now, &report);
            info!("CRM report generated: {}", line);
            append_lines(log_path, &[line]).await
        }
        Err(e) => {
            error!("Error generating CRM report: {}", e);
            let line = format!(
                "{} - Error: Error generating CRM report: {e}",
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
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::order::{NewOrder, create_order};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_collect_report() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_customer(&db, "Alice", "alice@example.com").await?;
        create_test_customer(&db, "Bob", "bob@example.com").await?;
        let p1 = create_test_product(&db, "P1", 10.0, 1).await?;
        let p2 = create_test_product(&db, "P2", 20.0, 1).await?;
        for product_ids in [vec![p1.id, p2.id], vec![p1.id]] {
            create_order(
                &db,
                &NewOrder {
                    customer_id: alice.id,
                    product_ids,
                    order_date: None,
                },
            )
            .await?;
        }

        let report = collect_report(&db).await?;
        assert_eq!(report.total_customers, 2);
        assert_eq!(report.total_orders, 2);
        assert_eq!(report.total_revenue, 40.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_run_writes_report_line() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_customer(&db, "Alice", "alice@example.com").await?;
        let path = temp_log_path("report");

        run(&db, &path).await?;

        let contents = std::fs::read_to_string(&path)?;
        std::fs::remove_file(&path).ok();
        assert!(
            contents
                .trim_end()
                .ends_with(" - Report: 1 customers, 0 orders, 0.00 revenue.")
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_run_logs_failure() -> Result<()> {
        // No tables, so the customers query fails
        let db = sea_orm::Database::connect("sqlite::memory:").await?;
        let path = temp_log_path("report_failure");

        assert!(run(&db, &path).await.is_err());

        let contents = std::fs::read_to_string(&path)?;
        std::fs::remove_file(&path).ok();
        assert!(contents.contains(" - Error: Error generating CRM report: "));

        Ok(())
    }
}
