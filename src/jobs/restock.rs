//! Low-stock job: runs the replenishment mutation and records what changed.

use super::append_lines;
use crate::{
    api::{Operation, UpdateLowStockPayload, execute},
    errors::Result,
};
use chrono::NaiveDateTime;
use sea_orm::DatabaseConnection;
use std::path::Path;
use tracing::{info, instrument, warn};

/// Formats the log lines for one replenishment run: one line per restocked
/// product, then the summary (or the error when the run failed).
#[must_use]
pub fn format_restock_lines(
    timestamp: NaiveDateTime,
    payload: &UpdateLowStockPayload,
) -> Vec<String> {
    let ts = timestamp.format("%Y-%m-%d %H:%M:%S");
    if !payload.success {
        return vec![format!("{ts} - Error: {}", payload.message)];
    }

    let mut lines: Vec<String> = payload
        .updated_products
        .iter()
        .map(|p| {
            format!(
                "{ts} - Restocked {}: {} -> {}",
                p.name, p.old_stock, p.new_stock
            )
        })
        .collect();
    lines.push(format!("{ts} - {}", payload.message));
    lines
}

/// Runs `updateLowStockProducts` and appends the outcome to the log.
#[instrument(skip(db))]
pub async fn run(db: &DatabaseConnection, log_path: &Path) -> Result<()> {
    let value = execute(db, Operation::UpdateLowStockProducts).await?;
    let payload: UpdateLowStockPayload = serde_json::from_value(value)?;

    if payload.success {
        info!("Low-stock run restocked {} products", payload.count);
    } else {
        warn!("Low-stock run failed: {}", payload.message);
    }

    let lines = format_restock_lines(chrono::Local::now().naive_local(), &payload);
    append_lines(log_path, &lines).await
}
