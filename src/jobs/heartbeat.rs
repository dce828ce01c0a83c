//! Heartbeat job: proves the process and its API are alive.

use super::append_lines;
use crate::{
    api::{Operation, execute},
    errors::Result,
};
use chrono::NaiveDateTime;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::path::Path;
use tracing::instrument;

/// Formats the heartbeat line `DD/MM/YYYY-HH:MM:SS CRM is alive`, followed by
/// the outcome of the `hello` probe.
#[must_use]
pub fn format_heartbeat_line(timestamp: NaiveDateTime, probe: &Result<Value>) -> String {
    let status = match probe {
        Ok(Value::String(_)) => " - GraphQL endpoint responsive".to_string(),
        Ok(_) => " - GraphQL endpoint available but hello field not found".to_string(),
        Err(e) => format!(" - GraphQL endpoint unavailable: {e}"),
    };
    format!(
        "{} CRM is alive{status}",
        timestamp.format("%d/%m/%Y-%H:%M:%S")
    )
}

/// Probes `hello` and appends one heartbeat line.
#[instrument(skip(db))]
pub async fn run(db: &DatabaseConnection, log_path: &Path) -> Result<()> {
    let probe = execute(db, Operation::Hello).await;
    let line = format_heartbeat_line(chrono::Local::now().naive_local(), &probe);
    append_lines(log_path, &[line]).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::Error;
    use crate::test_utils::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
    }

    #[test]
    fn test_format_heartbeat_line_responsive() {
        assert_eq!(
            format_heartbeat_line(timestamp(), &Ok(json!("Hello, GraphQL!"))),
            "02/01/2025-03:04:05 CRM is alive - GraphQL endpoint responsive"
        );
    }

    #[test]
    fn test_format_heartbeat_line_unexpected_shape() {
        assert_eq!(
            format_heartbeat_line(timestamp(), &Ok(json!(null))),
            concat!(
                "02/01/2025-03:04:05 CRM is alive - ",
                "GraphQL endpoint available but hello field not found"
            )
        );
    }

    #[test]
    fn test_format_heartbeat_line_unavailable() {
        let line = format_heartbeat_line(timestamp(), &Err(Error::validation("boom")));
        assert_eq!(
            line,
            "02/01/2025-03:04:05 CRM is alive - GraphQL endpoint unavailable: boom"
        );
    }

    #[tokio::test]
    async fn test_run_appends_line() -> Result<()> {
        let db = setup_test_db().await?;
        let path = temp_log_path("heartbeat");

        run(&db, &path).await?;
        run(&db, &path).await?;

        let contents = std::fs::read_to_string(&path)?;
        std::fs::remove_file(&path).ok();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("CRM is alive - GraphQL endpoint responsive"));

        Ok(())
    }
}
