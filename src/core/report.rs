//! Report generation business logic.
//!
//! Builds the periodic CRM summary (customer count, order count, revenue) and
//! formats it as a single log line. Revenue is the sum of the stored order
//! totals, so it reflects prices at the time each order was placed.

use chrono::NaiveDateTime;
use serde::Serialize;

/// Represents a CRM summary report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmReport {
    /// Number of customers
    pub total_customers: usize,
    /// Number of orders
    pub total_orders: usize,
    /// Sum of order totals
    pub total_revenue: f64,
}

impl CrmReport {
    /// Builds a report from a customer count and the totals of every order.
    pub fn from_order_totals<I>(total_customers: usize, order_totals: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut total_orders = 0;
        let mut total_revenue = 0.0;
        for amount in order_totals {
            total_orders += 1;
            total_revenue += amount;
        }
        Self {
            total_customers,
            total_orders,
            total_revenue,
        }
    }
}

/// Formats a report as the log line
/// `YYYY-MM-DD HH:MM:SS - Report: N customers, M orders, R revenue.`
#[must_use]
pub fn format_report_line(timestamp: NaiveDateTime, report: &CrmReport) -> String {
    format!(
        "{} - Report: {} customers, {} orders, {:.2} revenue.",
        timestamp.format("%Y-%m-%d %H:%M:%S"),
        report.total_customers,
        report.total_orders,
        report.total_revenue
    )
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use chrono::NaiveDate;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 14)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_from_order_totals() {
        let report = CrmReport::from_order_totals(3, [30.0, 12.5]);
        assert_eq!(report.total_customers, 3);
        assert_eq!(report.total_orders, 2);
        assert_eq!(report.total_revenue, 42.5);
    }

    #[test]
    fn test_from_order_totals_no_orders() {
        let report = CrmReport::from_order_totals(0, []);
        assert_eq!(report.total_orders, 0);
        assert_eq!(report.total_revenue, 0.0);
    }

    #[test]
    fn test_format_report_line() {
        let report = CrmReport::from_order_totals(2, [999.99, 699.99]);
        assert_eq!(
            format_report_line(timestamp(), &report),
            "2025-07-14 06:00:00 - Report: 2 customers, 2 orders, 1699.98 revenue."
        );
    }
}
