//! Core business logic - framework-agnostic customer, product, order and
//! inventory operations.
//!
//! Everything here talks to the database through `SeaORM` and returns
//! [`crate::errors::Result`]; nothing knows about HTTP or scheduling.

/// Customer validation, creation and lookups
pub mod customer;
/// Low-stock replenishment
pub mod inventory;
/// Order creation with snapshot totals, and order listings
pub mod order;
/// Product validation, creation and lookups
pub mod product;
/// CRM summary report
pub mod report;
/// Demo data for empty databases
pub mod seed;
