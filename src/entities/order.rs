//! Order entity - A purchase by one customer of one or more products.
//!
//! `total_amount` is a snapshot written once at creation from the prices of
//! the attached products. It is a stored column, never recomputed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the customer who placed the order
    pub customer_id: i64,
    /// When the order was placed (defaults to creation time)
    pub order_date: DateTimeUtc,
    /// Sum of product prices at creation time
    pub total_amount: f64,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order belongs to one customer
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    /// Join rows linking this order to products
    #[sea_orm(has_many = "super::order_product::Entity")]
    OrderProducts,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::order_product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderProducts.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        super::order_product::Relation::Product.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::order_product::Relation::Order.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
