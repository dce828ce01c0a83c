//! Product entity - An item that can be ordered.
//!
//! Stock is only ever raised by the replenishment job; orders do not consume it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the product (e.g., "Laptop"); not unique
    pub name: String,
    /// Unit price, strictly positive
    pub price: f64,
    /// Units on hand, never negative
    pub stock: i32,
    /// When the product was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Join rows linking this product to orders
    #[sea_orm(has_many = "super::order_product::Entity")]
    OrderProducts,
}

impl Related<super::order_product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderProducts.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        super::order_product::Relation::Order.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::order_product::Relation::Product.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
