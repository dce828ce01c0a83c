//! Join table for the many-to-many relation between orders and products.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order/product link
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_products")]
pub struct Model {
    /// Order side of the link
    #[sea_orm(primary_key, auto_increment = false)]
    pub order_id: i64,
    /// Product side of the link
    #[sea_orm(primary_key, auto_increment = false)]
    pub product_id: i64,
}

/// Defines relationships between the link and the two sides it joins
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Link belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,
    /// Link belongs to one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
