//! Customer entity - A person or business that places orders.
//!
//! Email addresses are unique across all customers; the column carries a
//! `UNIQUE` constraint so the storage layer rejects duplicates even if the
//! service-level check is bypassed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Customer database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "customers")]
pub struct Model {
    /// Unique identifier for the customer
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name, never empty
    pub name: String,
    /// Contact email, unique across all customers
    #[sea_orm(unique)]
    pub email: String,
    /// Optional phone in `+<digits>` or `###-###-####` form
    pub phone: Option<String>,
    /// When the customer was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Customer and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One customer has many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
