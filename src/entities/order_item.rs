//! Order item entity - One purchased product line, priced at checkout time.
//!
//! The product name and prices are copied so the order reads the same after
//! the catalog changes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order line database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Order this line belongs to
    pub order_id: i64,
    /// Product bought
    pub product_id: i64,
    /// Product name at the time of purchase
    pub product_name: String,
    /// Units bought
    pub quantity: i32,
    /// Unit price actually charged (after discount)
    pub unit_price: f64,
    /// `unit_price * quantity`
    pub total_price: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
