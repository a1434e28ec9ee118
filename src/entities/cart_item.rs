//! Cart item entity - The remote mirror of a signed-in user's cart.
//!
//! Exactly one row exists per (user, product); quantity changes update that row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cart line database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cart_items")]
pub struct Model {
    /// Unique identifier for the cart line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the cart
    pub user_id: i64,
    /// Product in the cart
    pub product_id: i64,
    /// Number of units, always at least 1
    pub quantity: i32,
    /// When the product was first put in the cart
    pub added_at: DateTimeUtc,
}

/// Defines relationships between `CartItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each cart line refers to one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    /// Each cart line belongs to one profile
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::UserId",
        to = "super::profile::Column::Id"
    )]
    Profile,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
