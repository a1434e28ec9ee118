//! Product entity - A wig (or accessory) offered in the catalog.
//!
//! Products are soft-deleted so that order history keeps pointing at a row.
//! Images live in their own table and are ordered by `position`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Body Wave Lace Front 20\"")
    pub name: String,
    /// Optional long-form description shown on the detail page
    pub description: Option<String>,
    /// Unit price in the store currency
    pub price: f64,
    /// Catalog category used for filtering (e.g., "lace-front", "bob")
    pub category: String,
    /// Stock flag - out-of-stock products stay visible but cannot be added to a cart
    pub in_stock: bool,
    /// Average customer rating between 0 and 5
    pub rating: f64,
    /// Soft delete flag - if true, product is hidden but order history is preserved
    pub is_deleted: bool,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One product has many images
    #[sea_orm(has_many = "super::product_image::Entity")]
    Images,
    /// One product appears in many cart lines
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItems,
    /// One product is favorited by many users
    #[sea_orm(has_many = "super::favorite::Entity")]
    Favorites,
}

impl Related<super::product_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl Related<super::favorite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favorites.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
