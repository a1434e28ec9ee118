//! Order entity - A paid (or being-paid) purchase with its shipping details.
//!
//! Orders are written by payment reconciliation and afterwards only move
//! forward through [`OrderStatus`] by hand from the back office.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fulfilment state of an order
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Received, not yet being prepared
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Being prepared or shipped
    #[sea_orm(string_value = "processing")]
    Processing,
    /// Delivered and closed
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl OrderStatus {
    /// Lowercase name as stored and serialized
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
        }
    }

    const fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Processing => 1,
            Self::Completed => 2,
        }
    }

    /// Whether the back office may move an order from `self` to `next`.
    ///
    /// Orders only move forward; re-applying the current status is allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        next.rank() >= self.rank()
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the payment processor has confirmed payment
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
    #[sea_orm(string_value = "paid")]
    Paid,
}

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Profile that placed the order
    pub user_id: i64,
    /// Fulfilment state
    pub status: OrderStatus,
    /// Payment state as reported by the processor
    pub payment_status: PaymentStatus,
    /// Processor session this order was reconciled from
    #[sea_orm(unique)]
    pub payment_session_id: String,
    pub shipping_name: String,
    pub shipping_email: String,
    pub shipping_phone: String,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_postal_code: String,
    /// Promotion code applied at checkout, if any
    pub promotion_code: Option<String>,
    /// Sum of line totals after discount
    pub subtotal: f64,
    /// Amount taken off by the promotion
    pub discount: f64,
    /// Delivery fee charged
    pub delivery_fee: f64,
    /// Amount charged: subtotal plus delivery fee
    pub total: f64,
    /// When the order was written
    pub created_at: DateTimeUtc,
    /// When the order was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One order has many items
    #[sea_orm(has_many = "super::order_item::Entity")]
    Items,
    /// Each order belongs to one profile
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::UserId",
        to = "super::profile::Column::Id"
    )]
    Profile,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
