//! Checkout session entity - A payment session opened at the processor.
//!
//! The row keeps everything needed to write the order once the processor
//! confirms payment: the delivery details and the priced lines, serialized as
//! JSON text, plus the totals that were sent to the processor.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle of a checkout session
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStatus {
    /// Waiting for the customer to pay
    #[sea_orm(string_value = "open")]
    Open,
    /// Reconciled into an order
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// Checkout session database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "checkout_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identifier assigned by the payment processor
    #[sea_orm(unique)]
    pub session_id: String,
    /// Profile that started checkout
    pub user_id: i64,
    pub status: CheckoutStatus,
    /// Serialized `DeliveryInfo`
    #[sea_orm(column_type = "Text")]
    pub delivery_json: String,
    /// Serialized `Vec<QuoteLine>`
    #[sea_orm(column_type = "Text")]
    pub lines_json: String,
    pub promotion_code: Option<String>,
    pub subtotal: f64,
    pub discount: f64,
    pub delivery_fee: f64,
    pub total: f64,
    /// Order written by reconciliation
    pub order_id: Option<i64>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
