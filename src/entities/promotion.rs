//! Promotion entity - A percentage discount code with an activation window.
//!
//! A promotion applies only while `is_active` is set and the current time lies
//! within `starts_at..=ends_at`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Promotion database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "promotions")]
pub struct Model {
    /// Unique identifier for the promotion
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Code typed at checkout, stored uppercased
    #[sea_orm(unique)]
    pub code: String,
    /// Optional text shown in banners
    pub description: Option<String>,
    /// Discount in percent, in (0, 100]
    pub discount_percent: f64,
    /// Start of the activation window
    pub starts_at: DateTimeUtc,
    /// End of the activation window
    pub ends_at: DateTimeUtc,
    /// Manual on/off switch from the back office
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Whether the promotion can be applied at `now`.
    #[must_use]
    pub fn is_applicable_at(&self, now: DateTimeUtc) -> bool {
        self.is_active && self.starts_at <= now && now <= self.ends_at
    }
}

/// Promotions stand alone
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
