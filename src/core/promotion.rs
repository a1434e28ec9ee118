//! Promotion business logic - Percentage discount codes with an activation window.
//!
//! Codes are stored uppercased so shoppers can type them in any case. A promotion
//! applies only while it is switched on and the current time is inside its window.

use crate::{
    core::pricing::AppliedPromotion,
    entities::{Promotion, promotion},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Fields accepted when creating a promotion
#[derive(Debug, Clone, Deserialize)]
pub struct NewPromotion {
    pub code: String,
    pub description: Option<String>,
    pub discount_percent: f64,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub is_active: bool,
}

/// Partial update; `None` leaves the field unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromotionUpdate {
    pub description: Option<String>,
    pub discount_percent: Option<f64>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

fn validate_discount(percent: f64) -> Result<()> {
    if !percent.is_finite() || percent <= 0.0 || percent > 100.0 {
        return Err(Error::validation(
            "discount_percent",
            "Discount must be greater than 0 and at most 100",
        ));
    }
    Ok(())
}

fn validate_window(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Result<()> {
    if ends_at <= starts_at {
        return Err(Error::validation("ends_at", "End must be after start"));
    }
    Ok(())
}

async fn get_by_code(db: &DatabaseConnection, code: &str) -> Result<Option<promotion::Model>> {
    Promotion::find()
        .filter(promotion::Column::Code.eq(normalize_code(code)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists all promotions, newest window first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_promotions(db: &DatabaseConnection) -> Result<Vec<promotion::Model>> {
    Promotion::find()
        .order_by_desc(promotion::Column::StartsAt)
        .order_by_asc(promotion::Column::Code)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a promotion by ID.
///
/// # Errors
/// Returns `Error::PromotionNotFound` if it does not exist.
pub async fn get_promotion(db: &DatabaseConnection, promotion_id: i64) -> Result<promotion::Model> {
    Promotion::find_by_id(promotion_id)
        .one(db)
        .await?
        .ok_or(Error::PromotionNotFound { id: promotion_id })
}

/// Creates a promotion after validating its code, discount and window.
///
/// # Errors
/// Returns an error if the code is blank or taken, the discount is outside
/// (0, 100], the window is empty, or the insert fails.
#[instrument(skip(db))]
pub async fn create_promotion(db: &DatabaseConnection, new: NewPromotion) -> Result<promotion::Model> {
    let code = normalize_code(&new.code);
    if code.is_empty() {
        return Err(Error::validation("code", "Promotion code cannot be empty"));
    }
    validate_discount(new.discount_percent)?;
    validate_window(new.starts_at, new.ends_at)?;
    if get_by_code(db, &code).await?.is_some() {
        return Err(Error::PromotionCodeTaken { code });
    }

    let now = Utc::now();
    let promotion = promotion::ActiveModel {
        code: Set(code),
        description: Set(new.description.filter(|d| !d.trim().is_empty())),
        discount_percent: Set(new.discount_percent),
        starts_at: Set(new.starts_at),
        ends_at: Set(new.ends_at),
        is_active: Set(new.is_active),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Created promotion {} ({}%)", promotion.code, promotion.discount_percent);
    Ok(promotion)
}

/// Applies a partial update, re-validating the resulting window.
///
/// # Errors
/// Returns an error if the promotion does not exist, a field fails validation,
/// or the update fails.
#[instrument(skip(db))]
pub async fn update_promotion(
    db: &DatabaseConnection,
    promotion_id: i64,
    changes: PromotionUpdate,
) -> Result<promotion::Model> {
    let current = get_promotion(db, promotion_id).await?;
    if let Some(percent) = changes.discount_percent {
        validate_discount(percent)?;
    }
    let starts_at = changes.starts_at.unwrap_or(current.starts_at);
    let ends_at = changes.ends_at.unwrap_or(current.ends_at);
    validate_window(starts_at, ends_at)?;

    let mut promotion: promotion::ActiveModel = current.into();
    if let Some(description) = changes.description {
        promotion.description = Set(Some(description).filter(|d| !d.trim().is_empty()));
    }
    if let Some(percent) = changes.discount_percent {
        promotion.discount_percent = Set(percent);
    }
    promotion.starts_at = Set(starts_at);
    promotion.ends_at = Set(ends_at);
    promotion.updated_at = Set(Utc::now());
    promotion.update(db).await.map_err(Into::into)
}

/// Switches a promotion on or off.
///
/// # Errors
/// Returns `Error::PromotionNotFound` if it does not exist.
#[instrument(skip(db))]
pub async fn set_active(
    db: &DatabaseConnection,
    promotion_id: i64,
    is_active: bool,
) -> Result<promotion::Model> {
    let mut promotion: promotion::ActiveModel = get_promotion(db, promotion_id).await?.into();
    promotion.is_active = Set(is_active);
    promotion.updated_at = Set(Utc::now());
    promotion.update(db).await.map_err(Into::into)
}

/// Deletes a promotion. Orders keep the code they were placed with.
///
/// # Errors
/// Returns `Error::PromotionNotFound` if it does not exist.
pub async fn delete_promotion(db: &DatabaseConnection, promotion_id: i64) -> Result<()> {
    get_promotion(db, promotion_id).await?.delete(db).await?;
    Ok(())
}

/// Looks up a code that can be applied at `now`.
///
/// # Errors
/// Returns `Error::PromotionNotApplicable` for unknown codes, switched-off
/// promotions, and promotions outside their window.
pub async fn find_applicable(
    db: &DatabaseConnection,
    code: &str,
    now: DateTime<Utc>,
) -> Result<AppliedPromotion> {
    let promotion = get_by_code(db, code)
        .await?
        .filter(|p| p.is_applicable_at(now))
        .ok_or_else(|| Error::PromotionNotApplicable {
            code: normalize_code(code),
        })?;
    Ok(AppliedPromotion {
        code: promotion.code,
        discount_percent: promotion.discount_percent,
    })
}
