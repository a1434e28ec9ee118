//! Profile business logic - Registration, login, contact details, and customer views.
//!
//! Passwords are hashed with bcrypt; the work factor is passed in by the caller so
//! tests can use a cheap one. Emails are trimmed and lowercased before they are
//! stored or compared.

use crate::{
    entities::{Order, PaymentStatus, Profile, Role, order, profile},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

const MIN_PASSWORD_LEN: usize = 8;

/// Registration form
#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomer {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Contact and address fields a shopper can edit; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
}

/// Back-office view of one customer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerSummary {
    pub profile: profile::Model,
    pub order_count: u64,
    /// Sum of totals over paid orders
    pub total_spent: f64,
}

/// Trims and lowercases an email.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Minimal shape check: something before `@`, and a `.` inside the domain part.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !email.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

/// Looks up a profile by email, case-insensitively.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_profile_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<profile::Model>> {
    Profile::find()
        .filter(profile::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a profile by ID.
///
/// # Errors
/// Returns `Error::ProfileNotFound` if it does not exist.
pub async fn get_profile(db: &DatabaseConnection, profile_id: i64) -> Result<profile::Model> {
    Profile::find_by_id(profile_id)
        .one(db)
        .await?
        .ok_or(Error::ProfileNotFound { id: profile_id })
}

async fn insert_profile(
    db: &DatabaseConnection,
    email: String,
    password: &str,
    full_name: String,
    role: Role,
    hash_cost: u32,
) -> Result<profile::Model> {
    let password_hash = bcrypt::hash(password, hash_cost)?;
    let now = chrono::Utc::now();
    profile::ActiveModel {
        email: Set(email),
        password_hash: Set(password_hash),
        full_name: Set(full_name),
        phone: Set(None),
        address: Set(None),
        city: Set(None),
        postal_code: Set(None),
        role: Set(role),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Registers a new customer account.
///
/// # Errors
/// Returns an error if:
/// - The email is malformed or already registered
/// - The password is shorter than 8 characters
/// - The full name is blank
/// - Hashing or the database insert fails
#[instrument(skip(db, new), fields(email = %new.email))]
pub async fn register_customer(
    db: &DatabaseConnection,
    new: NewCustomer,
    hash_cost: u32,
) -> Result<profile::Model> {
    let email = normalize_email(&new.email);
    if !is_valid_email(&email) {
        return Err(Error::validation("email", "Enter a valid email address"));
    }
    if new.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    if new.full_name.trim().is_empty() {
        return Err(Error::validation("full_name", "Full name cannot be empty"));
    }
    if get_profile_by_email(db, &email).await?.is_some() {
        return Err(Error::EmailTaken { email });
    }

    let profile = insert_profile(
        db,
        email,
        &new.password,
        new.full_name.trim().to_string(),
        Role::Customer,
        hash_cost,
    )
    .await?;
    info!("Registered customer {}", profile.id);
    Ok(profile)
}

/// Checks an email/password pair.
///
/// Unknown emails and wrong passwords produce the same error.
///
/// # Errors
/// Returns `Error::InvalidCredentials` when the pair does not match.
#[instrument(skip(db, password))]
pub async fn authenticate(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<profile::Model> {
    let Some(profile) = get_profile_by_email(db, email).await? else {
        return Err(Error::InvalidCredentials);
    };
    if !bcrypt::verify(password, &profile.password_hash)? {
        warn!("Failed login for profile {}", profile.id);
        return Err(Error::InvalidCredentials);
    }
    Ok(profile)
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Updates contact and address fields. Blank strings clear optional fields.
///
/// # Errors
/// Returns an error if the profile does not exist, the full name would become
/// blank, or the update fails.
pub async fn update_contact(
    db: &DatabaseConnection,
    profile_id: i64,
    changes: ContactUpdate,
) -> Result<profile::Model> {
    let mut profile: profile::ActiveModel = get_profile(db, profile_id).await?.into();

    if let Some(full_name) = changes.full_name {
        let full_name =
            non_blank(full_name).ok_or_else(|| Error::validation("full_name", "Full name cannot be empty"))?;
        profile.full_name = Set(full_name);
    }
    if let Some(phone) = changes.phone {
        profile.phone = Set(non_blank(phone));
    }
    if let Some(address) = changes.address {
        profile.address = Set(non_blank(address));
    }
    if let Some(city) = changes.city {
        profile.city = Set(non_blank(city));
    }
    if let Some(postal_code) = changes.postal_code {
        profile.postal_code = Set(non_blank(postal_code));
    }
    profile.updated_at = Set(chrono::Utc::now());
    profile.update(db).await.map_err(Into::into)
}

/// Creates the bootstrap administrator, or promotes an existing account with that email.
///
/// An existing account keeps its password.
///
/// # Errors
/// Returns an error if the email is malformed or a database operation fails.
#[instrument(skip(db, password))]
pub async fn ensure_admin(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
    hash_cost: u32,
) -> Result<profile::Model> {
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(Error::validation("email", "Enter a valid email address"));
    }

    if let Some(existing) = get_profile_by_email(db, &email).await? {
        if existing.role == Role::Admin {
            return Ok(existing);
        }
        let mut profile: profile::ActiveModel = existing.into();
        profile.role = Set(Role::Admin);
        profile.updated_at = Set(chrono::Utc::now());
        let profile = profile.update(db).await?;
        info!("Promoted profile {} to admin", profile.id);
        return Ok(profile);
    }

    let profile = insert_profile(
        db,
        email,
        password,
        "Administrator".to_string(),
        Role::Admin,
        hash_cost,
    )
    .await?;
    info!("Created bootstrap admin {}", profile.id);
    Ok(profile)
}

/// Lists customer accounts, newest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_customers(db: &DatabaseConnection) -> Result<Vec<profile::Model>> {
    Profile::find()
        .filter(profile::Column::Role.eq(Role::Customer))
        .order_by_desc(profile::Column::CreatedAt)
        .order_by_desc(profile::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Profile plus order statistics for the back office.
///
/// # Errors
/// Returns `Error::ProfileNotFound` if the profile does not exist.
pub async fn customer_summary(db: &DatabaseConnection, profile_id: i64) -> Result<CustomerSummary> {
    let profile = get_profile(db, profile_id).await?;
    let orders = Order::find()
        .filter(order::Column::UserId.eq(profile_id))
        .all(db)
        .await?;

    let order_count = u64::try_from(orders.len())?;
    let total_spent_cents: i64 = orders
        .iter()
        .filter(|o| o.payment_status == PaymentStatus::Paid)
        .map(|o| crate::core::pricing::to_cents(o.total))
        .sum();

    Ok(CustomerSummary {
        profile,
        order_count,
        total_spent: crate::core::pricing::from_cents(total_spent_cents),
    })
}
