//! Shared test utilities for the storefront.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    config::store::{CheckoutUrls, DeliveryPolicy, DeliveryTier, StoreConfig},
    core::{
        catalog::{self, NewProduct},
        profile::{self, NewCustomer},
        promotion::NewPromotion,
    },
    entities::{OrderStatus, PaymentStatus, order, order_item, product},
    errors::Result,
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cheapest bcrypt work factor; keeps password tests fast.
pub const TEST_HASH_COST: u32 = 4;

static ORDER_SEQ: AtomicU64 = AtomicU64::new(1);
static DB_FILE_SEQ: AtomicU64 = AtomicU64::new(1);

/// Routes `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A file-backed test database, removed again on drop.
///
/// Unlike `sqlite::memory:`, the pool behind it holds several connections, so
/// tests can issue truly concurrent writes.
pub struct FileTestDb {
    pub db: DatabaseConnection,
    path: PathBuf,
}

impl Drop for FileTestDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

/// Creates a fresh `SQLite` file under the temp dir with all tables initialized.
pub async fn setup_file_test_db(name: &str) -> Result<FileTestDb> {
    let path = std::env::temp_dir().join(format!(
        "storefront-{name}-{}-{}.sqlite",
        std::process::id(),
        DB_FILE_SEQ.fetch_add(1, Ordering::Relaxed)
    ));
    let _ = std::fs::remove_file(&path);
    let db = sea_orm::Database::connect(format!("sqlite://{}?mode=rwc", path.display())).await?;
    crate::config::database::create_tables(&db).await?;
    Ok(FileTestDb { db, path })
}

/// Store settings used by checkout tests.
///
/// # Defaults
/// * delivery: 15.00 below 75.00, 7.50 from 75.00, free from 150.00
/// * `max_quantity_per_item`: 10
#[must_use]
pub fn test_store_config() -> StoreConfig {
    StoreConfig {
        currency: "usd".to_string(),
        max_quantity_per_item: 10,
        delivery: DeliveryPolicy {
            free_threshold: 150.0,
            tiers: vec![
                DeliveryTier {
                    min_subtotal: 0.0,
                    fee: 15.0,
                },
                DeliveryTier {
                    min_subtotal: 75.0,
                    fee: 7.5,
                },
            ],
        },
        checkout: CheckoutUrls {
            success_url: "https://shop.test/checkout/done?session_id={CHECKOUT_SESSION_ID}"
                .to_string(),
            cancel_url: "https://shop.test/cart".to_string(),
        },
        products: Vec::new(),
    }
}

/// Product form with sensible defaults (in stock, no description, rating 4.0).
#[must_use]
pub fn new_product(name: &str, price: f64, category: &str) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: None,
        price,
        category: category.to_string(),
        in_stock: true,
        rating: 4.0,
    }
}

/// Creates a product with custom price and category.
pub async fn create_custom_product(
    db: &DatabaseConnection,
    name: &str,
    price: f64,
    category: &str,
) -> Result<product::Model> {
    catalog::create_product(db, new_product(name, price, category)).await
}

/// Creates a test product with sensible defaults.
///
/// # Defaults
/// * price: 100.0
/// * category: "lace-front"
pub async fn create_test_product(db: &DatabaseConnection, name: &str) -> Result<product::Model> {
    create_custom_product(db, name, 100.0, "lace-front").await
}

/// Registers a customer whose password is `password123`.
pub async fn create_test_customer(
    db: &DatabaseConnection,
    email: &str,
) -> Result<crate::entities::profile::Model> {
    let name = email.split('@').next().unwrap_or(email);
    profile::register_customer(
        db,
        NewCustomer {
            email: email.to_string(),
            password: "password123".to_string(),
            full_name: format!("Test {name}"),
        },
        TEST_HASH_COST,
    )
    .await
}

/// Fresh database with customer `alice@shop.test` and one in-stock product priced 100.0.
pub async fn setup_with_customer_and_product() -> Result<(
    DatabaseConnection,
    crate::entities::profile::Model,
    product::Model,
)> {
    let db = setup_test_db().await?;
    let customer = create_test_customer(&db, "alice@shop.test").await?;
    let product = create_test_product(&db, "Body Wave Lace Front").await?;
    Ok((db, customer, product))
}

/// Promotion form switched off, running from a day before `now` to 30 days after.
#[must_use]
pub fn new_promotion(code: &str, discount_percent: f64, now: DateTime<Utc>) -> NewPromotion {
    NewPromotion {
        code: code.to_string(),
        description: None,
        discount_percent,
        starts_at: now - Duration::days(1),
        ends_at: now + Duration::days(30),
        is_active: false,
    }
}

/// Inserts an order with a single line, bypassing checkout.
pub async fn create_test_order(
    db: &DatabaseConnection,
    user_id: i64,
    status: OrderStatus,
    payment_status: PaymentStatus,
    total: f64,
) -> Result<order::Model> {
    let n = ORDER_SEQ.fetch_add(1, Ordering::Relaxed);
    let now = Utc::now();
    let order = order::ActiveModel {
        user_id: Set(user_id),
        status: Set(status),
        payment_status: Set(payment_status),
        payment_session_id: Set(format!("cs_seed_{n}")),
        shipping_name: Set("Test Shopper".to_string()),
        shipping_email: Set("shopper@shop.test".to_string()),
        shipping_phone: Set("4045550100".to_string()),
        shipping_address: Set("1 Test Way".to_string()),
        shipping_city: Set("Atlanta".to_string()),
        shipping_postal_code: Set("30303".to_string()),
        promotion_code: Set(None),
        subtotal: Set(total),
        discount: Set(0.0),
        delivery_fee: Set(0.0),
        total: Set(total),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    order_item::ActiveModel {
        order_id: Set(order.id),
        product_id: Set(0),
        product_name: Set("Test Wig".to_string()),
        quantity: Set(1),
        unit_price: Set(total),
        total_price: Set(total),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(order)
}
