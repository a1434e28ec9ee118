//! Store configuration loading from store.toml
//!
//! The store file carries everything about the shop that is not a secret:
//! currency, cart limits, the delivery fee policy, where the payment page
//! sends customers back to, and an optional starter catalog that is seeded
//! into an empty database.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire store.toml file
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// ISO currency code sent to the payment processor (e.g., "usd")
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Largest quantity a single cart line may hold
    #[serde(default = "default_max_quantity")]
    pub max_quantity_per_item: i32,
    /// Delivery fee policy
    pub delivery: DeliveryPolicy,
    /// Redirect targets for the hosted payment page
    pub checkout: CheckoutUrls,
    /// Products inserted when the catalog is empty
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

/// Tiered delivery fee, free at or above `free_threshold`
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DeliveryPolicy {
    /// Subtotal from which delivery is free
    pub free_threshold: f64,
    /// Fee brackets; the bracket with the highest `min_subtotal` not above the subtotal applies
    pub tiers: Vec<DeliveryTier>,
}

/// One delivery fee bracket
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DeliveryTier {
    /// Smallest subtotal this fee applies to
    pub min_subtotal: f64,
    /// Fee charged within the bracket
    pub fee: f64,
}

/// Where the payment page redirects after success or cancellation
#[derive(Debug, Deserialize, Clone)]
pub struct CheckoutUrls {
    /// Must contain `{CHECKOUT_SESSION_ID}` so the client can reconcile
    pub success_url: String,
    pub cancel_url: String,
}

/// Catalog entry used to seed an empty database
#[derive(Debug, Deserialize, Clone)]
pub struct SeedProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub images: Vec<String>,
}

fn default_currency() -> String {
    "usd".to_string()
}

const fn default_max_quantity() -> i32 {
    10
}

const fn default_in_stock() -> bool {
    true
}

impl StoreConfig {
    /// Checks invariants serde cannot express.
    ///
    /// # Errors
    /// Returns `Error::Config` when the delivery policy has no tiers, a fee or
    /// threshold is negative, the cart limit is not positive, or the success URL
    /// lacks the session placeholder.
    pub fn validate(&self) -> Result<()> {
        if self.max_quantity_per_item < 1 {
            return Err(Error::Config {
                message: "max_quantity_per_item must be at least 1".to_string(),
            });
        }
        if self.delivery.tiers.is_empty() {
            return Err(Error::Config {
                message: "delivery.tiers must contain at least one tier".to_string(),
            });
        }
        let negative = self.delivery.free_threshold < 0.0
            || self
                .delivery
                .tiers
                .iter()
                .any(|t| t.fee < 0.0 || t.min_subtotal < 0.0);
        if negative {
            return Err(Error::Config {
                message: "delivery fees and thresholds cannot be negative".to_string(),
            });
        }
        if !self.checkout.success_url.contains("{CHECKOUT_SESSION_ID}") {
            return Err(Error::Config {
                message: "checkout.success_url must contain {CHECKOUT_SESSION_ID}".to_string(),
            });
        }
        Ok(())
    }
}

/// Loads store configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing or fail [`StoreConfig::validate`]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<StoreConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load store configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read store config {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Parses and validates store configuration from TOML text
pub fn parse_config(contents: &str) -> Result<StoreConfig> {
    let config: StoreConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse store.toml: {e}"),
    })?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    const SAMPLE: &str = r#"
        currency = "usd"
        max_quantity_per_item = 5

        [delivery]
        free_threshold = 150.0

        [[delivery.tiers]]
        min_subtotal = 0.0
        fee = 15.0

        [[delivery.tiers]]
        min_subtotal = 75.0
        fee = 7.5

        [checkout]
        success_url = "http://localhost:5173/checkout/success?session_id={CHECKOUT_SESSION_ID}"
        cancel_url = "http://localhost:5173/checkout"

        [[products]]
        name = "Body Wave Lace Front"
        price = 189.0
        category = "lace-front"
        rating = 4.5
        images = ["https://cdn.example.com/bw-1.jpg"]

        [[products]]
        name = "Silk Press Bob"
        price = 99.0
        category = "bob"
        in_stock = false
    "#;

    #[test]
    fn test_parse_store_config() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.currency, "usd");
        assert_eq!(config.max_quantity_per_item, 5);
        assert_eq!(config.delivery.free_threshold, 150.0);
        assert_eq!(config.delivery.tiers.len(), 2);
        assert_eq!(config.delivery.tiers[1].fee, 7.5);

        assert_eq!(config.products.len(), 2);
        assert!(config.products[0].in_stock);
        assert_eq!(config.products[0].images.len(), 1);
        assert!(!config.products[1].in_stock);
        assert_eq!(config.products[1].rating, 0.0);
    }

    #[test]
    fn test_defaults_apply() {
        let config = parse_config(
            r#"
            [delivery]
            free_threshold = 100.0
            tiers = [{ min_subtotal = 0.0, fee = 10.0 }]

            [checkout]
            success_url = "https://shop.example/ok?s={CHECKOUT_SESSION_ID}"
            cancel_url = "https://shop.example/cart"
            "#,
        )
        .unwrap();
        assert_eq!(config.currency, "usd");
        assert_eq!(config.max_quantity_per_item, 10);
        assert!(config.products.is_empty());
    }

    #[test]
    fn test_rejects_missing_session_placeholder() {
        let broken = SAMPLE.replace("{CHECKOUT_SESSION_ID}", "fixed");
        let result = parse_config(&broken);
        assert!(matches!(result, Err(Error::Config { message: _ })));
    }

    #[test]
    fn test_rejects_empty_tiers() {
        let result = parse_config(
            r#"
            [delivery]
            free_threshold = 100.0
            tiers = []

            [checkout]
            success_url = "https://shop.example/ok?s={CHECKOUT_SESSION_ID}"
            cancel_url = "https://shop.example/cart"
            "#,
        );
        assert!(matches!(result, Err(Error::Config { message: _ })));
    }
}
