//! Process settings read from environment variables.
//!
//! Secrets never go into store.toml; they are loaded here once at startup
//! (after `.env` has been applied by `dotenvy`).

use crate::errors::{Error, Result};
use std::env;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_STORE_CONFIG_PATH: &str = "store.toml";
const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 72;

/// Settings shared by the HTTP layer
#[derive(Debug, Clone)]
pub struct Settings {
    /// Socket address the server listens on
    pub bind_addr: String,
    /// Path of the store.toml file
    pub store_config_path: String,
    /// HMAC secret for bearer tokens
    pub jwt_secret: String,
    /// Lifetime of issued tokens
    pub token_ttl_hours: i64,
    /// bcrypt work factor for new password hashes
    pub password_hash_cost: u32,
    /// Secret key for the payment API
    pub stripe_secret_key: String,
    /// Base URL of the payment API
    pub stripe_api_base: String,
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| Error::Config {
            message: format!("{name} has an invalid value: {raw}"),
        }),
        Err(_) => Ok(default),
    }
}

impl Settings {
    /// Reads settings from the environment.
    ///
    /// # Errors
    /// Returns `Error::EnvVar` when `JWT_SECRET` or `STRIPE_SECRET_KEY` is missing
    /// and `Error::Config` when a numeric variable cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let jwt_secret = env::var("JWT_SECRET")
            .inspect_err(|e| tracing::error!("JWT_SECRET not found: {}", e))?;
        let stripe_secret_key = env::var("STRIPE_SECRET_KEY")
            .inspect_err(|e| tracing::error!("STRIPE_SECRET_KEY not found: {}", e))?;

        Ok(Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            store_config_path: env::var("STORE_CONFIG_PATH")
                .unwrap_or_else(|_| DEFAULT_STORE_CONFIG_PATH.to_string()),
            jwt_secret,
            token_ttl_hours: parse_var("TOKEN_TTL_HOURS", DEFAULT_TOKEN_TTL_HOURS)?,
            password_hash_cost: parse_var("PASSWORD_HASH_COST", bcrypt::DEFAULT_COST)?,
            stripe_secret_key,
            stripe_api_base: env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| DEFAULT_STRIPE_API_BASE.to_string()),
        })
    }
}
