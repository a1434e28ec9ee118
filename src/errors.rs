//! Unified error type for the storefront.
//!
//! Domain failures carry the identifiers needed to explain them; infrastructure
//! failures wrap the underlying library error. The HTTP layer maps each variant
//! to a status code in `api::error`.

use thiserror::Error;

/// Every failure the storefront can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or is inconsistent
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// A user-supplied field failed validation
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Name of the offending field
        field: String,
        /// Human-readable reason
        message: String,
    },

    /// A money amount was negative, NaN or infinite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// A cart quantity was outside the allowed range
    #[error("Invalid quantity {quantity}: must be between 1 and {max}")]
    InvalidQuantity {
        /// The rejected quantity
        quantity: i32,
        /// Largest quantity allowed per line
        max: i32,
    },

    #[error("Product not found: {id}")]
    ProductNotFound { id: i64 },

    #[error("Product image not found: {id}")]
    ImageNotFound { id: i64 },

    #[error("Product {id} is out of stock")]
    OutOfStock { id: i64 },

    #[error("Order not found: {id}")]
    OrderNotFound { id: i64 },

    #[error("Profile not found: {id}")]
    ProfileNotFound { id: i64 },

    #[error("Promotion not found: {id}")]
    PromotionNotFound { id: i64 },

    #[error("Promotion code '{code}' is not applicable")]
    PromotionNotApplicable { code: String },

    #[error("Promotion code '{code}' already exists")]
    PromotionCodeTaken { code: String },

    #[error("Checkout session not found: {session_id}")]
    CheckoutSessionNotFound { session_id: String },

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Cannot move order from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Payment for session {session_id} is not completed")]
    PaymentNotCompleted { session_id: String },

    /// The payment processor rejected a call or returned something unexpected
    #[error("Payment error: {message}")]
    Payment { message: String },

    #[error("Email '{email}' is already registered")]
    EmailTaken { email: String },

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Administrator role required")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Integer conversion error: {0}")]
    Conversion(#[from] std::num::TryFromIntError),
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
