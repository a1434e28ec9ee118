//! Maps domain errors to HTTP responses.
//!
//! The body is always `{ "error": message }`; validation failures also carry
//! the offending `field`. Infrastructure failures are logged and reported with
//! a generic message.

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

impl Error {
    /// HTTP status reported for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. }
            | Self::InvalidAmount { .. }
            | Self::InvalidQuantity { .. }
            | Self::EmptyCart
            | Self::PromotionNotApplicable { .. } => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthorized | Self::Token(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::PaymentNotCompleted { .. } => StatusCode::PAYMENT_REQUIRED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::ProductNotFound { .. }
            | Self::ImageNotFound { .. }
            | Self::OrderNotFound { .. }
            | Self::ProfileNotFound { .. }
            | Self::PromotionNotFound { .. }
            | Self::CheckoutSessionNotFound { .. } => StatusCode::NOT_FOUND,
            Self::OutOfStock { .. }
            | Self::PromotionCodeTaken { .. }
            | Self::EmailTaken { .. }
            | Self::InvalidStatusTransition { .. } => StatusCode::CONFLICT,
            Self::Payment { .. } | Self::Http(_) => StatusCode::BAD_GATEWAY,
            Self::Config { .. }
            | Self::Database(_)
            | Self::Io(_)
            | Self::EnvVar(_)
            | Self::Json(_)
            | Self::Hash(_)
            | Self::Conversion(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            Self::Validation { field, message } => json!({ "error": message, "field": field }),
            Self::Token(_) => json!({ "error": Self::Unauthorized.to_string() }),
            _ if status.is_server_error() => {
                error!("Request failed: {}", self);
                let message = if status == StatusCode::BAD_GATEWAY {
                    "Payment provider unavailable"
                } else {
                    "Internal server error"
                };
                json!({ "error": message })
            }
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
