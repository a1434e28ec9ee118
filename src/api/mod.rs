//! HTTP JSON API served to the storefront client and the back office.
//!
//! Handlers stay thin: they extract the caller and the request body, call into
//! `core`, and serialize the result. Errors become responses in [`error`].

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod favorites;
pub mod orders;

use crate::{config::settings::Settings, config::store::StoreConfig, payment::PaymentGateway};
use axum::{Json, Router, routing::get};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub gateway: Arc<dyn PaymentGateway>,
    pub store: Arc<StoreConfig>,
    pub settings: Arc<Settings>,
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(auth::routes())
        .merge(catalog::routes())
        .merge(cart::routes())
        .merge(favorites::routes())
        .merge(checkout::routes())
        .merge(orders::routes())
        .nest("/admin", admin::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
