//! Checkout endpoints: the payment step's quote and the two payment calls.
//!
//! `POST /checkout/session` opens the hosted payment page; the client calls
//! `POST /checkout/reconcile` with the session id it gets back on the success URL.

use super::{AppState, auth::AuthUser};
use crate::{
    core::{
        checkout::{self, CheckoutStart, DeliveryInfo},
        order::OrderWithItems,
        pricing::OrderQuote,
    },
    errors::Result,
};
use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub promotion_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SessionBody {
    pub delivery: DeliveryInfo,
    #[serde(default)]
    pub promotion_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReconcileBody {
    pub session_id: String,
}

async fn quote(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<QuoteRequest>,
) -> Result<Json<OrderQuote>> {
    Ok(Json(
        checkout::quote_cart(
            &state.db,
            user.id,
            body.promotion_code.as_deref(),
            &state.store.delivery,
        )
        .await?,
    ))
}

async fn create_session(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<SessionBody>,
) -> Result<(StatusCode, Json<CheckoutStart>)> {
    let start = checkout::begin_checkout(
        &state.db,
        state.gateway.as_ref(),
        &state.store,
        user.id,
        body.delivery,
        body.promotion_code.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(start)))
}

async fn reconcile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<ReconcileBody>,
) -> Result<Json<OrderWithItems>> {
    Ok(Json(
        checkout::reconcile_payment(&state.db, state.gateway.as_ref(), user.id, &body.session_id)
            .await?,
    ))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/checkout/quote", post(quote))
        .route("/checkout/session", post(create_session))
        .route("/checkout/reconcile", post(reconcile))
}
