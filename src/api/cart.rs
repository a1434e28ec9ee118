//! Cart endpoints for the signed-in shopper.
//!
//! Every mutating call answers with the whole cart so the client can replace
//! its copy in one step.

use super::{AppState, auth::AuthUser};
use crate::{
    core::{
        cart::{self, CartLine, LocalCartItem},
        pricing::{from_cents, to_cents},
    },
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    /// Total number of units
    pub item_count: i32,
    /// Sum of line totals before promotions and delivery
    pub subtotal: f64,
}

impl From<Vec<CartLine>> for CartView {
    fn from(items: Vec<CartLine>) -> Self {
        let item_count = items.iter().map(|l| l.quantity).sum();
        let subtotal = from_cents(items.iter().map(|l| to_cents(l.line_total)).sum());
        Self {
            items,
            item_count,
            subtotal,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddItem {
    pub product_id: i64,
    #[serde(default = "one")]
    pub quantity: i32,
}

const fn one() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct SetQuantity {
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct SyncCart {
    pub items: Vec<LocalCartItem>,
}

async fn view(state: &AppState, user_id: i64) -> Result<Json<CartView>> {
    Ok(Json(cart::get_cart(&state.db, user_id).await?.into()))
}

async fn get_cart(State(state): State<AppState>, AuthUser(user): AuthUser) -> Result<Json<CartView>> {
    view(&state, user.id).await
}

async fn clear_cart(State(state): State<AppState>, AuthUser(user): AuthUser) -> Result<StatusCode> {
    cart::clear_cart(&state.db, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_item(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(item): Json<AddItem>,
) -> Result<Json<CartView>> {
    cart::add_to_cart(
        &state.db,
        user.id,
        item.product_id,
        item.quantity,
        state.store.max_quantity_per_item,
    )
    .await?;
    view(&state, user.id).await
}

async fn set_quantity(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(product_id): Path<i64>,
    Json(body): Json<SetQuantity>,
) -> Result<Json<CartView>> {
    cart::update_quantity(
        &state.db,
        user.id,
        product_id,
        body.quantity,
        state.store.max_quantity_per_item,
    )
    .await?;
    view(&state, user.id).await
}

async fn remove_item(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(product_id): Path<i64>,
) -> Result<Json<CartView>> {
    cart::remove_from_cart(&state.db, user.id, product_id).await?;
    view(&state, user.id).await
}

async fn sync(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<SyncCart>,
) -> Result<Json<CartView>> {
    let merged = cart::sync_cart(
        &state.db,
        user.id,
        &body.items,
        state.store.max_quantity_per_item,
    )
    .await?;
    Ok(Json(merged.into()))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(get_cart).delete(clear_cart))
        .route("/cart/items", post(add_item))
        .route("/cart/items/:product_id", put(set_quantity).delete(remove_item))
        .route("/cart/sync", post(sync))
}
