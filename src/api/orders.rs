//! Order history for the signed-in shopper.

use super::{AppState, auth::AuthUser};
use crate::{
    core::order::{self, OrderWithItems},
    entities::order::Model as OrderModel,
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

async fn list(State(state): State<AppState>, AuthUser(user): AuthUser) -> Result<Json<Vec<OrderModel>>> {
    Ok(Json(order::list_orders_for_user(&state.db, user.id).await?))
}

async fn show(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(order_id): Path<i64>,
) -> Result<Json<OrderWithItems>> {
    Ok(Json(
        order::get_order_for_user(&state.db, user.id, order_id).await?,
    ))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list))
        .route("/orders/:id", get(show))
}
