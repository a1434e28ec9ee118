//! Favorites endpoints for the signed-in shopper.

use super::{AppState, auth::AuthUser};
use crate::{core::favorites, entities::product, errors::Result};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct FavoriteState {
    pub product_id: i64,
    pub favorite: bool,
}

#[derive(Debug, Deserialize)]
pub struct SyncFavorites {
    pub product_ids: Vec<i64>,
}

async fn list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<product::Model>>> {
    Ok(Json(favorites::list_favorites(&state.db, user.id).await?))
}

async fn status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(product_id): Path<i64>,
) -> Result<Json<FavoriteState>> {
    let favorite = favorites::is_favorite(&state.db, user.id, product_id).await?;
    Ok(Json(FavoriteState {
        product_id,
        favorite,
    }))
}

async fn toggle(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(product_id): Path<i64>,
) -> Result<Json<FavoriteState>> {
    let favorite = favorites::toggle_favorite(&state.db, user.id, product_id).await?;
    Ok(Json(FavoriteState {
        product_id,
        favorite,
    }))
}

async fn remove(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(product_id): Path<i64>,
) -> Result<StatusCode> {
    favorites::remove_favorite(&state.db, user.id, product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn sync(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<SyncFavorites>,
) -> Result<Json<Vec<product::Model>>> {
    Ok(Json(
        favorites::sync_favorites(&state.db, user.id, &body.product_ids).await?,
    ))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/favorites", get(list))
        .route("/favorites/sync", post(sync))
        .route("/favorites/:product_id", get(status).post(toggle).delete(remove))
}
